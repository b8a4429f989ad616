#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use planner_service::prompts::PromptStyle;
use planner_service::report::ReportRenderer;
use planner_service::services::generation::GenerationClient;
use planner_service::services::providers::mock::{MockSpeechProvider, MockTextProvider};
use planner_service::services::providers::GenerationParams;
use planner_service::services::speech::SpeechRenderer;
use planner_service::startup::{build_router, RouterOptions};
use planner_service::AppState;
use service_core::retry::RetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "planner-test-boundary";
pub const REPORT_TITLE: &str = "Enrichment Planner Report";

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockTextProvider>,
    pub speech: Arc<MockSpeechProvider>,
    /// Session cookie from the last response that set one.
    pub cookie: Option<String>,
}

impl TestApp {
    pub fn new(provider: MockTextProvider) -> Self {
        let provider = Arc::new(provider);
        let speech = Arc::new(MockSpeechProvider::new(true));

        let generator = GenerationClient::new(
            provider.clone(),
            "mock-model",
            GenerationParams::default(),
            RetryConfig::linear(3, Duration::from_millis(1)),
        );
        let state = AppState::new(
            Arc::new(generator),
            PromptStyle::default(),
            ReportRenderer::new(REPORT_TITLE, Some("Confidential".to_string())),
            Some(SpeechRenderer::new(speech.clone(), "en")),
        );

        Self {
            router: build_router(state, RouterOptions::default()),
            provider,
            speech,
            cookie: None,
        }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_empty(&mut self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn start(&mut self, fields: &[(&str, &str)]) -> Response<Body> {
        self.start_with_file(fields, None).await
    }

    /// POST /start as multipart. `file` is `(content type, bytes)` for the image part.
    pub async fn start_with_file(
        &mut self,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri("/start")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn answer(&mut self, answer: &str) -> Response<Body> {
        let encoded: String = answer
            .bytes()
            .map(|b| match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => (b as char).to_string(),
                b' ' => "+".to_string(),
                _ => format!("%{:02X}", b),
            })
            .collect();

        self.send(
            Request::builder()
                .method("POST")
                .uri("/answers")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("answer={}", encoded)))
                .unwrap(),
        )
        .await
    }
}

pub fn intake_fields(topic: &str) -> Vec<(&'static str, String)> {
    vec![
        ("student_name", "Ada".to_string()),
        ("grade_level", "5".to_string()),
        ("pedagogy_model", "renzulli".to_string()),
        ("topic", topic.to_string()),
    ]
}

pub fn as_refs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// True when `pdf` draws `text` with a built-in font, which printpdf writes
/// as a hex string operand of `Tj`.
pub fn pdf_shows_text(pdf: &[u8], text: &str) -> bool {
    let hex: String = text.bytes().map(|b| format!("{:02X}", b)).collect();
    let upper = format!("<{}>", hex);
    let lower = upper.to_lowercase();
    let contains = |needle: &str| {
        pdf.windows(needle.len())
            .any(|window| window == needle.as_bytes())
    };
    contains(&upper) || contains(&lower)
}
