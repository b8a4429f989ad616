mod common;

use axum::http::{header, StatusCode};
use common::{as_refs, body_bytes, body_text, intake_fields, pdf_shows_text, TestApp};
use planner_service::services::generation::BUSY_SENTINEL;
use planner_service::services::providers::mock::MockTextProvider;
use planner_service::services::providers::ProviderError;

const ANALYSIS: &str = "## Performance Level\n**Advanced** reasoning about solar power.\n\n## Enrichment Action Plan\n- Build a model wind turbine";

fn scripted() -> MockTextProvider {
    MockTextProvider::with_script(
        "fallback",
        [Ok("Q1 Q2 Q3".to_string()), Ok(ANALYSIS.to_string())],
    )
}

async fn reach_report(app: &mut TestApp) {
    let fields = intake_fields("Sustainable Energy");
    let response = app.start(&as_refs(&fields)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = app.answer("My answer here").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn intake_page_is_served_to_new_visitors() {
    let mut app = TestApp::new(scripted());

    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Generate questions"));
    assert!(html.contains("Renzulli Enrichment Triad"));
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn sustainable_energy_scenario_produces_pdf() {
    let mut app = TestApp::new(scripted());

    let fields = intake_fields("Sustainable Energy");
    let response = app.start(&as_refs(&fields)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let prompts = app.provider.prompts();
    let prompt = &prompts[0].text;
    assert!(prompt.contains("5"));
    assert!(prompt.contains("Sustainable Energy"));
    assert!(prompt.contains("Renzulli"));

    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Q1 Q2 Q3"));
    assert!(html.contains("Analyse answers"));

    let response = app.answer("My answer here").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.provider.prompts()[1].text.contains("My answer here"));

    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Performance Level"));
    assert!(html.contains("/report.pdf"));

    let response = app.get("/report.pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF"));
    assert!(pdf_shows_text(&pdf, "Student: Ada | Topic: Sustainable Energy"));
}

#[tokio::test]
async fn pdf_uses_placeholder_for_blank_name() {
    let mut app = TestApp::new(scripted());
    let fields = vec![
        ("student_name", ""),
        ("grade_level", "4"),
        ("pedagogy_model", "bloom"),
        ("topic", "Energy"),
    ];
    app.start(&fields).await;
    app.answer("My answer here").await;

    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Unnamed student"));

    let response = app.get("/report.pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    let pdf = body_bytes(response).await;
    assert!(pdf_shows_text(&pdf, "Student: Unnamed student | Topic: Energy"));
}

#[tokio::test]
async fn empty_topic_keeps_intake_and_skips_model() {
    let mut app = TestApp::new(scripted());

    for _ in 0..3 {
        let fields = intake_fields("   ");
        let response = app.start(&as_refs(&fields)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Please enter a topic"));
        assert!(html.contains("value=\"Ada\""));
    }

    assert_eq!(app.provider.calls(), 0);
    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Generate questions"));
}

#[tokio::test]
async fn short_answer_keeps_answer_collection() {
    let mut app = TestApp::new(scripted());
    let fields = intake_fields("Fractions");
    app.start(&as_refs(&fields)).await;

    for answer in ["", "abc", "  ok  "] {
        let response = app.answer(answer).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("at least 5 characters"));
        assert!(html.contains("Q1 Q2 Q3"));
    }

    assert_eq!(app.provider.calls(), 1);
}

#[tokio::test]
async fn invalid_grade_is_rejected_before_model_call() {
    let mut app = TestApp::new(scripted());
    let fields = vec![
        ("student_name", "Ada"),
        ("grade_level", "14"),
        ("pedagogy_model", "bloom"),
        ("topic", "Energy"),
    ];

    let response = app.start(&fields).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("between 1 and 12"));
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn unsupported_image_type_is_rejected() {
    let mut app = TestApp::new(scripted());
    let fields = intake_fields("Volcanoes");

    let response = app
        .start_with_file(&as_refs(&fields), Some(("application/pdf", b"%PDF-1.4")))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("PNG, JPEG or WebP"));
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn image_is_forwarded_to_model() {
    let mut app = TestApp::new(scripted());
    let fields = intake_fields("Volcanoes");

    let response = app
        .start_with_file(&as_refs(&fields), Some(("image/png", &[0x89, b'P', b'N', b'G'])))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let prompts = app.provider.prompts();
    let request = &prompts[0];
    let image = request.image.as_ref().unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.data, vec![0x89, b'P', b'N', b'G']);
    assert!(request.text.contains("image"));
}

#[tokio::test]
async fn reset_from_report_returns_to_intake() {
    let mut app = TestApp::new(scripted());
    reach_report(&mut app).await;

    let response = app.post_empty("/reset").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Generate questions"));
    assert!(!html.contains("Q1 Q2 Q3"));
    // Student details survive for the next run.
    assert!(html.contains("value=\"Ada\""));

    let response = app.get("/report.pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pdf_requires_a_report() {
    let mut app = TestApp::new(scripted());

    let response = app.get("/report.pdf").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("No report yet"));
}

#[tokio::test]
async fn start_is_rejected_outside_intake() {
    let mut app = TestApp::new(scripted());
    let fields = intake_fields("Energy");
    app.start(&as_refs(&fields)).await;

    let response = app.start(&as_refs(&fields)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("not available right now"));
    assert_eq!(app.provider.calls(), 1);
}

#[tokio::test]
async fn rate_limited_model_shows_busy_message() {
    let provider = MockTextProvider::with_script(
        "unused",
        (0..3).map(|_| Err(ProviderError::RateLimited("RESOURCE_EXHAUSTED".into()))),
    );
    let mut app = TestApp::new(provider);
    let fields = intake_fields("Energy");

    let response = app.start(&as_refs(&fields)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.provider.calls(), 3);
    let html = body_text(app.get("/").await).await;
    assert!(html.contains(BUSY_SENTINEL));
}

#[tokio::test]
async fn speech_is_embedded_in_report_page() {
    let mut app = TestApp::new(scripted());
    reach_report(&mut app).await;

    let response = app.post_empty("/report/speech").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("data:audio/mpeg;base64,"));
    assert!(app
        .speech
        .chunks()
        .iter()
        .all(|chunk| !chunk.contains('#') && !chunk.contains('*')));
}
