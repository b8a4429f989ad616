use crate::handlers::app::{error_page, report_page};
use crate::handlers::load_planner;
use crate::models::{PlannerSession, Stage};
use crate::services::metrics::record_render_failure;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use service_core::error::AppError;
use tower_sessions::Session;

pub const PDF_FILE_NAME: &str = "enrichment_plan.pdf";

fn has_report(planner: &PlannerSession) -> bool {
    planner.stage == Stage::Report && !planner.generated_analysis.is_empty()
}

/// GET /report.pdf
pub async fn download_pdf(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let planner = load_planner(&session).await?;
    if !has_report(&planner) {
        return Ok(error_page(
            StatusCode::NOT_FOUND,
            "No report yet",
            "Generate an analysis report before downloading the PDF.",
        ));
    }

    let renderer = state.renderer.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        renderer.render(
            &planner.generated_analysis,
            &planner.student_name,
            &planner.topic,
        )
    })
    .await;

    let failure = match rendered {
        Ok(Ok(bytes)) => {
            return Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", PDF_FILE_NAME),
                    ),
                ],
                bytes,
            )
                .into_response());
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) => format!("rendering task failed: {}", e),
    };

    tracing::error!(error = %failure, "PDF rendering failed");
    record_render_failure("pdf");
    Ok(error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "PDF could not be created",
        "The report could not be converted to PDF. Please try again.",
    ))
}

/// POST /report/speech
pub async fn read_aloud(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let planner = load_planner(&session).await?;
    if !has_report(&planner) {
        return Ok(Redirect::to("/").into_response());
    }

    let Some(speech) = state.speech.clone() else {
        let notice = "Speech output is not enabled.".to_string();
        return Ok(report_page(&planner, &state, Some(notice), None).into_response());
    };

    match speech.render_audio(&planner.generated_analysis).await {
        Ok(audio) => {
            let src = format!("data:audio/mpeg;base64,{}", STANDARD.encode(&audio));
            Ok(report_page(&planner, &state, None, Some(src)).into_response())
        }
        Err(e) => {
            let notice = format!("The report could not be read aloud: {}", e);
            Ok((
                StatusCode::BAD_GATEWAY,
                report_page(&planner, &state, Some(notice), None),
            )
                .into_response())
        }
    }
}
