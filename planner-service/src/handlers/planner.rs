use crate::dtos::{first_message, AnswerForm, IntakeForm};
use crate::handlers::app::{answers_page, intake_page, stage_page, IntakePrefill};
use crate::handlers::{load_planner, save_planner};
use crate::models::{ImageAttachment, Stage};
use crate::workflow::{self, Transition, ValidationError, Workflow};
use crate::AppState;
use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

/// Intake form plus the uploaded image, if any.
struct IntakeUpload {
    form: IntakeForm,
    image: Option<ImageAttachment>,
    /// Set when the upload was not an accepted image type.
    rejected_image: Option<String>,
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("invalid form field: {}", e)))
}

async fn read_intake(mut multipart: Multipart) -> Result<IntakeUpload, AppError> {
    let mut upload = IntakeUpload {
        form: IntakeForm::default(),
        image: None,
        rejected_image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "student_name" => upload.form.student_name = read_text(field).await?,
            "grade_level" => upload.form.grade_level = read_text(field).await?.trim().parse().ok(),
            "pedagogy_model" => upload.form.pedagogy_model = read_text(field).await?,
            "topic" => upload.form.topic = read_text(field).await?,
            "image" => {
                let mime_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("failed to read upload: {}", e))
                })?;
                // Browsers send an empty part when no file is chosen.
                if data.is_empty() {
                    continue;
                }
                if ImageAttachment::is_accepted_type(&mime_type) {
                    upload.image = Some(ImageAttachment {
                        mime_type,
                        data: data.to_vec(),
                    });
                } else {
                    upload.rejected_image = Some(mime_type);
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(upload)
}

/// POST /start
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let planner = load_planner(&session).await?;
    let upload = read_intake(multipart).await?;

    if planner.stage != Stage::Intake {
        let err = ValidationError::WrongStage {
            expected: Stage::Intake,
            actual: planner.stage,
        };
        return Ok(unprocessable(stage_page(&planner, &state, Some(err.to_string()))));
    }

    let prefill = IntakePrefill {
        student_name: upload.form.student_name.clone(),
        topic: upload.form.topic.clone(),
        grade: upload.form.grade_level,
        model: upload.form.pedagogy_model.parse().ok(),
    };

    if let Some(mime_type) = upload.rejected_image {
        tracing::info!(mime_type = %mime_type, "Rejected image upload");
        let notice = "The image must be a PNG, JPEG or WebP file.".to_string();
        return Ok(unprocessable(intake_page(prefill, Some(notice))));
    }

    let intake = match upload.form.into_intake(upload.image) {
        Ok(intake) => intake,
        Err(message) => return Ok(unprocessable(intake_page(prefill, Some(message)))),
    };

    let workflow = Workflow::new(state.generator.as_ref(), &state.prompt_style);
    match workflow.start(planner, intake).await {
        Transition::Advanced(next) => {
            save_planner(&session, &next).await?;
            Ok(Redirect::to("/").into_response())
        }
        Transition::Rejected(_, err) => {
            Ok(unprocessable(intake_page(prefill, Some(err.to_string()))))
        }
    }
}

/// POST /answers
pub async fn submit_answers(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AnswerForm>,
) -> Result<Response, AppError> {
    let planner = load_planner(&session).await?;

    if let Err(e) = form.validate() {
        if planner.stage == Stage::AnswerCollection {
            return Ok(unprocessable(answers_page(&planner, Some(first_message(&e)), form.answer)));
        }
        return Ok(Redirect::to("/").into_response());
    }

    let workflow = Workflow::new(state.generator.as_ref(), &state.prompt_style);
    match workflow.submit_answers(planner, &form.answer).await {
        Transition::Advanced(next) => {
            save_planner(&session, &next).await?;
            Ok(Redirect::to("/").into_response())
        }
        Transition::Rejected(current, err) => {
            tracing::info!(error = %err, stage = current.stage.index(), "Answer submission rejected");
            let response = if current.stage == Stage::AnswerCollection {
                answers_page(&current, Some(err.to_string()), form.answer).into_response()
            } else {
                stage_page(&current, &state, Some(err.to_string()))
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, response).into_response())
        }
    }
}

/// POST /reset
pub async fn reset(session: Session) -> Result<Response, AppError> {
    let planner = load_planner(&session).await?;
    save_planner(&session, &workflow::reset(planner)).await?;
    Ok(Redirect::to("/").into_response())
}

fn unprocessable(page: impl IntoResponse) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}
