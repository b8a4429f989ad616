use crate::handlers::load_planner;
use crate::models::{display_name, GradeLevel, PedagogyModel, PlannerSession, Stage};
use crate::services::generation::is_sentinel;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use tower_sessions::Session;

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "intake.html")]
pub struct IntakeTemplate {
    pub notice: Option<String>,
    pub student_name: String,
    pub topic: String,
    pub grades: Vec<SelectOption>,
    pub models: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "answers.html")]
pub struct AnswersTemplate {
    pub notice: Option<String>,
    pub student_name: String,
    pub grade: u8,
    pub model_label: &'static str,
    pub topic: String,
    pub questions: String,
    pub questions_failed: bool,
    pub answer: String,
}

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub notice: Option<String>,
    pub student_name: String,
    pub grade: u8,
    pub model_label: &'static str,
    pub topic: String,
    pub analysis: String,
    pub analysis_failed: bool,
    pub speech_enabled: bool,
    pub audio_src: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub notice: Option<String>,
    pub heading: String,
    pub message: String,
}

/// Values to show in the intake form.
pub struct IntakePrefill {
    pub student_name: String,
    pub topic: String,
    pub grade: Option<u8>,
    pub model: Option<PedagogyModel>,
}

impl From<&PlannerSession> for IntakePrefill {
    fn from(session: &PlannerSession) -> Self {
        Self {
            student_name: session.student_name.clone(),
            topic: session.topic.clone(),
            grade: Some(session.grade_level.get()),
            model: Some(session.pedagogy_model),
        }
    }
}

pub fn intake_page(prefill: IntakePrefill, notice: Option<String>) -> IntakeTemplate {
    let grades = (GradeLevel::MIN..=GradeLevel::MAX)
        .map(|g| SelectOption {
            value: g.to_string(),
            label: format!("Grade {}", g),
            selected: prefill.grade == Some(g),
        })
        .collect();

    let models = PedagogyModel::ALL
        .iter()
        .map(|m| SelectOption {
            value: m.slug().to_string(),
            label: m.label().to_string(),
            selected: prefill.model == Some(*m),
        })
        .collect();

    IntakeTemplate {
        notice,
        student_name: prefill.student_name,
        topic: prefill.topic,
        grades,
        models,
    }
}

pub fn answers_page(session: &PlannerSession, notice: Option<String>, answer: String) -> AnswersTemplate {
    AnswersTemplate {
        notice,
        student_name: display_name(&session.student_name),
        grade: session.grade_level.get(),
        model_label: session.pedagogy_model.label(),
        topic: session.topic.clone(),
        questions: session.generated_questions.clone(),
        questions_failed: is_sentinel(&session.generated_questions),
        answer,
    }
}

pub fn report_page(
    session: &PlannerSession,
    state: &AppState,
    notice: Option<String>,
    audio_src: Option<String>,
) -> ReportTemplate {
    ReportTemplate {
        notice,
        student_name: display_name(&session.student_name),
        grade: session.grade_level.get(),
        model_label: session.pedagogy_model.label(),
        topic: session.topic.clone(),
        analysis: session.generated_analysis.clone(),
        analysis_failed: is_sentinel(&session.generated_analysis),
        speech_enabled: state.speech.is_some(),
        audio_src,
    }
}

pub fn error_page(status: StatusCode, heading: &str, message: impl Into<String>) -> Response {
    (
        status,
        ErrorTemplate {
            notice: None,
            heading: heading.to_string(),
            message: message.into(),
        },
    )
        .into_response()
}

/// Page for the session's current stage.
pub fn stage_page(session: &PlannerSession, state: &AppState, notice: Option<String>) -> Response {
    match session.stage {
        Stage::Intake => intake_page(IntakePrefill::from(session), notice).into_response(),
        Stage::AnswerCollection => answers_page(session, notice, String::new()).into_response(),
        Stage::Report => report_page(session, state, notice, None).into_response(),
    }
}

pub async fn index(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let planner = load_planner(&session).await?;
    Ok(stage_page(&planner, &state, None))
}

pub async fn health_check() -> &'static str {
    "OK"
}
