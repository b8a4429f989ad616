use super::{GradeLevel, PedagogyModel};
use serde::{Deserialize, Serialize};

/// Key under which the planner state lives in the session store.
pub const SESSION_KEY: &str = "planner";

/// Linear wizard stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Stage {
    #[default]
    Intake = 0,
    AnswerCollection = 1,
    Report = 2,
}

impl Stage {
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

/// Per-visitor planner state.
///
/// `generated_questions` is only filled from `AnswerCollection` onwards and
/// `generated_analysis` only in `Report`; the workflow transitions keep this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlannerSession {
    pub stage: Stage,
    pub topic: String,
    pub generated_questions: String,
    pub generated_analysis: String,
    pub student_name: String,
    pub grade_level: GradeLevel,
    pub pedagogy_model: PedagogyModel,
}

/// Name shown on pages and in the PDF. Blank names get a placeholder.
pub fn display_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        UNNAMED_STUDENT.to_string()
    } else {
        name.to_string()
    }
}

pub const UNNAMED_STUDENT: &str = "Unnamed student";

/// Image uploaded with the intake form. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub const ACCEPTED_TYPES: [&'static str; 3] = ["image/png", "image/jpeg", "image/webp"];

    pub fn is_accepted_type(mime_type: &str) -> bool {
        Self::ACCEPTED_TYPES.contains(&mime_type)
    }
}
