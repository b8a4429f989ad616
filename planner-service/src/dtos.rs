use crate::models::{GradeLevel, ImageAttachment, PedagogyModel};
use crate::workflow::Intake;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

pub const MAX_NAME_CHARS: u64 = 100;
pub const MAX_TOPIC_CHARS: u64 = 200;
pub const MAX_ANSWER_CHARS: u64 = 10_000;

/// Text fields of the multipart intake form.
#[derive(Debug, Default, Validate)]
pub struct IntakeForm {
    #[validate(length(max = 100, message = "Student name is too long"))]
    pub student_name: String,

    #[validate(range(min = 1, max = 12, message = "Grade level must be between 1 and 12"))]
    pub grade_level: Option<u8>,

    pub pedagogy_model: String,

    #[validate(length(max = 200, message = "Topic is too long"))]
    pub topic: String,
}

impl IntakeForm {
    /// Check field limits and convert into workflow input.
    ///
    /// An empty topic passes here; the workflow guard reports it.
    pub fn into_intake(self, image: Option<ImageAttachment>) -> Result<Intake, String> {
        self.validate().map_err(|e| first_message(&e))?;

        let grade = self
            .grade_level
            .ok_or_else(|| "Please choose a grade level".to_string())
            .and_then(|g| GradeLevel::new(g).map_err(|e| e.to_string()))?;

        let model = self
            .pedagogy_model
            .parse::<PedagogyModel>()
            .map_err(|_| "Please choose a differentiation model".to_string())?;

        Ok(Intake {
            student_name: self.student_name,
            grade,
            model,
            topic: self.topic,
            image,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerForm {
    #[validate(length(max = 10000, message = "Answer is too long"))]
    #[serde(default)]
    pub answer: String,
}

/// First human-readable message from a validation failure.
pub fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid form input".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> IntakeForm {
        IntakeForm {
            student_name: "Ada".into(),
            grade_level: Some(5),
            pedagogy_model: "renzulli".into(),
            topic: "Sustainable Energy".into(),
        }
    }

    #[test]
    fn test_valid_form_converts() {
        let intake = form().into_intake(None).unwrap();
        assert_eq!(intake.grade.get(), 5);
        assert_eq!(intake.model, PedagogyModel::Renzulli);
    }

    #[test]
    fn test_out_of_range_grade_is_rejected() {
        let mut f = form();
        f.grade_level = Some(13);
        assert_eq!(
            f.into_intake(None).unwrap_err(),
            "Grade level must be between 1 and 12"
        );
    }

    #[test]
    fn test_missing_grade_and_unknown_model() {
        let mut f = form();
        f.grade_level = None;
        assert!(f.into_intake(None).is_err());

        let mut f = form();
        f.pedagogy_model = "montessori".into();
        assert_eq!(
            f.into_intake(None).unwrap_err(),
            "Please choose a differentiation model"
        );
    }

    #[test]
    fn test_long_topic_is_rejected() {
        let mut f = form();
        f.topic = "x".repeat(MAX_TOPIC_CHARS as usize + 1);
        assert_eq!(f.into_intake(None).unwrap_err(), "Topic is too long");
    }

    #[test]
    fn test_empty_topic_is_left_to_workflow() {
        let mut f = form();
        f.topic = String::new();
        assert!(f.into_intake(None).is_ok());
    }
}
