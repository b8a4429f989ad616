//! The three-step planner wizard as an explicit state machine.
//!
//! Transitions take the session by value and hand back the updated one. The
//! model client is injected through [`Generator`], so every transition can be
//! exercised without network access.

use crate::models::{GradeLevel, ImageAttachment, PedagogyModel, PlannerSession, Stage};
use crate::prompts::{analysis_prompt, question_prompt, AnalysisBrief, PromptStyle, QuestionBrief};
use crate::services::providers::PromptRequest;
use async_trait::async_trait;
use thiserror::Error;

pub const MIN_ANSWER_CHARS: usize = 5;

/// Produces model text for a prompt. Failures come back as sentinel text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: PromptRequest) -> String;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a topic before starting.")]
    EmptyTopic,

    #[error("Please write an answer of at least 5 characters.")]
    AnswerTooShort,

    #[error("That step is not available right now. Please continue from the current page.")]
    WrongStage { expected: Stage, actual: Stage },
}

/// Everything the intake form supplies.
#[derive(Debug, Clone)]
pub struct Intake {
    pub student_name: String,
    pub grade: GradeLevel,
    pub model: PedagogyModel,
    pub topic: String,
    pub image: Option<ImageAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced(PlannerSession),
    /// The guard failed; the session is returned untouched.
    Rejected(PlannerSession, ValidationError),
}

impl Transition {
    pub fn session(&self) -> &PlannerSession {
        match self {
            Transition::Advanced(session) | Transition::Rejected(session, _) => session,
        }
    }

    pub fn into_parts(self) -> (PlannerSession, Option<ValidationError>) {
        match self {
            Transition::Advanced(session) => (session, None),
            Transition::Rejected(session, err) => (session, Some(err)),
        }
    }
}

pub struct Workflow<'a> {
    generator: &'a dyn Generator,
    style: &'a PromptStyle,
}

impl<'a> Workflow<'a> {
    pub fn new(generator: &'a dyn Generator, style: &'a PromptStyle) -> Self {
        Self { generator, style }
    }

    /// Intake -> AnswerCollection. Generates the three questions.
    pub async fn start(&self, session: PlannerSession, intake: Intake) -> Transition {
        if session.stage != Stage::Intake {
            return wrong_stage(session, Stage::Intake);
        }

        let topic = intake.topic.trim();
        if topic.is_empty() {
            return Transition::Rejected(session, ValidationError::EmptyTopic);
        }

        let prompt = question_prompt(
            &QuestionBrief {
                topic,
                grade: intake.grade,
                model: intake.model,
                has_image: intake.image.is_some(),
            },
            self.style,
        );

        tracing::info!(
            grade = %intake.grade,
            model = intake.model.slug(),
            has_image = intake.image.is_some(),
            "Generating questions"
        );

        let questions = self
            .generator
            .generate(PromptRequest {
                text: prompt,
                image: intake.image.clone(),
            })
            .await;

        Transition::Advanced(PlannerSession {
            stage: Stage::AnswerCollection,
            topic: topic.to_string(),
            generated_questions: questions,
            generated_analysis: String::new(),
            student_name: intake.student_name.trim().to_string(),
            grade_level: intake.grade,
            pedagogy_model: intake.model,
        })
    }

    /// AnswerCollection -> Report. Generates the analysis.
    pub async fn submit_answers(&self, session: PlannerSession, answer: &str) -> Transition {
        if session.stage != Stage::AnswerCollection {
            return wrong_stage(session, Stage::AnswerCollection);
        }

        let answer = answer.trim();
        if answer.chars().count() < MIN_ANSWER_CHARS {
            return Transition::Rejected(session, ValidationError::AnswerTooShort);
        }

        let prompt = analysis_prompt(
            &AnalysisBrief {
                student_name: &session.student_name,
                grade: session.grade_level,
                topic: &session.topic,
                model: session.pedagogy_model,
                questions: &session.generated_questions,
                answer,
            },
            self.style,
        );

        tracing::info!(answer_chars = answer.chars().count(), "Generating analysis");

        let analysis = self
            .generator
            .generate(PromptRequest {
                text: prompt,
                image: None,
            })
            .await;

        Transition::Advanced(PlannerSession {
            stage: Stage::Report,
            generated_analysis: analysis,
            ..session
        })
    }
}

/// Any stage -> Intake. Keeps the student details for the next run.
pub fn reset(session: PlannerSession) -> PlannerSession {
    PlannerSession {
        stage: Stage::Intake,
        topic: String::new(),
        generated_questions: String::new(),
        generated_analysis: String::new(),
        ..session
    }
}

fn wrong_stage(session: PlannerSession, expected: Stage) -> Transition {
    let actual = session.stage;
    Transition::Rejected(session, ValidationError::WrongStage { expected, actual })
}
