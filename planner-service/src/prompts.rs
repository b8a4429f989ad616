//! Prompt templates for question generation and answer analysis.
//!
//! Both builders are pure string formatting: the same brief and style always
//! yield the same prompt.

use crate::models::{GradeLevel, PedagogyModel};
use serde::Deserialize;

/// Voice the model is asked to write in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Formal,
}

/// Prompt wording options shared by both templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptStyle {
    #[serde(default)]
    pub tone: Tone,
}

impl PromptStyle {
    fn role_instruction(&self) -> &'static str {
        match self.tone {
            Tone::Friendly => {
                "You are a warm, encouraging teacher who specialises in gifted and talented education."
            }
            Tone::Formal => {
                "You are a gifted education specialist preparing an official enrichment assessment. Write in a formal, professional register."
            }
        }
    }
}

/// Section headers the analysis report must use, in order.
pub const REPORT_SECTIONS: [&str; 4] = [
    "Performance Level",
    "Achievement Evaluation",
    "Growth Areas",
    "Enrichment Action Plan",
];

const IMAGE_INSTRUCTION: &str =
    "An image has been attached. Refer to what it shows where it is relevant.";

pub struct QuestionBrief<'a> {
    pub topic: &'a str,
    pub grade: GradeLevel,
    pub model: PedagogyModel,
    pub has_image: bool,
}

pub struct AnalysisBrief<'a> {
    pub student_name: &'a str,
    pub grade: GradeLevel,
    pub topic: &'a str,
    pub model: PedagogyModel,
    pub questions: &'a str,
    pub answer: &'a str,
}

pub fn question_prompt(brief: &QuestionBrief<'_>, style: &PromptStyle) -> String {
    let mut prompt = format!(
        "{role}\n\n\
         Grade level: {grade}\n\
         Topic: {topic}\n\
         Differentiation model: {model}\n\n\
         Write exactly 3 higher-order thinking questions about the topic for a grade {grade} student. \
         Each question must follow the principles of the {model} model and push beyond recall \
         towards analysis, evaluation or creation. Number the questions 1 to 3 and do not include answers.",
        role = style.role_instruction(),
        grade = brief.grade,
        topic = brief.topic,
        model = brief.model.label(),
    );
    append_image_instruction(&mut prompt, brief.has_image);
    prompt
}

pub fn analysis_prompt(brief: &AnalysisBrief<'_>, style: &PromptStyle) -> String {
    let student = if brief.student_name.trim().is_empty() {
        "the student"
    } else {
        brief.student_name
    };

    let sections = REPORT_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{role}\n\n\
         Student: {student}\n\
         Grade level: {grade}\n\
         Topic: {topic}\n\
         Differentiation model: {model}\n\n\
         Questions asked:\n{questions}\n\n\
         Student's answers:\n{answer}\n\n\
         Analyse the answers and write a report for the teacher using exactly these section headers, in this order:\n\
         {sections}\n\n\
         Ground every judgement in the answers above and keep the action plan consistent with the {model} model.",
        role = style.role_instruction(),
        grade = brief.grade,
        topic = brief.topic,
        model = brief.model.label(),
        questions = brief.questions,
        answer = brief.answer,
    )
}

fn append_image_instruction(prompt: &mut String, has_image: bool) {
    if has_image {
        prompt.push_str("\n\n");
        prompt.push_str(IMAGE_INSTRUCTION);
    }
}
