pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod prompts;
pub mod report;
pub mod services;
pub mod startup;
pub mod workflow;

use prompts::PromptStyle;
use report::ReportRenderer;
use services::speech::SpeechRenderer;
use std::sync::Arc;
use workflow::Generator;

/// Shared, immutable application state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn Generator>,
    pub prompt_style: Arc<PromptStyle>,
    pub renderer: Arc<ReportRenderer>,
    /// `None` when speech output is disabled.
    pub speech: Option<Arc<SpeechRenderer>>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn Generator>,
        prompt_style: PromptStyle,
        renderer: ReportRenderer,
        speech: Option<SpeechRenderer>,
    ) -> Self {
        Self {
            generator,
            prompt_style: Arc::new(prompt_style),
            renderer: Arc::new(renderer),
            speech: speech.map(Arc::new),
        }
    }
}
