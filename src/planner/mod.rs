//! Plan generation boundary
//!
//! Everything that talks to the generative model sits behind [`PlanGenerator`],
//! so the store and the commands never depend on a concrete backend.

pub mod gemini;
pub mod prompts;
pub mod schema;
pub mod tutor;

use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::types::{ChatMessage, ExamPrep, GeneratedWeek, TutorMode, UserPreferences};

pub use gemini::{GeminiClient, GeminiConfig};
pub use tutor::TutorSession;

/// Inputs for a study plan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub subject_name: String,
    pub syllabus_text: String,
    pub preferences: UserPreferences,
    /// Busy slots already occupied by other subjects, see [`prompts::schedule_summary`].
    pub existing_schedule: String,
}

/// Request/response capability backed by a generative model. Calls block.
pub trait PlanGenerator: Send + Sync {
    fn generate_plan(&self, request: &PlanRequest) -> ServiceResult<Vec<GeneratedWeek>>;

    fn generate_exam_prep(
        &self,
        subject_name: &str,
        syllabus: &str,
        notes: Option<&str>,
    ) -> ServiceResult<ExamPrep>;

    fn tutor_reply(
        &self,
        subject_name: &str,
        syllabus: &str,
        history: &[ChatMessage],
        query: &str,
        mode: TutorMode,
    ) -> ServiceResult<String>;
}

/// Run a blocking generator call on the blocking pool.
pub async fn run_blocking<T, F>(generator: Arc<dyn PlanGenerator>, call: F) -> ServiceResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn PlanGenerator) -> ServiceResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(generator.as_ref()))
        .await
        .map_err(|e| ServiceError::Other(format!("generation task failed: {e}")))?
}
