//! Gemini `generateContent` client
//!
//! Blocking HTTP via `ureq`. Each call is a single request: no retries and no
//! timeout beyond what the transport imposes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::planner::prompts::{exam_prompt, plan_prompt, tutor_instruction};
use crate::planner::schema::{decode_reply, response_schema};
use crate::planner::{PlanGenerator, PlanRequest};
use crate::types::{ChatMessage, ChatRole, ExamPrep, GeneratedWeek, TutorMode};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_json_schema: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate; empty when there is none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GenerateContentRequest {
    fn json(prompt: String, schema: Value) -> Self {
        Self {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_json_schema: schema,
            }),
        }
    }

    fn chat(system: String, history: &[ChatMessage], query: &str) -> Self {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                Content::text(Some(role), m.text.clone())
            })
            .collect();
        contents.push(Content::text(Some("user"), query));
        Self {
            contents,
            system_instruction: Some(Content::text(None, system)),
            generation_config: None,
        }
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
            model: config.model,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn generate(&self, request: &GenerateContentRequest) -> ServiceResult<String> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;
        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self
            .agent
            .post(&self.endpoint())
            .set("x-goog-api-key", api_key)
            .send_json(request)
            .map_err(|e| match e {
                ureq::Error::Status(code, response) => {
                    let body = response.into_string().unwrap_or_default();
                    ServiceError::ApiError(format!("Gemini API returned status {code}: {body}"))
                }
                ureq::Error::Transport(t) => {
                    ServiceError::NetworkError(format!("Failed to reach Gemini: {t}"))
                }
            })?;

        let parsed: GenerateContentResponse = response
            .into_json()
            .map_err(|e| ServiceError::MalformedResponse(format!("Failed to read response: {e}")))?;
        Ok(parsed.text())
    }
}

impl PlanGenerator for GeminiClient {
    fn generate_plan(&self, request: &PlanRequest) -> ServiceResult<Vec<GeneratedWeek>> {
        let prompt = plan_prompt(
            &request.subject_name,
            &request.syllabus_text,
            &request.preferences,
            &request.existing_schedule,
        );
        let body = GenerateContentRequest::json(prompt, response_schema::<Vec<GeneratedWeek>>()?);
        let text = self.generate(&body)?;
        let weeks: Vec<GeneratedWeek> = decode_reply(&text, "[]")?;
        tracing::info!(
            subject = %request.subject_name,
            weeks = weeks.len(),
            "study plan generated"
        );
        Ok(weeks)
    }

    fn generate_exam_prep(
        &self,
        subject_name: &str,
        syllabus: &str,
        notes: Option<&str>,
    ) -> ServiceResult<ExamPrep> {
        let body = GenerateContentRequest::json(
            exam_prompt(subject_name, syllabus, notes),
            response_schema::<ExamPrep>()?,
        );
        let text = self.generate(&body)?;
        decode_reply(&text, r#"{"questions":[],"summaries":[],"flashcards":[]}"#)
    }

    fn tutor_reply(
        &self,
        subject_name: &str,
        syllabus: &str,
        history: &[ChatMessage],
        query: &str,
        mode: TutorMode,
    ) -> ServiceResult<String> {
        let body = GenerateContentRequest::chat(
            tutor_instruction(mode, subject_name, syllabus),
            history,
            query,
        );
        self.generate(&body)
    }
}
