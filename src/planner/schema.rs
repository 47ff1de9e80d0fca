use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::planner::prompts::strip_code_fence;

/// JSON schema for `T`, in the shape sent as a structured-output constraint.
pub fn response_schema<T: JsonSchema>() -> ServiceResult<Value> {
    let mut value = serde_json::to_value(schema_for!(T))?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
    }
    Ok(value)
}

/// Decode a model reply as JSON. A blank reply decodes as `empty`.
pub fn decode_reply<T: DeserializeOwned>(text: &str, empty: &str) -> ServiceResult<T> {
    let body = strip_code_fence(text);
    let body = if body.is_empty() { empty } else { body };
    serde_json::from_str(body).map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExamPrep, GeneratedWeek, Priority};

    #[test]
    fn plan_schema_names_wire_fields() {
        let schema = response_schema::<Vec<GeneratedWeek>>().unwrap();
        let text = schema.to_string();
        assert!(schema.get("$schema").is_none());
        for field in ["weekNumber", "theme", "estimatedMinutes", "assignedDate", "High", "Low"] {
            assert!(text.contains(field), "schema is missing {field}: {text}");
        }
    }

    #[test]
    fn decodes_plan_reply() {
        let reply = r#"[{"weekNumber":1,"theme":"Basics","tasks":[
            {"title":"Read ch.1","description":"Intro","priority":"High","estimatedMinutes":40,"assignedDate":"2026-01-05"}
        ]}]"#;
        let weeks: Vec<GeneratedWeek> = decode_reply(reply, "[]").unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].tasks[0].priority, Priority::High);
        assert_eq!(weeks[0].tasks[0].estimated_minutes, 40);
    }

    #[test]
    fn blank_reply_uses_fallback_and_garbage_is_an_error() {
        let weeks: Vec<GeneratedWeek> = decode_reply("  ", "[]").unwrap();
        assert!(weeks.is_empty());

        let prep: ExamPrep = decode_reply("```json\n{\"questions\":[\"Q1\"]}\n```", "{}").unwrap();
        assert_eq!(prep.questions, vec!["Q1".to_string()]);
        assert!(prep.flashcards.is_empty());

        let err = decode_reply::<Vec<GeneratedWeek>>("not json", "[]").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }
}
