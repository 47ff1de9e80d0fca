use chrono::Utc;

use crate::error::ServiceResult;
use crate::planner::PlanGenerator;
use crate::types::{ChatMessage, ChatRole, Subject, TutorMode};

pub const CONNECTIVITY_FALLBACK: &str = "Connectivity Error: Failed to reach the AI engine.";
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't process that request.";

/// A pending tutor call, detached from the session so it can run elsewhere.
#[derive(Debug, Clone)]
pub struct TutorRequest {
    pub subject_name: String,
    pub syllabus: String,
    /// Conversation before the new query.
    pub history: Vec<ChatMessage>,
    pub query: String,
    pub mode: TutorMode,
}

impl TutorRequest {
    pub fn send(&self, generator: &dyn PlanGenerator) -> ServiceResult<String> {
        generator.tutor_reply(
            &self.subject_name,
            &self.syllabus,
            &self.history,
            &self.query,
            self.mode,
        )
    }
}

/// In-memory conversation with the tutor about one subject.
#[derive(Debug, Clone)]
pub struct TutorSession {
    subject_name: String,
    syllabus: String,
    history: Vec<ChatMessage>,
    mode: TutorMode,
}

impl TutorSession {
    pub fn new(subject: &Subject) -> Self {
        Self {
            subject_name: subject.name.clone(),
            syllabus: subject.syllabus_content.clone(),
            history: Vec::new(),
            mode: TutorMode::default(),
        }
    }

    pub fn mode(&self) -> TutorMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) -> TutorMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Record the user's query. Blank input yields no request.
    pub fn begin(&mut self, query: &str) -> Option<TutorRequest> {
        if query.trim().is_empty() {
            return None;
        }
        let request = TutorRequest {
            subject_name: self.subject_name.clone(),
            syllabus: self.syllabus.clone(),
            history: self.history.clone(),
            query: query.to_string(),
            mode: self.mode,
        };
        self.history.push(ChatMessage {
            role: ChatRole::User,
            text: query.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        });
        Some(request)
    }

    /// Record the model's answer; failures become a fixed fallback reply.
    pub fn finish(&mut self, reply: ServiceResult<String>) -> &ChatMessage {
        let text = match reply {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_FALLBACK.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("tutor request failed: {e}");
                CONNECTIVITY_FALLBACK.to_string()
            }
        };
        self.history.push(ChatMessage {
            role: ChatRole::Model,
            text,
            timestamp: Utc::now().timestamp_millis(),
        });
        &self.history[self.history.len() - 1]
    }

    #[cfg(test)]
    pub fn ask(&mut self, generator: &dyn PlanGenerator, query: &str) -> Option<&ChatMessage> {
        let request = self.begin(query)?;
        let reply = request.send(generator);
        Some(self.finish(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::testing::CannedGenerator;
    use crate::types::UserPreferences;

    fn subject() -> Subject {
        Subject {
            id: "s1".into(),
            name: "Biology".into(),
            color: "bg-blue-600".into(),
            syllabus_content: "cells and genetics".into(),
            notes_content: None,
            plan: Vec::new(),
            preferences: UserPreferences {
                study_days: vec!["Monday".into()],
                hours_per_day: 1,
                duration_weeks: 1,
                start_date: "2026-01-05".into(),
            },
            created_at: 0,
        }
    }

    #[test]
    fn conversation_accumulates_history() {
        let generator = CannedGenerator::replying("Cells are units of life.");
        let mut session = TutorSession::new(&subject());

        let reply = session.ask(&generator, "What is a cell?").unwrap();
        assert_eq!(reply.role, ChatRole::Model);
        assert_eq!(reply.text, "Cells are units of life.");

        session.toggle_mode();
        session.ask(&generator, "Study tips?").unwrap();
        assert_eq!(session.history().len(), 4);

        let calls = generator.tutor_calls.lock().unwrap();
        assert_eq!(calls[0], (0, "What is a cell?".to_string(), TutorMode::SubjectScoped));
        assert_eq!(calls[1], (2, "Study tips?".to_string(), TutorMode::General));
    }

    #[test]
    fn blank_query_is_ignored() {
        let generator = CannedGenerator::replying("x");
        let mut session = TutorSession::new(&subject());
        assert!(session.ask(&generator, "   ").is_none());
        assert!(session.history().is_empty());
        assert!(generator.tutor_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn failures_become_fallback_replies() {
        let mut session = TutorSession::new(&subject());
        let reply = session.ask(&CannedGenerator::failing(), "hello").unwrap();
        assert_eq!(reply.text, CONNECTIVITY_FALLBACK);

        let reply = session.ask(&CannedGenerator::replying(""), "again").unwrap();
        assert_eq!(reply.text, EMPTY_REPLY_FALLBACK);
    }
}
