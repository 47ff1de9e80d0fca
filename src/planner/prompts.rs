use regex::Regex;
use std::sync::LazyLock;

use crate::types::{Task, TutorMode, UserPreferences};

/// Longest existing-schedule summary sent along with a plan request.
pub const BUSY_SLOTS_LIMIT: usize = 500;

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex"));

/// Summarize already-scheduled work as `date: minutes` pairs, truncated.
pub fn schedule_summary<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> String {
    let joined = tasks
        .into_iter()
        .map(|t| format!("{}: {}m", t.assigned_date, t.estimated_minutes))
        .collect::<Vec<_>>()
        .join(", ");
    joined.chars().take(BUSY_SLOTS_LIMIT).collect()
}

pub fn plan_prompt(
    subject_name: &str,
    syllabus_text: &str,
    preferences: &UserPreferences,
    existing_schedule: &str,
) -> String {
    format!(
        r#"Subject: {subject_name}
Syllabus Content: {syllabus_text}
Preferences: Study for {weeks} weeks, starting {start}.
Study Days: {days}
Target Hours: {hours}h/day.
Busy Slots: {existing_schedule}

Task: Create a detailed weekly study plan in JSON.
- Each task needs an "assignedDate" (YYYY-MM-DD).
- Only schedule tasks on the listed study days.
- Priority is one of "High", "Medium" or "Low"."#,
        weeks = preferences.duration_weeks,
        start = preferences.start_date,
        days = preferences.study_days.join(", "),
        hours = preferences.hours_per_day,
    )
}

pub fn exam_prompt(subject_name: &str, syllabus: &str, notes: Option<&str>) -> String {
    let notes = notes
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("And these specific study notes: {n}"))
        .unwrap_or_default();
    format!(
        r#"Based on this syllabus for {subject_name}:
{syllabus}

{notes}

Task: Generate:
1. 10 high-yield exam questions.
2. 5 concise core concept summaries.
3. 8 interactive flashcards (question and answer).
Return as JSON."#
    )
}

pub fn tutor_instruction(mode: TutorMode, subject_name: &str, syllabus: &str) -> String {
    match mode {
        TutorMode::SubjectScoped => format!(
            "You are a specialist tutor for {subject_name}. Answer strictly using this syllabus: {syllabus}. Be concise."
        ),
        TutorMode::General => {
            "You are a general academic assistant. Help the student with any study-related query."
                .to_string()
        }
    }
}

/// Strip a Markdown code fence some models wrap around JSON output.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}
