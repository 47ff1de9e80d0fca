use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Priority {
    #[serde(alias = "HIGH", alias = "high")]
    High,
    #[default]
    #[serde(alias = "MEDIUM", alias = "medium")]
    Medium,
    #[serde(alias = "LOW", alias = "low")]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {s}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub subject_id: String,
    /// Copy of the owning subject's name at creation time; not updated on rename.
    pub subject_name: String,
    pub color: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_minutes: u32,
    pub is_completed: bool,
    pub week_number: u32,
    pub assigned_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_time: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    pub week_number: u32,
    pub theme: String,
    pub tasks: Vec<Task>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub study_days: Vec<String>,
    pub hours_per_day: u32,
    pub duration_weeks: u32,
    pub start_date: String,
}

impl UserPreferences {
    /// Monday/Wednesday/Friday, two hours a day for four weeks from `start_date`.
    pub fn with_defaults(start_date: &str) -> Self {
        Self {
            study_days: vec!["Monday".into(), "Wednesday".into(), "Friday".into()],
            hours_per_day: 2,
            duration_weeks: 4,
            start_date: start_date.to_string(),
        }
    }

    /// Canonicalize day names and check ranges.
    pub fn validate(mut self) -> Result<Self, String> {
        let mut days = Vec::with_capacity(self.study_days.len());
        for day in &self.study_days {
            let canonical = normalize_day(day).ok_or_else(|| format!("Unknown study day: {day}"))?;
            if !days.contains(&canonical) {
                days.push(canonical);
            }
        }
        if days.is_empty() {
            return Err("Select at least one study day".to_string());
        }
        if !(1..=12).contains(&self.hours_per_day) {
            return Err(format!("hoursPerDay must be between 1 and 12, got {}", self.hours_per_day));
        }
        if !(1..=52).contains(&self.duration_weeks) {
            return Err(format!(
                "durationWeeks must be between 1 and 52, got {}",
                self.duration_weeks
            ));
        }
        self.study_days = days.into_iter().map(str::to_string).collect();
        Ok(self)
    }
}

/// Match a weekday name case-insensitively, accepting three-letter abbreviations.
pub fn normalize_day(day: &str) -> Option<&'static str> {
    let day = day.trim().to_ascii_lowercase();
    if day.len() < 3 {
        return None;
    }
    SUPPORTED_DAYS
        .iter()
        .copied()
        .find(|d| d.to_ascii_lowercase() == day || d[..3].eq_ignore_ascii_case(&day))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    pub syllabus_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_content: Option<String>,
    pub plan: Vec<WeekPlan>,
    pub preferences: UserPreferences,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl Subject {
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.plan.iter().flat_map(|w| w.tasks.iter())
    }

    pub fn task_count(&self) -> usize {
        self.plan.iter().map(|w| w.tasks.len()).sum()
    }
}

/// Fields a caller may supply when adding a task by hand; everything else is defaulted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_minutes: Option<u32>,
    pub assigned_date: Option<String>,
    pub assigned_time: Option<String>,
}

/// A task as returned by plan generation, before it is stamped with ids and ownership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_minutes: u32,
    /// YYYY-MM-DD
    pub assigned_date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWeek {
    pub week_number: u32,
    pub theme: String,
    pub tasks: Vec<GeneratedTask>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExamPrep {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub summaries: Vec<String>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TutorMode {
    /// Answers restricted to the subject's syllabus.
    #[default]
    SubjectScoped,
    General,
}

impl TutorMode {
    pub fn toggled(self) -> Self {
        match self {
            TutorMode::SubjectScoped => TutorMode::General,
            TutorMode::General => TutorMode::SubjectScoped,
        }
    }
}

impl fmt::Display for TutorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TutorMode::SubjectScoped => f.write_str("subject"),
            TutorMode::General => f.write_str("general"),
        }
    }
}

/// Syllabus text plus the name of the file it came from, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyllabusData {
    pub content: String,
    pub file_name: Option<String>,
}

impl SyllabusData {
    /// Subject name derived from the file name up to its first dot.
    pub fn subject_name(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|f| f.split('.').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("New Subject")
            .to_string()
    }
}

pub const SUPPORTED_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubjectColor {
    pub name: &'static str,
    /// Value stored on subjects and tasks.
    pub token: &'static str,
    pub terminal: colored::Color,
}

pub const SUBJECT_COLORS: [SubjectColor; 6] = [
    SubjectColor { name: "Blue", token: "bg-blue-600", terminal: colored::Color::Blue },
    SubjectColor { name: "Indigo", token: "bg-indigo-600", terminal: colored::Color::BrightBlue },
    SubjectColor { name: "Rose", token: "bg-rose-600", terminal: colored::Color::Red },
    SubjectColor { name: "Amber", token: "bg-amber-600", terminal: colored::Color::Yellow },
    SubjectColor { name: "Emerald", token: "bg-emerald-600", terminal: colored::Color::Green },
    SubjectColor { name: "Violet", token: "bg-violet-600", terminal: colored::Color::Magenta },
];

pub fn color_for_index(index: usize) -> &'static SubjectColor {
    &SUBJECT_COLORS[index % SUBJECT_COLORS.len()]
}

pub fn color_for_token(token: &str) -> Option<&'static SubjectColor> {
    SUBJECT_COLORS.iter().find(|c| c.token == token)
}

pub const MOTIVATION_QUOTES: [&str; 5] = [
    "Focus on progress, not perfection.",
    "Your future self will thank you for today's effort.",
    "Discipline is choosing between what you want now and what you want most.",
    "Success is the sum of small efforts repeated daily.",
    "The secret to getting ahead is getting started.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_accepts_any_case() {
        let p: Priority = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(p, Priority::High);
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"Low\"");
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn subject_name_from_file_stem() {
        let from_file = SyllabusData {
            content: String::new(),
            file_name: Some("Linear Algebra.final.pdf".into()),
        };
        assert_eq!(from_file.subject_name(), "Linear Algebra");

        let pasted = SyllabusData { content: "x".into(), file_name: None };
        assert_eq!(pasted.subject_name(), "New Subject");

        let dotfile = SyllabusData { content: "x".into(), file_name: Some(".txt".into()) };
        assert_eq!(dotfile.subject_name(), "New Subject");
    }

    #[test]
    fn preferences_are_normalized_and_range_checked() {
        let mut prefs = UserPreferences::with_defaults("2026-01-05");
        prefs.study_days = vec!["mon".into(), "FRIDAY".into(), "Monday".into()];
        let prefs = prefs.validate().unwrap();
        assert_eq!(prefs.study_days, vec!["Monday".to_string(), "Friday".to_string()]);

        let mut none = UserPreferences::with_defaults("2026-01-05");
        none.study_days.clear();
        assert!(none.validate().is_err());

        let mut bad_day = UserPreferences::with_defaults("2026-01-05");
        bad_day.study_days = vec!["Funday".into()];
        assert!(bad_day.validate().is_err());

        let mut long_days = UserPreferences::with_defaults("2026-01-05");
        long_days.hours_per_day = 13;
        assert!(long_days.validate().is_err());

        let mut long_plan = UserPreferences::with_defaults("2026-01-05");
        long_plan.duration_weeks = 53;
        assert!(long_plan.clone().validate().is_err());
        long_plan.duration_weeks = 52;
        assert!(long_plan.validate().is_ok());
    }

    #[test]
    fn seventh_color_repeats_first() {
        assert_eq!(color_for_index(6), color_for_index(0));
        assert_eq!(color_for_index(2).name, "Rose");
        assert_eq!(color_for_token("bg-violet-600").map(|c| c.name), Some("Violet"));
    }

    #[test]
    fn task_json_uses_camel_case_and_omits_missing_time() {
        let task = Task {
            id: "t1".into(),
            subject_id: "s1".into(),
            subject_name: "Algebra".into(),
            color: "bg-blue-600".into(),
            title: "Read".into(),
            description: "Chapter 1".into(),
            priority: Priority::High,
            estimated_minutes: 45,
            is_completed: false,
            week_number: 1,
            assigned_date: "2026-01-05".into(),
            assigned_time: None,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["subjectName"], "Algebra");
        assert_eq!(value["estimatedMinutes"], 45);
        assert_eq!(value["isCompleted"], false);
        assert!(value.get("assignedTime").is_none());
    }
}
