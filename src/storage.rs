use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ulid::Ulid;

use crate::types::{
    GeneratedWeek, Priority, Subject, Task, TaskDraft, UserPreferences, WeekPlan, color_for_index,
};

/// File holding the whole subject list as one JSON array.
pub const STORE_FILE: &str = "studypath_v6_subjects.json";
/// File holding the presentation layer's active-subject reference.
pub const SESSION_FILE: &str = "session.json";

pub const SELF_PACED_THEME: &str = "Self-Paced Learning";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    active_subject_id: Option<String>,
}

/// Aggregate progress over every task in the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
    /// Incomplete tasks assigned today or later.
    pub upcoming: usize,
}

pub fn completion_percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

pub fn today_string() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Owner of every subject. All writes go through the named operations below and
/// are persisted before they return; a failed write restores the previous state.
pub struct Storage {
    data_dir: PathBuf,
    subjects: Vec<Subject>,
    active_subject_id: Option<String>,
}

impl Storage {
    /// Open the store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let store_path = data_dir.join(STORE_FILE);
        let subjects = if store_path.exists() {
            parse_subjects(&fs::read(&store_path)?)
        } else {
            Vec::new()
        };

        let session_path = data_dir.join(SESSION_FILE);
        let session = if session_path.exists() {
            load_session(&session_path)
        } else {
            Session::default()
        };

        let mut storage = Self {
            data_dir,
            subjects,
            active_subject_id: session.active_subject_id,
        };
        storage.revalidate_active();
        tracing::debug!(
            subjects = storage.subjects.len(),
            path = %storage.store_path().display(),
            "store loaded"
        );
        Ok(storage)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    /// Serialize the subject list exactly as it is persisted.
    pub fn snapshot_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(&self.subjects)?)
    }

    /// Persist the subject list using a temporary file and an atomic rename.
    pub fn save(&self) -> Result<(), StorageError> {
        write_atomic(&self.store_path(), &self.snapshot_json()?)
    }

    fn save_session(&self) -> Result<(), StorageError> {
        let session = Session {
            active_subject_id: self.active_subject_id.clone(),
        };
        write_atomic(&self.session_path(), &serde_json::to_string_pretty(&session)?)
    }

    /// Session write following a committed store write. Failures are logged only.
    fn persist_session(&self) {
        if let Err(e) = self.save_session() {
            tracing::warn!("failed to save session: {e}");
        }
    }

    /// Run `mutate` against the subject list. `None` means nothing matched and
    /// nothing changed; `Some` is persisted, and rolled back if the write fails.
    fn apply<T>(
        &mut self,
        mutate: impl FnOnce(&mut Vec<Subject>) -> Option<T>,
    ) -> Result<Option<T>, StorageError> {
        let backup = self.subjects.clone();
        let Some(out) = mutate(&mut self.subjects) else {
            return Ok(None);
        };
        if let Err(e) = self.save() {
            self.subjects = backup;
            return Err(e);
        }
        Ok(Some(out))
    }

    fn revalidate_active(&mut self) {
        let valid = self
            .active_subject_id
            .as_deref()
            .is_some_and(|id| self.subjects.iter().any(|s| s.id == id));
        if !valid {
            self.active_subject_id = self.subjects.first().map(|s| s.id.clone());
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn active_subject_id(&self) -> Option<&str> {
        self.active_subject_id.as_deref()
    }

    pub fn active_subject(&self) -> Option<&Subject> {
        self.active_subject_id().and_then(|id| self.subject(id))
    }

    /// Make `id` the active subject. Returns false if no such subject exists.
    pub fn set_active(&mut self, id: &str) -> Result<bool, StorageError> {
        if self.subject(id).is_none() {
            return Ok(false);
        }
        self.active_subject_id = Some(id.to_string());
        self.save_session()?;
        Ok(true)
    }

    pub fn create_subject(
        &mut self,
        name: &str,
        syllabus_content: &str,
        preferences: UserPreferences,
        generated_plan: Vec<GeneratedWeek>,
    ) -> Result<Subject, StorageError> {
        let id = Ulid::new().to_string();
        let color = color_for_index(self.subjects.len()).token.to_string();

        let plan = generated_plan
            .into_iter()
            .map(|week| WeekPlan {
                week_number: week.week_number,
                theme: week.theme,
                tasks: week
                    .tasks
                    .into_iter()
                    .map(|t| Task {
                        id: Ulid::new().to_string(),
                        subject_id: id.clone(),
                        subject_name: name.to_string(),
                        color: color.clone(),
                        title: t.title,
                        description: t.description,
                        priority: t.priority,
                        estimated_minutes: t.estimated_minutes,
                        is_completed: false,
                        week_number: week.week_number,
                        assigned_date: t.assigned_date,
                        assigned_time: None,
                    })
                    .collect(),
            })
            .collect();

        let subject = Subject {
            id: id.clone(),
            name: name.to_string(),
            color,
            syllabus_content: syllabus_content.to_string(),
            notes_content: None,
            plan,
            preferences,
            created_at: Utc::now().timestamp_millis(),
        };

        let created = subject.clone();
        self.apply(move |subjects| {
            subjects.push(subject);
            Some(())
        })?;
        self.active_subject_id = Some(id);
        self.persist_session();
        tracing::debug!(subject = %created.id, tasks = created.task_count(), "subject created");
        Ok(created)
    }

    /// Flip completion of the task with `task_id`, returning its new state.
    pub fn toggle_task_completion(&mut self, task_id: &str) -> Result<Option<bool>, StorageError> {
        let toggled = self.apply(|subjects| {
            let task = find_task_mut(subjects, task_id)?;
            task.is_completed = !task.is_completed;
            Some(task.is_completed)
        })?;
        if toggled.is_none() {
            tracing::debug!(task = task_id, "toggle ignored: no such task");
        }
        Ok(toggled)
    }

    /// Reassign a task to `new_date`. The date is stored as given.
    pub fn move_task(&mut self, task_id: &str, new_date: &str) -> Result<bool, StorageError> {
        let moved = self.apply(|subjects| {
            let task = find_task_mut(subjects, task_id)?;
            task.assigned_date = new_date.to_string();
            Some(())
        })?;
        if moved.is_none() {
            tracing::debug!(task = task_id, "move ignored: no such task");
        }
        Ok(moved.is_some())
    }

    /// Append a hand-made task to the first week of a subject. An empty
    /// `subject_id` targets the active subject.
    pub fn add_manual_task(
        &mut self,
        subject_id: &str,
        draft: TaskDraft,
    ) -> Result<Option<Task>, StorageError> {
        let target = if subject_id.is_empty() {
            self.active_subject_id.clone()
        } else {
            Some(subject_id.to_string())
        };
        let Some(target) = target else {
            tracing::debug!("manual task dropped: no subject resolved");
            return Ok(None);
        };

        let added = self.apply(|subjects| {
            let subject = subjects.iter_mut().find(|s| s.id == target)?;
            if subject.plan.is_empty() {
                subject.plan.push(WeekPlan {
                    week_number: 1,
                    theme: SELF_PACED_THEME.to_string(),
                    tasks: Vec::new(),
                });
            }
            let (subject_id, subject_name, color) =
                (subject.id.clone(), subject.name.clone(), subject.color.clone());
            let week = &mut subject.plan[0];
            let task = Task {
                id: Ulid::new().to_string(),
                subject_id,
                subject_name,
                color,
                title: draft.title.filter(|s| !s.is_empty()).unwrap_or_else(|| "Untitled Task".into()),
                description: draft
                    .description
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "Manually added task".into()),
                priority: draft.priority.unwrap_or(Priority::Medium),
                estimated_minutes: draft.estimated_minutes.filter(|m| *m > 0).unwrap_or(30),
                is_completed: false,
                week_number: week.week_number,
                assigned_date: draft
                    .assigned_date
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(today_string),
                assigned_time: draft.assigned_time,
            };
            week.tasks.push(task.clone());
            Some(task)
        })?;
        if added.is_none() {
            tracing::debug!(subject = %target, "manual task dropped: no such subject");
        }
        Ok(added)
    }

    /// Remove a subject and everything it owns. Callers confirm with the user first.
    pub fn delete_subject(&mut self, subject_id: &str) -> Result<Option<Subject>, StorageError> {
        let removed = self.apply(|subjects| {
            let idx = subjects.iter().position(|s| s.id == subject_id)?;
            Some(subjects.remove(idx))
        })?;
        if removed.is_some() && self.active_subject_id.as_deref() == Some(subject_id) {
            self.active_subject_id = self.subjects.first().map(|s| s.id.clone());
            self.persist_session();
        }
        Ok(removed)
    }

    /// Rename a subject. Tasks keep the name they were created with.
    pub fn rename_subject(&mut self, subject_id: &str, new_name: &str) -> Result<bool, StorageError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Ok(false);
        }
        let renamed = self.apply(|subjects| {
            let subject = subjects.iter_mut().find(|s| s.id == subject_id)?;
            subject.name = new_name.to_string();
            Some(())
        })?;
        Ok(renamed.is_some())
    }

    /// Attach free-form study notes to a subject.
    pub fn set_notes(&mut self, subject_id: &str, notes: &str) -> Result<bool, StorageError> {
        let updated = self.apply(|subjects| {
            let subject = subjects.iter_mut().find(|s| s.id == subject_id)?;
            subject.notes_content = Some(notes.to_string());
            Some(())
        })?;
        Ok(updated.is_some())
    }

    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.subjects.iter().flat_map(|s| s.tasks())
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.all_tasks().find(|t| t.id == task_id)
    }

    pub fn stats(&self) -> Stats {
        self.stats_on(Local::now().date_naive())
    }

    pub fn stats_on(&self, today: NaiveDate) -> Stats {
        let total = self.all_tasks().count();
        let completed = self.all_tasks().filter(|t| t.is_completed).count();
        let upcoming = self
            .all_tasks()
            .filter(|t| !t.is_completed)
            .filter(|t| {
                NaiveDate::parse_from_str(&t.assigned_date, "%Y-%m-%d").is_ok_and(|d| d >= today)
            })
            .count();
        Stats {
            total,
            completed,
            percentage: completion_percentage(completed, total),
            upcoming,
        }
    }

    /// Every task assigned to exactly `date`, across all subjects.
    pub fn tasks_on(&self, date: &str) -> Vec<&Task> {
        self.all_tasks().filter(|t| t.assigned_date == date).collect()
    }
}

fn find_task_mut<'a>(subjects: &'a mut [Subject], task_id: &str) -> Option<&'a mut Task> {
    subjects
        .iter_mut()
        .flat_map(|s| s.plan.iter_mut())
        .flat_map(|w| w.tasks.iter_mut())
        .find(|t| t.id == task_id)
}

/// Parse a persisted snapshot. Malformed input yields an empty store.
pub fn parse_subjects(contents: &[u8]) -> Vec<Subject> {
    if contents.trim_ascii().is_empty() {
        return Vec::new();
    }
    match serde_json::from_slice(contents) {
        Ok(subjects) => subjects,
        Err(e) => {
            tracing::error!("discarding malformed store snapshot: {e}");
            Vec::new()
        }
    }
}

fn load_session(path: &Path) -> Session {
    fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable session file: {e}");
            Session::default()
        })
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = path.with_extension("tmp");
    let mut f = File::create(&temp)?;
    f.write_all(content.as_bytes())?;
    f.sync_all()?;
    fs::rename(temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeneratedTask;
    use tempfile::tempdir;

    fn prefs() -> UserPreferences {
        UserPreferences {
            study_days: vec!["Monday".into(), "Wednesday".into()],
            hours_per_day: 2,
            duration_weeks: 1,
            start_date: "2026-01-05".into(),
        }
    }

    fn generated(title: &str, date: &str) -> GeneratedTask {
        GeneratedTask {
            title: title.into(),
            description: format!("{title} details"),
            priority: Priority::High,
            estimated_minutes: 45,
            assigned_date: date.into(),
        }
    }

    fn one_week_plan() -> Vec<GeneratedWeek> {
        vec![GeneratedWeek {
            week_number: 1,
            theme: "Foundations".into(),
            tasks: vec![
                generated("Linear equations", "2026-01-05"),
                generated("Quadratics", "2026-01-07"),
            ],
        }]
    }

    #[test]
    fn algebra_scenario() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();

        let algebra = store
            .create_subject("Algebra", "syllabus", prefs(), one_week_plan())
            .unwrap();
        assert_eq!(store.subjects().len(), 1);
        assert_eq!(algebra.plan.len(), 1);
        assert_eq!(algebra.task_count(), 2);
        assert!(algebra.tasks().all(|t| !t.is_completed));
        assert!(algebra.tasks().all(|t| t.subject_name == "Algebra"));
        assert!(algebra.tasks().all(|t| t.subject_id == algebra.id));
        assert_eq!(store.active_subject_id(), Some(algebra.id.as_str()));

        let first = algebra.plan[0].tasks[0].id.clone();
        let second = algebra.plan[0].tasks[1].id.clone();
        assert_eq!(store.toggle_task_completion(&first).unwrap(), Some(true));
        assert!(store.task(&first).unwrap().is_completed);
        assert!(!store.task(&second).unwrap().is_completed);

        assert!(store.rename_subject(&algebra.id, "Advanced Algebra").unwrap());
        let renamed = store.subject(&algebra.id).unwrap();
        assert_eq!(renamed.name, "Advanced Algebra");
        // Tasks keep the name they were created with.
        assert!(renamed.tasks().all(|t| t.subject_name == "Algebra"));
        assert!(renamed.tasks().all(|t| t.subject_id == algebra.id));
    }

    #[test]
    fn toggle_twice_is_identity_and_unknown_id_changes_nothing() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let s = store.create_subject("Bio", "", prefs(), one_week_plan()).unwrap();
        let id = s.plan[0].tasks[0].id.clone();

        let before = store.snapshot_json().unwrap();
        store.toggle_task_completion(&id).unwrap();
        store.toggle_task_completion(&id).unwrap();
        assert_eq!(store.snapshot_json().unwrap(), before);

        let on_disk = fs::read_to_string(store.store_path()).unwrap();
        assert_eq!(store.toggle_task_completion("missing").unwrap(), None);
        assert_eq!(store.snapshot_json().unwrap(), before);
        assert_eq!(fs::read_to_string(store.store_path()).unwrap(), on_disk);
    }

    #[test]
    fn move_task_rewrites_date_without_validation() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let s = store.create_subject("Chem", "", prefs(), one_week_plan()).unwrap();
        let id = s.plan[0].tasks[1].id.clone();

        assert!(store.move_task(&id, "2026-02-01").unwrap());
        assert_eq!(store.tasks_on("2026-02-01").len(), 1);
        assert!(store.tasks_on("2026-01-07").is_empty());

        assert!(store.move_task(&id, "someday").unwrap());
        assert_eq!(store.task(&id).unwrap().assigned_date, "someday");
        assert!(!store.move_task("nope", "2026-02-01").unwrap());
    }

    #[test]
    fn manual_task_on_empty_plan_creates_self_paced_week() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let s = store.create_subject("Art", "", prefs(), Vec::new()).unwrap();

        let task = store
            .add_manual_task(&s.id, TaskDraft::default())
            .unwrap()
            .expect("task added");
        let subject = store.subject(&s.id).unwrap();
        assert_eq!(subject.plan.len(), 1);
        assert_eq!(subject.plan[0].week_number, 1);
        assert_eq!(subject.plan[0].theme, SELF_PACED_THEME);
        assert_eq!(subject.plan[0].tasks.len(), 1);

        assert_eq!(task.title, "Untitled Task");
        assert_eq!(task.description, "Manually added task");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.estimated_minutes, 30);
        assert_eq!(task.assigned_date, today_string());
        assert!(!task.is_completed);
    }

    #[test]
    fn manual_task_lands_in_first_week_and_falls_back_to_active() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let mut plan = one_week_plan();
        plan.insert(
            0,
            GeneratedWeek { week_number: 3, theme: "Review".into(), tasks: Vec::new() },
        );
        let s = store.create_subject("Physics", "", prefs(), plan).unwrap();

        let draft = TaskDraft {
            title: Some("Lab report".into()),
            priority: Some(Priority::Low),
            estimated_minutes: Some(90),
            assigned_date: Some("2026-03-01".into()),
            ..TaskDraft::default()
        };
        let task = store.add_manual_task("", draft).unwrap().unwrap();
        assert_eq!(task.subject_id, s.id);
        assert_eq!(task.week_number, 3);
        let subject = store.subject(&s.id).unwrap();
        assert_eq!(subject.plan[0].tasks.len(), 1);
        assert_eq!(subject.plan[0].tasks[0].title, "Lab report");
        assert_eq!(subject.plan.len(), 2);

        assert!(store.add_manual_task("unknown", TaskDraft::default()).unwrap().is_none());
    }

    #[test]
    fn manual_task_without_any_subject_is_dropped() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        assert!(store.add_manual_task("", TaskDraft::default()).unwrap().is_none());
        assert!(!store.store_path().exists());
    }

    #[test]
    fn delete_removes_owned_tasks_and_reassigns_active() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let a = store.create_subject("A", "", prefs(), one_week_plan()).unwrap();
        let b = store.create_subject("B", "", prefs(), one_week_plan()).unwrap();
        store.add_manual_task(&b.id, TaskDraft::default()).unwrap();
        assert_eq!(store.active_subject_id(), Some(b.id.as_str()));

        let total_before = store.all_tasks().count();
        let removed = store.delete_subject(&b.id).unwrap().unwrap();
        assert_eq!(removed.task_count(), 3);
        assert!(store.subjects().iter().all(|s| s.id != b.id));
        assert_eq!(store.all_tasks().count(), total_before - removed.task_count());
        assert_eq!(store.active_subject_id(), Some(a.id.as_str()));

        store.delete_subject(&a.id).unwrap();
        assert!(store.subjects().is_empty());
        assert_eq!(store.active_subject_id(), None);
        assert!(store.delete_subject(&a.id).unwrap().is_none());
    }

    #[test]
    fn rename_ignores_blank_names() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let s = store.create_subject("History", "", prefs(), Vec::new()).unwrap();
        assert!(!store.rename_subject(&s.id, "   ").unwrap());
        assert_eq!(store.subject(&s.id).unwrap().name, "History");
        assert!(!store.rename_subject("missing", "X").unwrap());
    }

    #[test]
    fn colors_cycle_through_palette() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let colors: Vec<String> = (0..7)
            .map(|i| {
                store
                    .create_subject(&format!("S{i}"), "", prefs(), Vec::new())
                    .unwrap()
                    .color
            })
            .collect();
        assert_eq!(colors[0], "bg-blue-600");
        assert_eq!(colors[5], "bg-violet-600");
        assert_eq!(colors[6], colors[0]);
    }

    #[test]
    fn stats_round_and_count_upcoming() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        assert_eq!(store.stats().percentage, 0);
        assert_eq!(store.stats().total, 0);

        let mut plan = one_week_plan();
        plan[0].tasks.push(generated("Graphs", "2026-01-09"));
        let s = store.create_subject("Math", "", prefs(), plan).unwrap();
        let ids: Vec<String> = s.tasks().map(|t| t.id.clone()).collect();

        store.toggle_task_completion(&ids[0]).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let stats = store.stats_on(today);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.percentage, 33);
        assert_eq!(stats.upcoming, 2);

        store.toggle_task_completion(&ids[1]).unwrap();
        let stats = store.stats_on(today);
        assert_eq!(stats.percentage, 67);
        assert_eq!(stats.upcoming, 1);
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        let s = store.create_subject("Econ", "supply", prefs(), one_week_plan()).unwrap();
        store
            .add_manual_task(
                &s.id,
                TaskDraft { assigned_time: Some("09:00".into()), ..TaskDraft::default() },
            )
            .unwrap();
        store.set_notes(&s.id, "elasticity").unwrap();

        let reopened = Storage::open(dir.path()).unwrap();
        assert_eq!(reopened.subjects(), store.subjects());
        assert_eq!(reopened.active_subject_id(), Some(s.id.as_str()));

        let parsed = parse_subjects(store.snapshot_json().unwrap().as_bytes());
        assert_eq!(parsed, store.subjects());
    }

    #[test]
    fn malformed_snapshot_starts_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "{not json").unwrap();
        fs::write(dir.path().join(SESSION_FILE), "[]").unwrap();
        let store = Storage::open(dir.path()).unwrap();
        assert!(store.subjects().is_empty());
        assert_eq!(store.active_subject_id(), None);
    }

    #[test]
    fn non_utf8_files_are_discarded_on_open() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), [0xff, 0xfe, b'[', b']']).unwrap();
        fs::write(dir.path().join(SESSION_FILE), [0xff, 0xfe]).unwrap();

        let mut store = Storage::open(dir.path()).unwrap();
        assert!(store.subjects().is_empty());
        assert_eq!(store.active_subject_id(), None);

        let s = store.create_subject("Latin", "", prefs(), Vec::new()).unwrap();
        let reopened = Storage::open(dir.path()).unwrap();
        assert_eq!(reopened.subjects().len(), 1);
        assert_eq!(reopened.active_subject_id(), Some(s.id.as_str()));
    }

    #[test]
    fn session_write_failure_keeps_created_subject() {
        let dir = tempdir().unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        // A directory in place of the session file makes the rename fail.
        fs::create_dir_all(dir.path().join(SESSION_FILE).join("blocker")).unwrap();

        let s = store.create_subject("Music", "", prefs(), one_week_plan()).unwrap();
        assert_eq!(store.active_subject_id(), Some(s.id.as_str()));
        assert!(store.delete_subject(&s.id).unwrap().is_some());

        let reopened = Storage::open(dir.path()).unwrap();
        assert!(reopened.subjects().is_empty());
    }

    #[test]
    fn stale_session_falls_back_to_first_subject() {
        let dir = tempdir().unwrap();
        let first = {
            let mut store = Storage::open(dir.path()).unwrap();
            let first = store.create_subject("One", "", prefs(), Vec::new()).unwrap();
            store.create_subject("Two", "", prefs(), Vec::new()).unwrap();
            first
        };
        fs::write(
            dir.path().join(SESSION_FILE),
            r#"{"activeSubjectId":"gone"}"#,
        )
        .unwrap();
        let mut store = Storage::open(dir.path()).unwrap();
        assert_eq!(store.active_subject_id(), Some(first.id.as_str()));
        assert!(!store.set_active("gone").unwrap());
    }

    #[test]
    fn percentage_helper() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(3, 3), 100);
    }
}
