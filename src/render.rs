//! Terminal rendering of store views. Every function returns the text it
//! would print so callers decide where it goes.

use chrono::NaiveDate;
use colored::{Color, Colorize};
use std::fmt::Write;

use crate::storage::{Stats, Storage};
use crate::study::{FlashcardDeck, MonthGrid, ResourceLink, motivation_for};
use crate::types::{ExamPrep, Priority, Subject, Task, color_for_token};

fn terminal_color(token: &str) -> Color {
    color_for_token(token).map(|c| c.terminal).unwrap_or(Color::White)
}

/// Name and color of a task's subject, looked up live so renames show up.
fn subject_label<'a>(storage: &'a Storage, task: &'a Task) -> (&'a str, &'a str) {
    storage
        .subject(&task.subject_id)
        .map(|s| (s.name.as_str(), s.color.as_str()))
        .unwrap_or((task.subject_name.as_str(), task.color.as_str()))
}

fn priority_label(priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::High => priority.as_str().red().bold(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
    }
}

pub fn task_line(storage: &Storage, task: &Task) -> String {
    let (name, color) = subject_label(storage, task);
    let check = if task.is_completed { "[x]".green() } else { "[ ]".normal() };
    let title = if task.is_completed {
        task.title.as_str().strikethrough().dimmed()
    } else {
        task.title.as_str().bold()
    };
    let time = task
        .assigned_time
        .as_deref()
        .map(|t| format!(" {t}"))
        .unwrap_or_default();
    format!(
        "{check} {title}  {} · {}m · {}{time} · {}  {}",
        priority_label(task.priority),
        task.estimated_minutes,
        task.assigned_date,
        name.color(terminal_color(color)),
        task.id.dimmed()
    )
}

pub fn subjects(storage: &Storage) -> String {
    if storage.subjects().is_empty() {
        return "No subjects yet. Create one with `studypath new`.".to_string();
    }
    let mut out = String::new();
    for s in storage.subjects() {
        let marker = if storage.active_subject_id() == Some(s.id.as_str()) { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {}  {} Weeks Active  {}",
            s.name.as_str().color(terminal_color(&s.color)).bold(),
            s.plan.len(),
            s.id.as_str().dimmed()
        );
    }
    out
}

pub fn stats_block(stats: &Stats) -> String {
    format!(
        "Tasks: {}  Completed: {}  Progress: {}%  Upcoming: {}",
        stats.total, stats.completed, stats.percentage, stats.upcoming
    )
}

pub fn dashboard(storage: &Storage, today: NaiveDate) -> String {
    let mut out = String::new();
    match storage.active_subject() {
        Some(s) => {
            let _ = writeln!(
                out,
                "{}  {}",
                s.name.as_str().color(terminal_color(&s.color)).bold(),
                "Active Workspace".dimmed()
            );
        }
        None => {
            let _ = writeln!(out, "No active subject.");
        }
    }
    let _ = writeln!(out, "{}", stats_block(&storage.stats_on(today)));
    let _ = writeln!(out, "\"{}\"", motivation_for(today).italic());
    out
}

pub fn calendar(storage: &Storage, grid: &MonthGrid, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", grid.title().bold());
    let _ = writeln!(out, " Mon   Tue   Wed   Thu   Fri   Sat   Sun");
    for week in grid.cells().chunks(7) {
        let mut line = String::new();
        for cell in week {
            let text = match cell {
                None => "      ".to_string(),
                Some(date) => {
                    let key = date.format("%Y-%m-%d").to_string();
                    let tasks = storage.tasks_on(&key);
                    let day = chrono::Datelike::day(date);
                    let cell = if tasks.is_empty() {
                        format!("{day:>2}    ")
                    } else {
                        let done = tasks.iter().filter(|t| t.is_completed).count();
                        format!("{day:>2}:{done}/{}", tasks.len())
                    };
                    let cell = format!("{cell:<6}");
                    if *date == today {
                        cell.reversed().to_string()
                    } else {
                        cell
                    }
                }
            };
            line.push_str(&text);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn day(storage: &Storage, date: &str) -> String {
    let tasks = storage.tasks_on(date);
    if tasks.is_empty() {
        return format!("Nothing scheduled on {date}.");
    }
    tasks
        .into_iter()
        .map(|t| task_line(storage, t))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn subject_tasks(storage: &Storage, subject: &Subject) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        subject.name.as_str().color(terminal_color(&subject.color)).bold()
    );
    if subject.plan.is_empty() {
        let _ = writeln!(out, "No tasks yet. Add one with `studypath add`.");
        return out;
    }
    for week in &subject.plan {
        let done = week.tasks.iter().filter(|t| t.is_completed).count();
        let _ = writeln!(
            out,
            "\nWeek {}: {}  {}",
            week.week_number,
            week.theme.as_str().bold(),
            format!("{done} / {} Completed", week.tasks.len()).dimmed()
        );
        for task in &week.tasks {
            let _ = writeln!(out, "  {}", task_line(storage, task));
            if !task.description.is_empty() {
                let _ = writeln!(out, "      {}", task.description.as_str().dimmed());
            }
        }
    }
    out
}

pub fn exam_overview(prep: &ExamPrep) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Exam Questions".bold());
    for (i, q) in prep.questions.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {q}", i + 1);
    }
    let _ = writeln!(out, "\n{}", "Core Concepts".bold());
    for s in &prep.summaries {
        let _ = writeln!(out, "  - {s}");
    }
    out
}

pub fn flashcard(deck: &FlashcardDeck) -> String {
    match deck.face() {
        None => "No flashcards.".to_string(),
        Some(face) => {
            let side = if deck.is_flipped() { "Answer" } else { "Question" };
            format!(
                "Card {}/{} ({side})\n\n  {face}\n",
                deck.position() + 1,
                deck.len()
            )
        }
    }
}

pub fn links(topic: &str, links: &[ResourceLink]) -> String {
    let mut out = format!("Resources for {}\n", topic.bold());
    for link in links {
        let _ = writeln!(out, "  {:<14} {}", link.name, link.url.as_str().underline());
    }
    out
}
