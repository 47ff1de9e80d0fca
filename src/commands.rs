use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use crate::cli::{AddArgs, Cli, Command, NewArgs, Settings};
use crate::error::{ServiceError, ServiceResult};
use crate::extract;
use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::planner::prompts::schedule_summary;
use crate::planner::{GeminiClient, PlanGenerator, PlanRequest, TutorSession, run_blocking};
use crate::render;
use crate::storage::Storage;
use crate::study::{self, Countdown, FlashcardDeck, MonthGrid, TimerOutcome, resource_links};
use crate::types::{ChatRole, ExamPrep, Subject, SyllabusData, TaskDraft, UserPreferences};

const NO_SUBJECT_HINT: &str = "No subject yet. Create one first with `studypath new`.";

pub async fn run(cli: Cli) -> ServiceResult<()> {
    cli.settings.validate().map_err(ServiceError::InvalidInput)?;
    let mut storage = Storage::open(cli.settings.resolved_data_dir())?;
    let generator: Arc<dyn PlanGenerator> =
        Arc::new(GeminiClient::new(cli.settings.gemini_config()));
    execute(cli.command, &cli.settings, &mut storage, generator).await
}

pub async fn execute(
    command: Command,
    settings: &Settings,
    storage: &mut Storage,
    generator: Arc<dyn PlanGenerator>,
) -> ServiceResult<()> {
    match command {
        Command::New(args) => {
            let (syllabus, name, preferences) = new_subject_inputs(&args)?;
            let subject = plan_new_subject(storage, generator, &syllabus, &name, preferences).await?;
            println!(
                "Created {} with {} weeks and {} tasks ({})",
                subject.name.bold(),
                subject.plan.len(),
                subject.task_count(),
                subject.id.dimmed()
            );
        }
        Command::Subjects => print!("{}", render::subjects(storage)),
        Command::Use { subject_id } => {
            if !storage.set_active(&subject_id)? {
                return Err(unknown_subject(&subject_id));
            }
            println!("Active subject: {}", subject_id);
        }
        Command::Rename { subject_id, name } => {
            if name.trim().is_empty() {
                return Err(ServiceError::InvalidInput("Subject name cannot be blank".into()));
            }
            if !storage.rename_subject(&subject_id, &name)? {
                return Err(unknown_subject(&subject_id));
            }
            println!("Renamed to {}", name.trim().bold());
        }
        Command::Delete { subject_id, yes } => {
            let Some(subject) = storage.subject(&subject_id) else {
                return Err(unknown_subject(&subject_id));
            };
            let prompt = format!(
                "Delete \"{}\" and all {} of its tasks?",
                subject.name,
                subject.task_count()
            );
            if !yes && !confirm(&prompt)? {
                println!("Kept.");
                return Ok(());
            }
            if let Some(removed) = storage.delete_subject(&subject_id)? {
                println!("Deleted {}", removed.name);
            }
        }
        Command::Dashboard => print!("{}", render::dashboard(storage, today())),
        Command::Calendar { month } => {
            let grid = match month {
                Some(month) => MonthGrid::parse(&month).map_err(ServiceError::InvalidInput)?,
                None => MonthGrid::containing(today()),
            };
            print!("{}", render::calendar(storage, &grid, today()));
        }
        Command::Day { date } => println!("{}", render::day(storage, &date_key(date))),
        Command::Tasks { subject } => {
            let Some(subject) = resolve_subject(storage, subject.as_deref())? else {
                println!("{NO_SUBJECT_HINT}");
                return Ok(());
            };
            print!("{}", render::subject_tasks(storage, &subject));
        }
        Command::Toggle { task_id } => match storage.toggle_task_completion(&task_id)? {
            Some(true) => println!("{} {}", "Completed".green(), task_id),
            Some(false) => println!("Reopened {}", task_id),
            None => return Err(unknown_task(&task_id)),
        },
        Command::Move { task_id, date } => {
            let date = date_key(date);
            if !storage.move_task(&task_id, &date)? {
                return Err(unknown_task(&task_id));
            }
            println!("Moved {} to {}", task_id, date);
        }
        Command::Add(args) => {
            let subject_id = args.subject.clone().unwrap_or_default();
            match storage.add_manual_task(&subject_id, task_draft(args)?)? {
                Some(task) => println!("Added {}", render::task_line(storage, &task)),
                None if subject_id.is_empty() => println!("{NO_SUBJECT_HINT}"),
                None => return Err(unknown_subject(&subject_id)),
            }
        }
        Command::Timer { minutes, task } => focus_timer(storage, minutes, task.as_deref()).await?,
        Command::Exam { subject, notes } => {
            let Some(subject) = resolve_subject(storage, subject.as_deref())? else {
                println!("{NO_SUBJECT_HINT}");
                return Ok(());
            };
            let prep = prepare_exam(storage, generator, &subject.id, notes.as_deref()).await?;
            print!("{}", render::exam_overview(&prep));
            review_flashcards(FlashcardDeck::new(prep.flashcards))?;
        }
        Command::Chat { subject, general } => {
            let Some(subject) = resolve_subject(storage, subject.as_deref())? else {
                println!("{NO_SUBJECT_HINT}");
                return Ok(());
            };
            chat(&subject, general, generator).await?;
        }
        Command::Resources { task, topic } => {
            let topic = match (task, topic) {
                (Some(task_id), _) => storage
                    .task(&task_id)
                    .map(|t| t.title.clone())
                    .ok_or_else(|| unknown_task(&task_id))?,
                (None, Some(topic)) if !topic.trim().is_empty() => topic,
                _ => return Err(ServiceError::InvalidInput("Pass --task or --topic".into())),
            };
            print!("{}", render::links(&topic, &resource_links(&topic)));
        }
        Command::Config => {
            println!("data dir:  {}", settings.resolved_data_dir().display());
            println!("store:     {}", storage.store_path().display());
            println!("model:     {}", settings.model);
            println!("api base:  {}", settings.api_base);
            println!("api key:   {}", settings.masked_api_key());
        }
        Command::Version => println!("{PKG_NAME} {PKG_VERSION}"),
    }
    Ok(())
}

/// Generate a plan for a new subject and store it. Nothing is stored when
/// validation or generation fails.
pub async fn plan_new_subject(
    storage: &mut Storage,
    generator: Arc<dyn PlanGenerator>,
    syllabus: &SyllabusData,
    name: &str,
    preferences: UserPreferences,
) -> ServiceResult<Subject> {
    let preferences = preferences.validate().map_err(ServiceError::InvalidInput)?;
    if syllabus.content.trim().is_empty() {
        return Err(ServiceError::InvalidInput("Syllabus is empty".into()));
    }
    let request = PlanRequest {
        subject_name: name.to_string(),
        syllabus_text: syllabus.content.clone(),
        preferences: preferences.clone(),
        existing_schedule: schedule_summary(storage.all_tasks()),
    };
    tracing::info!(subject = name, weeks = preferences.duration_weeks, "generating study plan");
    let weeks = with_progress(
        "Generating study plan",
        run_blocking(generator, move |g| g.generate_plan(&request)),
    )
    .await
    .inspect_err(|e| tracing::error!("plan generation failed: {e}"))?;
    Ok(storage.create_subject(name, &syllabus.content, preferences, weeks)?)
}

/// Store optional notes on the subject, then generate exam material from
/// its syllabus and notes.
pub async fn prepare_exam(
    storage: &mut Storage,
    generator: Arc<dyn PlanGenerator>,
    subject_id: &str,
    notes_path: Option<&Path>,
) -> ServiceResult<ExamPrep> {
    if let Some(path) = notes_path {
        let notes = extract::extract_text(path)?;
        storage.set_notes(subject_id, &notes)?;
    }
    let subject = storage
        .subject(subject_id)
        .cloned()
        .ok_or_else(|| unknown_subject(subject_id))?;
    with_progress(
        "Preparing exam material",
        run_blocking(generator, move |g| {
            g.generate_exam_prep(&subject.name, &subject.syllabus_content, subject.notes_content.as_deref())
        }),
    )
    .await
}

fn new_subject_inputs(args: &NewArgs) -> ServiceResult<(SyllabusData, String, UserPreferences)> {
    let syllabus = match (&args.file, &args.text) {
        (Some(path), _) => extract::load_syllabus(path)?,
        (None, Some(text)) => SyllabusData { content: text.clone(), file_name: None },
        (None, None) => return Err(ServiceError::InvalidInput("Pass --file or --text".into())),
    };
    let name = args
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| syllabus.subject_name());

    let start = date_key(args.start.unwrap_or_else(today));
    let mut preferences = UserPreferences::with_defaults(&start);
    if !args.days.is_empty() {
        preferences.study_days = args.days.clone();
    }
    preferences.hours_per_day = args.hours;
    preferences.duration_weeks = args.weeks;
    Ok((syllabus, name, preferences))
}

fn task_draft(args: AddArgs) -> ServiceResult<TaskDraft> {
    if let Some(time) = &args.time {
        NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid time '{time}', expected HH:MM")))?;
    }
    Ok(TaskDraft {
        title: args.title,
        description: args.description,
        priority: args.priority,
        estimated_minutes: args.minutes,
        assigned_date: args.date.map(date_key),
        assigned_time: args.time,
    })
}

/// Subject named by `id`, or the active one when no id is given.
fn resolve_subject(storage: &Storage, id: Option<&str>) -> ServiceResult<Option<Subject>> {
    match id {
        Some(id) => storage
            .subject(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| unknown_subject(id)),
        None => Ok(storage.active_subject().cloned()),
    }
}

async fn focus_timer(storage: &Storage, minutes: u32, task_id: Option<&str>) -> ServiceResult<()> {
    if minutes == 0 {
        return Err(ServiceError::InvalidInput("Timer needs at least one minute".into()));
    }
    if !study::timer::PRESET_MINUTES.contains(&minutes) {
        tracing::debug!(minutes, "custom timer length");
    }
    if let Some(task_id) = task_id {
        let task = storage.task(task_id).ok_or_else(|| unknown_task(task_id))?;
        println!("Focus: {}", task.title.bold());
    }
    println!("Ctrl-C stops the timer.");

    let outcome = study::timer::run(
        Countdown::from_minutes(minutes),
        Duration::from_secs(1),
        tokio::signal::ctrl_c(),
        |countdown| eprint!("\r{} ", countdown.clock()),
    )
    .await;
    eprintln!();
    match outcome {
        TimerOutcome::Finished => println!("{}", "Session complete. Take a break.".green()),
        TimerOutcome::Stopped { remaining } => {
            println!("Stopped with {} left.", study::timer::format_clock(remaining))
        }
    }
    Ok(())
}

fn review_flashcards(mut deck: FlashcardDeck) -> ServiceResult<()> {
    if deck.is_empty() || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    let actions = ["Flip", "Next", "Previous", "Done"];
    loop {
        println!("\n{}", render::flashcard(&deck));
        let choice = Select::new()
            .items(&actions)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        match choice {
            0 => deck.flip(),
            1 => deck.next(),
            2 => deck.prev(),
            _ => return Ok(()),
        }
    }
}

async fn chat(subject: &Subject, general: bool, generator: Arc<dyn PlanGenerator>) -> ServiceResult<()> {
    let mut session = TutorSession::new(subject);
    if general {
        session.toggle_mode();
    }
    println!(
        "Tutor for {} ({} mode). /mode switches mode, /quit leaves.",
        subject.name.bold(),
        session.mode()
    );
    loop {
        let Ok(line) = Input::<String>::new()
            .with_prompt(format!("[{}] you", session.mode()))
            .allow_empty(true)
            .interact_text()
        else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/mode" => {
                println!("Switched to {} mode.", session.mode().toggled());
                session.toggle_mode();
                continue;
            }
            _ => {}
        }
        let Some(request) = session.begin(&line) else {
            continue;
        };
        let reply = with_progress(
            "Thinking",
            run_blocking(generator.clone(), move |g| request.send(g)),
        )
        .await;
        let message = session.finish(reply);
        if message.role == ChatRole::Model {
            println!("{} {}", "tutor:".cyan().bold(), message.text);
        }
    }
    Ok(())
}

/// Await `work`, animating `label` on stderr while it is pending.
async fn with_progress<T>(label: &str, work: impl Future<Output = T>) -> T {
    if !std::io::stderr().is_terminal() {
        return work.await;
    }
    tokio::pin!(work);
    let mut ticker = tokio::time::interval(Duration::from_millis(400));
    let mut frame = 0usize;
    loop {
        tokio::select! {
            out = &mut work => {
                eprint!("\r{}\r", " ".repeat(label.len() + 3));
                return out;
            }
            _ = ticker.tick() => {
                eprint!("\r{label}{:<3}", ".".repeat(frame % 4));
                frame += 1;
            }
        }
    }
}

fn confirm(prompt: &str) -> ServiceResult<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> ServiceError {
    ServiceError::Other(format!("prompt failed: {e}"))
}

fn unknown_subject(id: &str) -> ServiceError {
    ServiceError::InvalidInput(format!("No subject with id {id}"))
}

fn unknown_task(id: &str) -> ServiceError {
    ServiceError::InvalidInput(format!("No task with id {id}"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
