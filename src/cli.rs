use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::planner::GeminiConfig;
use crate::planner::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::study::timer::DEFAULT_MINUTES;
use crate::types::Priority;

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a subject from a syllabus and generate its study plan
    New(NewArgs),
    /// List subjects
    Subjects,
    /// Make a subject the active one
    Use { subject_id: String },
    /// Rename a subject
    Rename { subject_id: String, name: String },
    /// Delete a subject and all of its tasks
    Delete {
        subject_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show progress across all subjects
    Dashboard,
    /// Show a month of scheduled tasks
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// List tasks assigned to one date
    Day { date: NaiveDate },
    /// List the tasks of a subject, grouped by week
    Tasks {
        /// Subject id, defaults to the active subject
        #[arg(long)]
        subject: Option<String>,
    },
    /// Toggle a task between done and not done
    Toggle { task_id: String },
    /// Reschedule a task to another date
    Move { task_id: String, date: NaiveDate },
    /// Add a task by hand
    Add(AddArgs),
    /// Run a focus timer
    Timer {
        /// Minutes on the clock (presets: 25, 45, 60)
        #[arg(long, default_value_t = DEFAULT_MINUTES)]
        minutes: u32,
        /// Task to focus on
        #[arg(long)]
        task: Option<String>,
    },
    /// Generate exam questions, summaries and flashcards
    Exam {
        #[arg(long)]
        subject: Option<String>,
        /// File with study notes to include (saved on the subject)
        #[arg(long)]
        notes: Option<PathBuf>,
    },
    /// Chat with the tutor
    Chat {
        #[arg(long)]
        subject: Option<String>,
        /// Start in general mode instead of subject-scoped mode
        #[arg(long)]
        general: bool,
    },
    /// Print study resource links for a task or topic
    Resources {
        /// Task whose title is used as the topic
        #[arg(long, conflicts_with = "topic")]
        task: Option<String>,
        #[arg(long)]
        topic: Option<String>,
    },
    /// Show the resolved configuration
    Config,
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Syllabus file (.pdf, .docx or plain text)
    #[arg(long, conflicts_with = "text", required_unless_present = "text")]
    pub file: Option<PathBuf>,

    /// Syllabus text pasted directly
    #[arg(long)]
    pub text: Option<String>,

    /// Subject name, defaults to the file name
    #[arg(long)]
    pub name: Option<String>,

    /// Study days, comma separated (defaults to Monday,Wednesday,Friday)
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<String>,

    /// Hours per study day (1-12)
    #[arg(long, default_value_t = 2)]
    pub hours: u32,

    /// Plan length in weeks (1-52)
    #[arg(long, default_value_t = 4)]
    pub weeks: u32,

    /// First day of the plan, defaults to today
    #[arg(long)]
    pub start: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// High, Medium or Low
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Estimated duration in minutes
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// HH:MM
    #[arg(long)]
    pub time: Option<String>,

    /// Subject id, defaults to the active subject
    #[arg(long)]
    pub subject: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Directory holding the subject store
    #[arg(long, global = true, env = "STUDYPATH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Gemini API key (API_KEY is also honored)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for plans, exam prep and tutoring
    #[arg(long, global = true, env = "STUDYPATH_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the generative language API
    #[arg(long, global = true, env = "STUDYPATH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Settings {
    pub fn default_settings() -> Self {
        Self {
            data_dir: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            verbose: false,
        }
    }

    /// Validate CLI/environment-derived settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("STUDYPATH_MODEL cannot be empty".to_string());
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(format!(
                "Invalid STUDYPATH_API_BASE '{}': expected an http(s) URL",
                self.api_base
            ));
        }
        if self.data_dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
            return Err("STUDYPATH_DATA_DIR cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("studypath"))
            .or_else(|| dirs::home_dir().map(|h| h.join(".studypath")))
            .unwrap_or_else(|| PathBuf::from(".studypath"))
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn masked_api_key(&self) -> String {
        match self.resolved_api_key() {
            Some(key) if key.chars().count() > 8 => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{tail}")
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_base: self.api_base.clone(),
            api_key: self.resolved_api_key(),
            model: self.model.clone(),
        }
    }
}
