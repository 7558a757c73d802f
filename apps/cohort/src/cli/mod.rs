//! # Cohort CLI Module
//!
//! This module implements the CLI interface for cohort.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `list` - List students (default)
//! - `add` / `get` / `update` / `delete` - Manage students
//! - `grade` - Set a student's grade
//! - `groups` - Plan groups by count or by size
//! - `average` - Average grade
//! - `top` - Top scoring students

mod commands;

use crate::config::{Backend, FileConfig, Overrides, Settings};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use cohort_core::{CohortError, Student, StudentId};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cohort - student records service
///
/// Keeps a roster of students and answers grouping and grade questions about it.
#[derive(Parser, Debug)]
#[command(name = "cohort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the student database [default: cohort.db]
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend [default: redb]
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new empty database
    Init {
        /// Overwrite an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// List all students
    List,

    /// Register a new student
    Add {
        first_name: String,
        last_name: String,
        /// Birth date (YYYY-MM-DD)
        birth_date: NaiveDate,
        email: String,
    },

    /// Show one student
    Get { id: u64 },

    /// Change a student's name or birth date; the email never changes
    Update {
        id: u64,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },

    /// Remove a student
    Delete { id: u64 },

    /// Set a student's grade (0.0 - 5.0)
    Grade {
        id: u64,
        #[arg(allow_hyphen_values = true)]
        grade: String,
    },

    /// Plan groups by number of groups or by group size
    #[command(group(ArgGroup::new("mode").required(true).args(["count", "size"])))]
    Groups {
        /// Number of groups
        #[arg(long)]
        count: Option<usize>,

        /// Students per group
        #[arg(long)]
        size: Option<usize>,
    },

    /// Show the average grade
    Average,

    /// Show the top scoring quarter of students
    Top,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// Resolve settings from flags, environment, and the config file.
    pub fn settings(&self) -> Result<Settings, CohortError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let (host, port) = match &self.command {
            Some(Commands::Server { host, port }) => (host.clone(), *port),
            _ => (None, None),
        };

        let overrides = Overrides {
            host,
            port,
            database: self.database.clone(),
            backend: self.backend,
        };
        Ok(Settings::resolve(overrides, file))
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CohortError> {
    let settings = cli.settings()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(&settings).await,
        Some(Commands::Init { force }) => cmd_init(&settings, force),
        Some(Commands::List) | None => cmd_list(&settings, json_mode),
        Some(Commands::Add {
            first_name,
            last_name,
            birth_date,
            email,
        }) => cmd_add(
            &settings,
            json_mode,
            Student::new(first_name, last_name, birth_date, email),
        ),
        Some(Commands::Get { id }) => cmd_get(&settings, json_mode, StudentId(id)),
        Some(Commands::Update {
            id,
            first_name,
            last_name,
            birth_date,
        }) => cmd_update(
            &settings,
            json_mode,
            StudentId(id),
            StudentChanges {
                first_name,
                last_name,
                birth_date,
            },
        ),
        Some(Commands::Delete { id }) => cmd_delete(&settings, json_mode, StudentId(id)),
        Some(Commands::Grade { id, grade }) => {
            cmd_grade(&settings, json_mode, StudentId(id), &grade)
        }
        Some(Commands::Groups { count, size }) => {
            let request = match (count, size) {
                (Some(count), _) => GroupRequest::Count(count),
                (None, Some(size)) => GroupRequest::Size(size),
                (None, None) => {
                    return Err(CohortError::Config(
                        "groups needs --count or --size".to_string(),
                    ));
                }
            };
            cmd_groups(&settings, json_mode, request)
        }
        Some(Commands::Average) => cmd_average(&settings, json_mode),
        Some(Commands::Top) => cmd_top(&settings, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["cohort"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.backend.is_none());
    }

    #[test]
    fn groups_requires_a_mode() {
        assert!(Cli::try_parse_from(["cohort", "groups"]).is_err());
        assert!(Cli::try_parse_from(["cohort", "groups", "--count", "2", "--size", "3"]).is_err());
        assert!(Cli::try_parse_from(["cohort", "groups", "--size", "3"]).is_ok());
    }

    #[test]
    fn negative_grade_reaches_validation() {
        let cli = Cli::try_parse_from(["cohort", "grade", "1", "-0.1"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Grade { id: 1, ref grade }) if grade == "-0.1"
        ));
    }

    #[test]
    fn add_parses_birth_date() {
        let cli = Cli::try_parse_from([
            "cohort",
            "-B",
            "file",
            "add",
            "Kevin",
            "Andersson",
            "1994-07-26",
            "kevinandersson@gmail.com",
        ])
        .unwrap();
        assert_eq!(cli.backend, Some(Backend::File));
        assert!(matches!(
            cli.command,
            Some(Commands::Add { birth_date, .. })
                if birth_date == NaiveDate::from_ymd_opt(1994, 7, 26).unwrap()
        ));
    }

    #[test]
    fn server_flags_reach_settings() {
        let cli = Cli::try_parse_from(["cohort", "-D", "x.db", "server", "--port", "9000"]).unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.database, PathBuf::from("x.db"));
    }
}
