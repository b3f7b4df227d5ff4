//! # Curricula CLI Module
//!
//! This module implements the CLI interface for curricula.
//!
//! ## Available Commands
//!
//! - `subjects` - List subjects and graph sizes
//! - `frontier` - Concepts learnable now
//! - `stats` - Mastery of a scope, a unit, or all subjects
//! - `prereqs` - Prerequisites of a concept
//! - `next` - Next navigation options
//! - `map` - A window of the graph with learner status
//! - `validate` - Structural and grade-coverage checks

mod commands;

use crate::config::Config;
use crate::progress::load_progress;
use clap::{Args, Parser, Subcommand};
use curricula_core::{CurriculumError, Grade, SubjectRegistry};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Curricula - curriculum taxonomy navigator
///
/// Answers what is learnable, how much is mastered, and what comes next
/// over prerequisite-aware subject graphs.
#[derive(Parser, Debug)]
#[command(name = "curricula")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress the header line in text output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Learner progress shared by the learner-aware commands.
#[derive(Args, Debug, Clone)]
pub struct LearnerArgs {
    /// JSON progress file: { "<Subject>": ["<path>", ...] }
    #[arg(short, long)]
    pub progress: Option<PathBuf>,

    /// Grade level (number, K, or a band such as "middle")
    #[arg(short, long)]
    pub grade: Option<Grade>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List subjects with node and edge counts
    Subjects,

    /// Concepts learnable now, nearest to the grade first
    Frontier {
        /// Subject name
        subject: String,

        #[command(flatten)]
        learner: LearnerArgs,

        /// Ignore the grade and sort by grade, then path
        #[arg(long)]
        any_grade: bool,

        /// Maximum number of concepts to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Mastery of core concepts
    Stats {
        /// Subject name (not needed with --all)
        subject: Option<String>,

        #[command(flatten)]
        learner: LearnerArgs,

        /// Restrict to the subtree at this path
        #[arg(long, conflicts_with_all = ["unit", "all"])]
        scope: Option<String>,

        /// Mastery of the unit containing this path
        #[arg(long, conflicts_with = "all")]
        unit: Option<String>,

        /// Per-subject mastery and the aggregate over all subjects
        #[arg(long)]
        all: bool,
    },

    /// Prerequisites of a concept
    Prereqs {
        /// Concept path, e.g. "Math/Measurement/Units/Liters"
        path: String,

        /// Transitive depth (1 = immediate only)
        #[arg(short, long, default_value = "1")]
        depth: usize,
    },

    /// Next navigation options after the most recent completion
    Next {
        #[command(flatten)]
        learner: LearnerArgs,

        /// Only consider this subject
        #[arg(short, long)]
        subject: Option<String>,

        /// Completed paths in order, overriding the progress file
        #[arg(long = "completed", value_name = "PATH")]
        completed: Vec<String>,
    },

    /// Show a window of the graph with learner status
    Map {
        /// Subject name
        subject: String,

        #[command(flatten)]
        learner: LearnerArgs,

        /// The learner's current node
        #[arg(long)]
        current: Option<String>,

        /// Node to centre the window on (defaults to --current)
        #[arg(long)]
        focus: Option<String>,

        /// Maximum number of nodes
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Validate subject graphs
    Validate {
        /// Subject name (all subjects when omitted)
        subject: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CurriculumError> {
    let config = Config::load(cli.config.as_deref())?;
    let registry = SubjectRegistry::new(config.source());
    let ctx = Context {
        registry: &registry,
        config: &config,
        json_mode: cli.json_mode,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Subjects => cmd_subjects(&ctx),
        Commands::Frontier {
            subject,
            learner,
            any_grade,
            limit,
        } => {
            let progress = load_progress(learner.progress.as_deref())?;
            let grade = (!any_grade).then(|| ctx.grade(learner.grade));
            cmd_frontier(&ctx, &subject, &progress, grade, limit)
        }
        Commands::Stats {
            subject,
            learner,
            scope,
            unit,
            all,
        } => {
            let progress = load_progress(learner.progress.as_deref())?;
            let target = if all {
                StatsTarget::All
            } else if let Some(unit) = unit {
                StatsTarget::Unit(unit)
            } else {
                let subject = subject
                    .or_else(|| scope.as_deref().map(|s| s.to_string()))
                    .ok_or_else(|| {
                        CurriculumError::Config(
                            "stats needs a subject, --scope, --unit or --all".to_string(),
                        )
                    })?;
                StatsTarget::Scope { subject, scope }
            };
            cmd_stats(&ctx, &progress, target)
        }
        Commands::Prereqs { path, depth } => cmd_prereqs(&ctx, &path, depth),
        Commands::Next {
            learner,
            subject,
            completed,
        } => {
            let progress = load_progress(learner.progress.as_deref())?;
            let grade = ctx.grade(learner.grade);
            cmd_next(&ctx, &progress, completed, subject.as_deref(), grade)
        }
        Commands::Map {
            subject,
            learner,
            current,
            focus,
            limit,
        } => {
            let progress = load_progress(learner.progress.as_deref())?;
            let limit = limit.unwrap_or(config.window_size);
            cmd_map(
                &ctx,
                &subject,
                &progress,
                current.as_deref(),
                focus.as_deref(),
                limit,
            )
        }
        Commands::Validate { subject } => cmd_validate(&ctx, subject.as_deref()),
    }
}
