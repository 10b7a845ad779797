//! # Merit CLI Module
//!
//! This module implements the CLI interface for Merit.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `create` - Create a new appraisal
//! - `attach` - Attach a goal to a draft appraisal
//! - `remove` - Remove a goal from a draft appraisal
//! - `reweight` - Change the weightage of one attached goal
//! - `assess` - Record the self-assessment batch from a file
//! - `evaluate` - Record the appraiser evaluation from a file
//! - `review` - Record the reviewer verdict
//! - `advance` - Advance the appraisal along its status chain
//! - `show` - Show one appraisal through the access gate
//! - `list` - List appraisals
//! - `init` - Initialize new database

mod commands;

use clap::{Parser, Subcommand};
use merit_core::MeritError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Merit - Performance Appraisal Core
///
/// A deterministic multi-stakeholder appraisal engine.
/// Every write is checked against the status chain and the field-access
/// gate before it reaches the store.
#[derive(Parser, Debug)]
#[command(name = "merit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the appraisal database
    #[arg(short = 'D', long, global = true, default_value = "merit.redb")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (ephemeral)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Path to the employee roster (TOML)
    #[arg(short = 'R', long, global = true, default_value = "roster.toml")]
    pub roster: PathBuf,

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
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Create a new appraisal
    Create {
        /// Employee id of the appraisee
        #[arg(long)]
        appraisee: u64,

        /// Employee id of the appraiser (must be manager-eligible)
        #[arg(long)]
        appraiser: u64,

        /// Employee id of the reviewer (must be manager-eligible)
        #[arg(long)]
        reviewer: u64,

        /// Appraisal kind (annual, half_yearly, quarterly, probation)
        #[arg(short, long, default_value = "annual")]
        kind: String,

        /// Review range label, e.g. "FY26"
        #[arg(long)]
        range: Option<String>,

        /// Period start (YYYY-MM-DD or epoch seconds, defaults to now)
        #[arg(long)]
        period_start: Option<String>,

        /// Period end (YYYY-MM-DD or epoch seconds, defaults to start plus one year)
        #[arg(long)]
        period_end: Option<String>,
    },

    /// Attach a goal to a draft appraisal
    Attach {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id
        #[arg(short, long)]
        actor: u64,

        /// Catalog goal id
        #[arg(short, long)]
        goal: u64,

        /// Goal title
        #[arg(short, long)]
        title: String,

        /// Goal description
        #[arg(long, default_value = "")]
        description: String,

        /// Performance factor label
        #[arg(long, default_value = "")]
        factor: String,

        /// Importance label
        #[arg(long, default_value = "")]
        importance: String,

        /// Percentage share, 1 to 100
        #[arg(short, long)]
        weightage: u8,
    },

    /// Remove a goal from a draft appraisal
    Remove {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id
        #[arg(short, long)]
        actor: u64,

        /// Entry id to remove
        #[arg(short, long)]
        entry: u64,
    },

    /// Change the weightage of one attached goal
    Reweight {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id
        #[arg(short, long)]
        actor: u64,

        /// Entry id to reweight
        #[arg(short, long)]
        entry: u64,

        /// New percentage share, 1 to 100
        #[arg(short, long)]
        weightage: u8,
    },

    /// Record the self-assessment batch from a JSON file
    Assess {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id (the appraisee)
        #[arg(short, long)]
        actor: u64,

        /// Path to the JSON batch file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Record the appraiser evaluation from a JSON file
    Evaluate {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id (the appraiser)
        #[arg(short, long)]
        actor: u64,

        /// Path to the JSON batch file
        #[arg(short, long)]
        file: PathBuf,

        /// Overall rating, 1 to 5
        #[arg(long)]
        rating: u8,

        /// Overall comment
        #[arg(long)]
        comment: String,
    },

    /// Record the reviewer verdict
    Review {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id (the reviewer)
        #[arg(short, long)]
        actor: u64,

        /// Overall rating, 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Overall comment
        #[arg(short, long)]
        comment: String,
    },

    /// Advance the appraisal along its status chain
    Advance {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Acting employee id
        #[arg(short, long)]
        actor: u64,

        /// Target status, e.g. "submitted" or "complete"
        #[arg(short, long)]
        to: String,
    },

    /// Show one appraisal rendered through the access gate
    Show {
        /// Appraisal id
        #[arg(short, long)]
        id: u64,

        /// Viewing employee id
        #[arg(short, long)]
        actor: u64,
    },

    /// List appraisals
    List {
        /// Only appraisals this employee participates in
        #[arg(long)]
        employee: Option<u64>,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MeritError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(&cli.database, backend, &cli.roster, &host, port).await
        }
        Some(Commands::Create {
            appraisee,
            appraiser,
            reviewer,
            kind,
            range,
            period_start,
            period_end,
        }) => cmd_create(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            appraisee,
            appraiser,
            reviewer,
            &kind,
            range,
            period_start,
            period_end,
        ),
        Some(Commands::Attach {
            id,
            actor,
            goal,
            title,
            description,
            factor,
            importance,
            weightage,
        }) => cmd_attach(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            goal,
            &title,
            &description,
            &factor,
            &importance,
            weightage,
        ),
        Some(Commands::Remove { id, actor, entry }) => cmd_remove(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            entry,
        ),
        Some(Commands::Reweight {
            id,
            actor,
            entry,
            weightage,
        }) => cmd_reweight(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            entry,
            weightage,
        ),
        Some(Commands::Assess { id, actor, file }) => cmd_assess(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            &file,
        ),
        Some(Commands::Evaluate {
            id,
            actor,
            file,
            rating,
            comment,
        }) => cmd_evaluate(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            &file,
            rating,
            &comment,
        ),
        Some(Commands::Review {
            id,
            actor,
            rating,
            comment,
        }) => cmd_review(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            rating,
            &comment,
        ),
        Some(Commands::Advance { id, actor, to }) => cmd_advance(
            &cli.database,
            backend,
            &cli.roster,
            json_mode,
            id,
            actor,
            &to,
        ),
        Some(Commands::Show { id, actor }) => {
            cmd_show(&cli.database, backend, &cli.roster, json_mode, id, actor)
        }
        Some(Commands::List { employee }) => {
            cmd_list(&cli.database, backend, &cli.roster, json_mode, employee)
        }
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        None => {
            // No subcommand - list appraisals by default
            cmd_list(&cli.database, backend, &cli.roster, json_mode, None)
        }
    }
}
