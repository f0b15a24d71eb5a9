//! # FAIM CLI Module
//!
//! This module implements the CLI interface for FAIM-QIRF.
//!
//! ## Available Commands
//!
//! - `init` - Write a starter snapshot
//! - `status` - Show dashboard metrics
//! - `agent` - Add, remove, rescore or list agents
//! - `recalibrate` - Strip non-observable rubric criteria
//! - `lexicon` - Propose or list glossary terms
//! - `trc` - Record a Truth-Recognition-Remedy entry
//! - `gates` - Change the gate configuration
//! - `standing` - Check equal standing across tracks
//! - `claims` - Preview claims against the evidence gate
//! - `privacy` - Change privacy switches
//! - `term` - Set the term week
//! - `log` - Show the audit log
//! - `export` - Export the snapshot to a file
//! - `import` - Import a snapshot from a file
//! - `hash` - Compute BLAKE3 digest of the snapshot

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use faim_core::FaimError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// FAIM-QIRF - epistemic justice rule engine
///
/// Model agents and a shared world of evidentiary gates, tracks, rubric and
/// an append-only audit log, stored in a single JSON snapshot.
#[derive(Parser, Debug)]
#[command(name = "faim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the snapshot file (overrides faim.toml)
    #[arg(short = 'S', long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = crate::config::CONFIG_FILE_NAME)]
    pub config: PathBuf,

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
    /// Write a starter snapshot with two agents and sample claims
    Init {
        /// Overwrite an existing snapshot
        #[arg(short, long)]
        force: bool,

        /// Start with no agents and no claims
        #[arg(long)]
        empty: bool,
    },

    /// Show dashboard metrics
    Status,

    /// Manage agents
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Remove non-observable criteria from the rubric
    Recalibrate,

    /// Manage the glossary
    Lexicon {
        #[command(subcommand)]
        action: LexiconAction,
    },

    /// Record a Truth-Recognition-Remedy entry
    Trc {
        #[arg(long, default_value = "")]
        truth: String,

        #[arg(long, default_value = "")]
        recognition: String,

        #[arg(long, default_value = "")]
        remedy: String,

        /// Review date (YYYY-MM-DD)
        #[arg(long)]
        review_date: Option<String>,
    },

    /// Change the gate configuration
    Gates {
        /// Evidence types to admit (comma-separated)
        #[arg(long)]
        allow: Option<String>,

        /// Evidence types to stop admitting (comma-separated)
        #[arg(long)]
        deny: Option<String>,

        /// Standing rule (any, requiresSPTS)
        #[arg(long)]
        standing_rule: Option<String>,

        /// Required SPTS tags (comma-separated; empty string clears)
        #[arg(long)]
        require_spts: Option<String>,

        /// Rationale, required when the SPTS requirement changes
        #[arg(short, long, default_value = "")]
        memo: String,
    },

    /// Check equal standing across tracks
    Standing,

    /// Preview claims against the evidence gate
    Claims,

    /// Change privacy switches
    Privacy {
        #[arg(long)]
        require_consent: Option<bool>,

        #[arg(long)]
        allow_no_lived_path: Option<bool>,

        #[arg(long)]
        redaction_text: Option<String>,
    },

    /// Set the term week
    Term {
        week: u32,
    },

    /// Show the audit log
    Log {
        /// Show only the most recent entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Export the snapshot to a file
    Export {
        /// Output file path
        #[arg(short, long, default_value = faim_core::primitives::SNAPSHOT_FILE_NAME)]
        output: PathBuf,
    },

    /// Replace the snapshot with an imported file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compute BLAKE3 digest of the snapshot
    Hash,
}

/// Agent subcommands.
#[derive(Subcommand, Debug)]
pub enum AgentAction {
    /// Add an agent
    Add {
        name: String,

        /// Identity kernel descriptors (comma-separated)
        #[arg(long, default_value = "")]
        ik: String,

        /// Assembly history notes (comma-separated)
        #[arg(long, default_value = "")]
        ah: String,

        /// Standpoint tags (comma-separated)
        #[arg(long, default_value = "")]
        spts: String,

        /// ATCF score (0-100)
        #[arg(long)]
        score: Option<u32>,
    },

    /// Remove an agent by id
    Remove { id: String },

    /// Recompute an agent's ATCF score
    Rescore { id: String },

    /// List agents with their voice verdict
    List,
}

/// Glossary subcommands.
#[derive(Subcommand, Debug)]
pub enum LexiconAction {
    /// Propose a term
    Add {
        term: String,

        /// Author tag (defaults to faim.toml `author`, then "student")
        #[arg(long)]
        by: Option<String>,
    },

    /// List terms
    List {
        /// Only terms due for review
        #[arg(long)]
        due: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &Config) -> Result<(), FaimError> {
    let snapshot = config.snapshot_path(cli.snapshot.as_deref());
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force, empty }) => cmd_init(&snapshot, force, empty),
        Some(Commands::Status) => cmd_status(&snapshot, json_mode),
        Some(Commands::Agent { action }) => cmd_agent(&snapshot, json_mode, action),
        Some(Commands::Recalibrate) => cmd_recalibrate(&snapshot),
        Some(Commands::Lexicon { action }) => match action {
            LexiconAction::Add { term, by } => {
                cmd_lexicon_add(&snapshot, &term, &config.author(by.as_deref()))
            }
            LexiconAction::List { due } => cmd_lexicon_list(&snapshot, json_mode, due),
        },
        Some(Commands::Trc {
            truth,
            recognition,
            remedy,
            review_date,
        }) => cmd_trc(
            &snapshot,
            TrcArgs {
                truth,
                recognition,
                remedy,
                review_date,
            },
        ),
        Some(Commands::Gates {
            allow,
            deny,
            standing_rule,
            require_spts,
            memo,
        }) => cmd_gates(
            &snapshot,
            GateArgs {
                allow,
                deny,
                standing_rule,
                require_spts,
                memo,
            },
        ),
        Some(Commands::Standing) => cmd_standing(&snapshot, json_mode),
        Some(Commands::Claims) => cmd_claims(&snapshot, json_mode),
        Some(Commands::Privacy {
            require_consent,
            allow_no_lived_path,
            redaction_text,
        }) => cmd_privacy(&snapshot, require_consent, allow_no_lived_path, redaction_text),
        Some(Commands::Term { week }) => cmd_term(&snapshot, week),
        Some(Commands::Log { limit }) => cmd_log(&snapshot, json_mode, limit),
        Some(Commands::Export { output }) => cmd_export(&snapshot, &output),
        Some(Commands::Import { input }) => cmd_import(&snapshot, &input),
        Some(Commands::Hash) => cmd_hash(&snapshot, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&snapshot, json_mode)
        }
    }
}
