use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::filter::Filter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "todo",
    version,
    about = "Single-user to-do list sharing the browser's storage layout",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "todorc", global = true)]
    pub todorc: Option<PathBuf>,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show tasks (all, active or completed)
    #[command(alias = "ls")]
    List {
        #[arg(default_value_t = Filter::All)]
        filter: Filter,
    },
    /// Add a task to the top of the list
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Flip a task between active and completed
    Toggle { id: String },
    /// Replace a task's text
    Edit {
        id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Delete one task
    #[command(alias = "rm")]
    Remove {
        id: String,
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Delete every completed task
    ClearCompleted {
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Delete every task
    ClearAll {
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
}

impl Command {
    /// Whether the user already confirmed destructive actions on the command line.
    pub fn assume_yes(&self) -> bool {
        match self {
            Command::Remove { yes, .. }
            | Command::ClearCompleted { yes }
            | Command::ClearAll { yes } => *yes,
            _ => false,
        }
    }
}

pub fn level_for(verbose: u8, quiet: u8, default_level: &'static str) -> &'static str {
    if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        default_level
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over the flags.
pub fn init_tracing(verbose: u8, quiet: u8, default_level: &'static str) -> anyhow::Result<()> {
    let level = level_for(verbose, quiet, default_level);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
