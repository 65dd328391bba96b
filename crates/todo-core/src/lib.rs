//! Core of a single-user to-do list whose tasks live in a per-origin
//! key-value store. The same controller drives the browser front-end and the
//! terminal client.

#[cfg(feature = "native")]
pub mod cli;
#[cfg(feature = "native")]
pub mod commands;
#[cfg(feature = "native")]
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod notice;
pub mod persistence;
#[cfg(feature = "native")]
pub mod render;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

pub use controller::{Action, Confirm, Controller, EditState, Snapshot};
pub use error::{StorageError, TodoError, TodoResult};
pub use filter::Filter;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use persistence::{Persistence, STORAGE_KEY};
pub use storage::{KeyValueStore, MemoryStore};
pub use store::TaskStore;
pub use task::{Task, TaskId};
pub use view::{ListView, TaskItem};

#[cfg(feature = "native")]
pub use native::run;

#[cfg(feature = "native")]
mod native {
    use std::ffi::OsString;

    use anyhow::Context;
    use clap::Parser;
    use tracing::{debug, info};

    use crate::cli::{self, Command};
    use crate::commands;
    use crate::config;
    use crate::controller::Controller;
    use crate::filter::Filter;
    use crate::notice::NoticeBoard;
    use crate::persistence::Persistence;
    use crate::render::Renderer;
    use crate::storage::FileStore;

    #[tracing::instrument(skip_all)]
    pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
        let cli = match cli::GlobalCli::try_parse_from(raw_args) {
            Ok(cli) => cli,
            // --help and --version land here too; they print to stdout and succeed.
            Err(err) if !err.use_stderr() => {
                err.print().context("failed to print help")?;
                return Ok(());
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context("invalid arguments"));
            }
        };

        cli::init_tracing(cli.verbose, cli.quiet, "warn")?;

        info!(
            verbose = cli.verbose,
            quiet = cli.quiet,
            "starting todo CLI"
        );

        let mut cfg = config::Config::load(cli.todorc.as_deref())?;
        cfg.apply_overrides(
            cli.rc_overrides
                .into_iter()
                .map(|kv| (kv.key, kv.value)),
        );

        let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
            .context("failed to resolve data directory")?;
        let store = FileStore::open(&data_dir)
            .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
        debug!(data_dir = %data_dir.display(), "using file store");

        let command = cli
            .command
            .unwrap_or(Command::List { filter: Filter::All });
        let notices = NoticeBoard::new(cfg.notice_duration()?);
        let confirm = commands::terminal_confirm(command.assume_yes());
        let mut controller = Controller::start(Persistence::new(store), confirm, notices);

        let renderer = Renderer::new(&cfg)?;
        commands::dispatch(&mut controller, &renderer, command)?;

        info!("done");
        Ok(())
    }
}
