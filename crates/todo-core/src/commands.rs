use std::io::{self, BufRead, IsTerminal, Write};

use chrono::Local;
use tracing::{debug, instrument, warn};

use crate::cli::Command;
use crate::controller::{Confirm, Controller};
use crate::render::Renderer;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::TaskId;

/// Resolves an exact id or an unambiguous id prefix.
pub fn resolve_id<S: KeyValueStore>(store: &TaskStore<S>, token: &str) -> Option<TaskId> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(task) = store.tasks().iter().find(|t| t.id.as_str() == token) {
        return Some(task.id.clone());
    }

    let mut matches = store
        .tasks()
        .iter()
        .filter(|t| t.id.as_str().starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first.id.clone())
    }
}

/// Runs one terminal command against the controller, then prints the notice
/// (stderr) and the list as the current filter shows it (stdout).
#[instrument(skip(controller, renderer))]
pub fn dispatch<S, C>(
    controller: &mut Controller<S, C>,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Confirm,
{
    match command {
        Command::List { filter } => {
            controller.set_filter(filter);
        }
        Command::Add { text } => {
            controller.submit(&text.join(" "));
        }
        Command::Toggle { id } => match resolve_id(controller.store(), &id) {
            Some(id) => {
                controller.toggle(&id);
            }
            None => report_missing(&id)?,
        },
        Command::Edit { id, text } => match resolve_id(controller.store(), &id) {
            Some(id) => {
                controller.begin_edit(&id);
                controller.update_draft(text.join(" "));
                controller.commit_edit();
            }
            None => report_missing(&id)?,
        },
        Command::Remove { id, .. } => match resolve_id(controller.store(), &id) {
            Some(id) => {
                controller.delete(&id);
            }
            None => report_missing(&id)?,
        },
        Command::ClearCompleted { .. } => {
            controller.clear_completed();
        }
        Command::ClearAll { .. } => {
            controller.clear_all();
        }
    }

    if let Some(notice) = controller.notice() {
        renderer.write_notice(io::stderr().lock(), notice)?;
    }
    renderer.write_list(io::stdout().lock(), &controller.view(&Local))?;
    Ok(())
}

fn report_missing(token: &str) -> anyhow::Result<()> {
    warn!(token, "no task matches id");
    writeln!(io::stderr().lock(), "No task matches id {token}")?;
    Ok(())
}

/// Confirmation for terminal use: `--yes` approves everything, otherwise the
/// prompt is asked on stderr and read from stdin. Non-interactive stdin
/// declines.
pub fn terminal_confirm(assume_yes: bool) -> impl FnMut(&str) -> bool {
    move |prompt: &str| {
        if assume_yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            debug!(prompt, "stdin is not a terminal, declining");
            return false;
        }
        let mut err = io::stderr().lock();
        if write!(err, "{prompt} [y/N] ").and_then(|_| err.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        parse_answer(&answer)
    }
}

fn parse_answer(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_answer, resolve_id};
    use crate::persistence::Persistence;
    use crate::storage::MemoryStore;
    use crate::store::TaskStore;
    use crate::task::TaskId;

    #[test]
    fn resolves_exact_and_unique_prefix() {
        let mut store = TaskStore::new(Persistence::new(MemoryStore::new()));
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();

        assert_eq!(resolve_id(&store, a.as_str()), Some(a.clone()));
        assert_eq!(resolve_id(&store, &format!(" {b} ")), Some(b.clone()));
        assert_eq!(resolve_id(&store, "no-such-id"), None);
        assert_eq!(resolve_id(&store, ""), None);

        let full = b.as_str();
        let unique = (1..=full.len())
            .map(|n| &full[..n])
            .find(|prefix| !a.as_str().starts_with(prefix))
            .unwrap();
        assert_eq!(resolve_id(&store, unique), Some(b));
        assert_eq!(resolve_id(&store, "#"), None::<TaskId>);
    }

    #[test]
    fn only_yes_answers_confirm() {
        assert!(parse_answer("y\n"));
        assert!(parse_answer(" YES "));
        assert!(!parse_answer("\n"));
        assert!(!parse_answer("nah"));
    }
}
