use std::fmt::Display;

use chrono::TimeZone;
use tracing::{debug, info};

use crate::filter::Filter;
use crate::notice::{Notice, NoticeBoard};
use crate::persistence::Persistence;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::TaskId;
use crate::view::{self, ListView};

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing { id: TaskId, draft: String },
}

/// Everything a front-end can ask of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    Toggle(TaskId),
    BeginEdit(TaskId),
    UpdateDraft(String),
    CommitEdit,
    CancelEdit,
    Delete(TaskId),
    ClearCompleted,
    ClearAll,
    SetFilter(Filter),
    /// Another tab wrote to storage. `None` means the whole store was cleared.
    StorageChanged { key: Option<String> },
}

/// What a front-end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub list: ListView,
    pub editing: Option<(TaskId, String)>,
    pub notice: Option<Notice>,
}

pub struct Controller<S, C> {
    store: TaskStore<S>,
    filter: Filter,
    edit: EditState,
    notices: NoticeBoard,
    confirm: C,
}

impl<S: KeyValueStore, C: Confirm> Controller<S, C> {
    /// Loads the stored collection and starts on the `all` filter.
    #[tracing::instrument(skip_all)]
    pub fn start(persistence: Persistence<S>, confirm: C, notices: NoticeBoard) -> Self {
        let mut controller = Self {
            store: TaskStore::new(persistence),
            filter: Filter::All,
            edit: EditState::Viewing,
            notices,
            confirm,
        };
        match controller.store.reload() {
            Ok(count) => info!(count, "loaded tasks"),
            Err(err) => {
                controller.notices.report(&err);
            }
        }
        controller
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    /// Message of the current notice when it is an error.
    pub fn last_error(&self) -> Option<&str> {
        self.notices
            .current()
            .filter(|n| n.is_error())
            .map(|n| n.message.as_str())
    }

    pub fn dismiss_notice(&mut self, ticket: u64) -> bool {
        self.notices.dismiss(ticket)
    }

    pub fn view<Tz>(&self, tz: &Tz) -> ListView
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        view::render(self.store.tasks(), self.filter, tz)
    }

    pub fn snapshot<Tz>(&self, tz: &Tz) -> Snapshot
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let editing = match &self.edit {
            EditState::Viewing => None,
            EditState::Editing { id, draft } => Some((id.clone(), draft.clone())),
        };
        Snapshot {
            list: self.view(tz),
            editing,
            notice: self.notices.current().cloned(),
        }
    }

    /// Runs one action to completion. Returns whether it took effect; for
    /// [`Action::Submit`] that is the signal to clear the input field.
    pub fn dispatch(&mut self, action: Action) -> bool {
        debug!(?action, "dispatch");
        match action {
            Action::Submit(text) => self.submit(&text),
            Action::Toggle(id) => self.toggle(&id),
            Action::BeginEdit(id) => self.begin_edit(&id),
            Action::UpdateDraft(text) => self.update_draft(text),
            Action::CommitEdit => self.commit_edit(),
            Action::CancelEdit => self.cancel_edit(),
            Action::Delete(id) => self.delete(&id),
            Action::ClearCompleted => self.clear_completed(),
            Action::ClearAll => self.clear_all(),
            Action::SetFilter(filter) => self.set_filter(filter),
            Action::StorageChanged { key } => self.storage_changed(key.as_deref()),
        }
    }

    pub fn submit(&mut self, text: &str) -> bool {
        match self.store.add(text) {
            Ok(_) => {
                self.notify("Task added ✔️");
                true
            }
            Err(err) => {
                self.notices.report(&err);
                false
            }
        }
    }

    pub fn toggle(&mut self, id: &TaskId) -> bool {
        match self.store.toggle_complete(id) {
            Some(true) => self.notify("Marked complete"),
            Some(false) => self.notify("Marked incomplete"),
            None => return false,
        }
        true
    }

    /// Switches a row into edit mode with its current text as the draft. A
    /// row already being edited is committed first, as losing focus would.
    pub fn begin_edit(&mut self, id: &TaskId) -> bool {
        let Some(text) = self.store.get(id).map(|t| t.text.clone()) else {
            return false;
        };
        if matches!(&self.edit, EditState::Editing { id: current, .. } if current != id) {
            self.commit_edit();
        }
        self.edit = EditState::Editing {
            id: id.clone(),
            draft: text,
        };
        true
    }

    pub fn update_draft(&mut self, text: String) -> bool {
        match &mut self.edit {
            EditState::Editing { draft, .. } => {
                *draft = text;
                true
            }
            EditState::Viewing => false,
        }
    }

    /// Enter or blur. Always returns to viewing; mutates only for non-blank drafts.
    pub fn commit_edit(&mut self) -> bool {
        let EditState::Editing { id, draft } = std::mem::take(&mut self.edit) else {
            return false;
        };
        match self.store.edit(&id, &draft) {
            Ok(true) => {
                self.notify("Task updated");
                true
            }
            Ok(false) => false,
            Err(err) => {
                self.notices.report(&err);
                false
            }
        }
    }

    /// Escape. Drops the draft whatever it holds.
    pub fn cancel_edit(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.edit), EditState::Viewing)
    }

    pub fn delete(&mut self, id: &TaskId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        if !self.confirm.confirm("Delete this task?") {
            debug!(%id, "delete declined");
            return false;
        }
        self.store.remove(id);
        self.drop_stale_edit();
        self.notify("Task removed");
        true
    }

    pub fn clear_completed(&mut self) -> bool {
        let count = self.store.completed_count();
        if count == 0 {
            self.notices.info("No completed tasks");
            return false;
        }
        if !self
            .confirm
            .confirm(&format!("Delete {count} completed tasks?"))
        {
            debug!(count, "clear completed declined");
            return false;
        }
        self.store.clear_completed();
        self.drop_stale_edit();
        self.notify("Completed tasks removed");
        true
    }

    pub fn clear_all(&mut self) -> bool {
        if self.store.is_empty() {
            self.notices.info("No tasks");
            return false;
        }
        if !self.confirm.confirm("Delete ALL tasks?") {
            debug!("clear all declined");
            return false;
        }
        self.store.clear_all();
        self.edit = EditState::Viewing;
        self.notify("All tasks cleared");
        true
    }

    pub fn set_filter(&mut self, filter: Filter) -> bool {
        self.edit = EditState::Viewing;
        let changed = self.filter != filter;
        self.filter = filter;
        changed
    }

    /// Reloads from persistence when the change concerns our key. Any
    /// in-memory edit in progress is discarded.
    #[tracing::instrument(skip(self))]
    pub fn storage_changed(&mut self, key: Option<&str>) -> bool {
        if let Some(key) = key
            && key != self.store.persistence().key()
        {
            return false;
        }
        self.edit = EditState::Viewing;
        match self.store.reload() {
            Ok(count) => {
                info!(count, "reloaded tasks after external change");
                self.notices.info("Updated from another tab");
            }
            Err(err) => {
                self.notices.report(&err);
            }
        }
        true
    }

    fn notify(&mut self, success: &str) {
        match self.store.take_save_error() {
            Some(err) => {
                self.notices.report(&err);
            }
            None => {
                self.notices.info(success);
            }
        }
    }

    fn drop_stale_edit(&mut self) {
        if let EditState::Editing { id, .. } = &self.edit
            && self.store.get(id).is_none()
        {
            self.edit = EditState::Viewing;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::Utc;

    use super::{Action, Controller, EditState};
    use crate::error::StorageError;
    use crate::filter::Filter;
    use crate::notice::NoticeBoard;
    use crate::persistence::{Persistence, STORAGE_KEY};
    use crate::storage::{KeyValueStore, MemoryStore};

    type Prompts = Rc<RefCell<Vec<String>>>;

    fn controller(
        answer: bool,
    ) -> (
        Controller<MemoryStore, impl FnMut(&str) -> bool>,
        Prompts,
    ) {
        controller_with(MemoryStore::new(), answer)
    }

    fn controller_with(
        store: MemoryStore,
        answer: bool,
    ) -> (
        Controller<MemoryStore, impl FnMut(&str) -> bool>,
        Prompts,
    ) {
        let prompts: Prompts = Rc::default();
        let seen = prompts.clone();
        let confirm = move |prompt: &str| {
            seen.borrow_mut().push(prompt.to_string());
            answer
        };
        (
            Controller::start(Persistence::new(store), confirm, NoticeBoard::default()),
            prompts,
        )
    }

    fn message<S: KeyValueStore, C: super::Confirm>(c: &Controller<S, C>) -> Option<String> {
        c.notice().map(|n| n.message.clone())
    }

    #[test]
    fn submit_reports_success_and_validation() {
        let (mut c, _) = controller(true);

        assert!(c.dispatch(Action::Submit("Buy milk".into())));
        assert_eq!(message(&c).as_deref(), Some("Task added ✔️"));

        assert!(!c.dispatch(Action::Submit("   ".into())));
        assert_eq!(c.last_error(), Some("Task cannot be empty"));
        assert_eq!(c.store().len(), 1);
    }

    #[test]
    fn edit_commit_applies_trimmed_draft() {
        let (mut c, _) = controller(true);
        c.submit("old");
        let id = c.store().tasks()[0].id.clone();

        assert!(c.dispatch(Action::BeginEdit(id.clone())));
        assert_eq!(
            c.edit_state(),
            &EditState::Editing {
                id: id.clone(),
                draft: "old".into()
            }
        );
        c.dispatch(Action::UpdateDraft("  new  ".into()));
        assert!(c.dispatch(Action::CommitEdit));

        assert_eq!(c.edit_state(), &EditState::Viewing);
        assert_eq!(c.store().get(&id).unwrap().text, "new");
        assert_eq!(message(&c).as_deref(), Some("Task updated"));
    }

    #[test]
    fn blank_commit_reverts_without_mutation() {
        let (mut c, _) = controller(true);
        c.submit("keep");
        let id = c.store().tasks()[0].id.clone();

        c.begin_edit(&id);
        c.update_draft(" ".into());
        assert!(!c.commit_edit());

        assert_eq!(c.edit_state(), &EditState::Viewing);
        assert_eq!(c.store().get(&id).unwrap().text, "keep");
        assert_eq!(c.last_error(), Some("Task cannot be empty"));
    }

    #[test]
    fn escape_discards_any_draft() {
        let (mut c, _) = controller(true);
        c.submit("keep");
        let id = c.store().tasks()[0].id.clone();

        c.begin_edit(&id);
        c.update_draft("changed".into());
        assert!(c.dispatch(Action::CancelEdit));
        assert_eq!(c.edit_state(), &EditState::Viewing);
        assert_eq!(c.store().get(&id).unwrap().text, "keep");
        assert!(!c.cancel_edit());
    }

    #[test]
    fn beginning_another_edit_commits_the_first() {
        let (mut c, _) = controller(true);
        c.submit("a");
        c.submit("b");
        let b = c.store().tasks()[0].id.clone();
        let a = c.store().tasks()[1].id.clone();

        c.begin_edit(&a);
        c.update_draft("a2".into());
        c.begin_edit(&b);

        assert_eq!(c.store().get(&a).unwrap().text, "a2");
        assert!(matches!(c.edit_state(), EditState::Editing { id, .. } if id == &b));
    }

    #[test]
    fn destructive_actions_need_confirmation() {
        let (mut c, prompts) = controller(false);
        c.submit("a");
        let id = c.store().tasks()[0].id.clone();
        c.toggle(&id);

        assert!(!c.dispatch(Action::Delete(id.clone())));
        assert!(!c.dispatch(Action::ClearCompleted));
        assert!(!c.dispatch(Action::ClearAll));
        assert_eq!(c.store().len(), 1);
        assert_eq!(
            *prompts.borrow(),
            vec![
                "Delete this task?".to_string(),
                "Delete 1 completed tasks?".to_string(),
                "Delete ALL tasks?".to_string()
            ]
        );
    }

    #[test]
    fn confirmed_deletes_apply() {
        let (mut c, _) = controller(true);
        c.submit("a");
        c.submit("b");
        let b = c.store().tasks()[0].id.clone();

        assert!(c.delete(&b));
        assert_eq!(message(&c).as_deref(), Some("Task removed"));
        assert!(!c.delete(&b));

        assert!(c.clear_all());
        assert_eq!(message(&c).as_deref(), Some("All tasks cleared"));
        assert!(c.store().is_empty());
    }

    #[test]
    fn nothing_to_clear_skips_the_prompt() {
        let (mut c, prompts) = controller(true);

        assert!(!c.clear_all());
        assert_eq!(message(&c).as_deref(), Some("No tasks"));
        c.submit("a");
        assert!(!c.clear_completed());
        assert_eq!(message(&c).as_deref(), Some("No completed tasks"));
        assert!(prompts.borrow().is_empty());
    }

    #[test]
    fn storage_change_reloads_only_for_our_key() {
        let (mut c, _) = controller(true);
        c.submit("mine");
        let id = c.store().tasks()[0].id.clone();
        c.begin_edit(&id);

        assert!(!c.storage_changed(Some("theme")));
        assert!(matches!(c.edit_state(), EditState::Editing { .. }));

        let external = r#"[{"id":"x","text":"theirs","completed":true,"createdAt":"2026-02-16T05:00:00.000Z"}]"#;
        c.store
            .persistence_mut()
            .store_mut()
            .set(STORAGE_KEY, external)
            .unwrap();
        assert!(c.dispatch(Action::StorageChanged {
            key: Some(STORAGE_KEY.to_string())
        }));

        assert_eq!(c.edit_state(), &EditState::Viewing);
        assert_eq!(c.store().tasks()[0].text, "theirs");
        assert_eq!(message(&c).as_deref(), Some("Updated from another tab"));

        assert!(c.storage_changed(None));
    }

    #[test]
    fn startup_with_corrupt_data_resets_and_reports() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "[{]").unwrap();
        let (c, _) = controller_with(store, true);

        assert!(c.store().is_empty());
        assert_eq!(c.last_error(), Some("Corrupt data — reset"));
        assert_eq!(c.store().persistence().store().get(STORAGE_KEY).unwrap(), None);
    }

    struct Unreadable;

    impl KeyValueStore for Unreadable {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("access denied".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn startup_read_failure_reports_reading_not_saving() {
        let mut c = Controller::start(
            Persistence::new(Unreadable),
            |_: &str| true,
            NoticeBoard::default(),
        );

        assert!(c.store().is_empty());
        assert_eq!(c.last_error(), Some("Error reading from localStorage"));

        assert!(c.storage_changed(Some(STORAGE_KEY)));
        assert_eq!(c.last_error(), Some("Error reading from localStorage"));
    }

    #[test]
    fn save_failure_replaces_success_notice() {
        let (mut c, _) = controller_with(MemoryStore::with_quota(20), true);

        assert!(c.submit("does not fit"));
        assert_eq!(c.store().len(), 1);
        assert_eq!(c.last_error(), Some("Error saving to localStorage"));
    }

    #[test]
    fn filter_change_drops_edit_and_does_not_persist() {
        let (mut c, _) = controller(true);
        c.submit("a");
        let id = c.store().tasks()[0].id.clone();
        c.begin_edit(&id);

        assert!(c.dispatch(Action::SetFilter(Filter::Completed)));
        assert_eq!(c.edit_state(), &EditState::Viewing);
        assert_eq!(c.view(&Utc).empty, Some("No completed tasks"));
        assert!(!c.set_filter(Filter::Completed));
    }

    #[test]
    fn snapshot_exposes_edit_and_notice() {
        let (mut c, _) = controller(true);
        c.submit("a");
        let id = c.store().tasks()[0].id.clone();
        c.begin_edit(&id);

        let snap = c.snapshot(&Utc);
        assert_eq!(snap.editing, Some((id, "a".to_string())));
        assert_eq!(snap.list.items.len(), 1);
        let ticket = snap.notice.unwrap().ticket;
        assert!(c.dismiss_notice(ticket));
        assert!(c.snapshot(&Utc).notice.is_none());
    }
}
