//! Pure projection from (tasks, filter) to what the list region shows.
//!
//! Nothing here touches a display. Front-ends rebuild the whole list from a
//! fresh [`ListView`] after every state change.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::filter::Filter;
use crate::task::{Task, TaskId};

pub const EMPTY_COLLECTION: &str = "No tasks yet — add your first task!";
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub filter: Filter,
    pub items: Vec<TaskItem>,
    /// Set exactly when `items` is empty.
    pub empty: Option<&'static str>,
    pub remaining: usize,
    pub total: usize,
}

impl ListView {
    pub fn count_label(&self) -> String {
        format!("{} / {} tasks remaining", self.remaining, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub created_label: String,
}

impl TaskItem {
    pub fn class(&self) -> &'static str {
        if self.completed { "task completed" } else { "task" }
    }

    pub fn toggle_glyph(&self) -> &'static str {
        if self.completed { "✔" } else { "" }
    }

    pub fn toggle_title(&self) -> &'static str {
        if self.completed {
            "Mark incomplete"
        } else {
            "Mark complete"
        }
    }

    pub fn aria_pressed(&self) -> &'static str {
        if self.completed { "true" } else { "false" }
    }

    pub fn badge(&self) -> Option<&'static str> {
        self.completed.then_some("Done")
    }
}

pub fn render<Tz>(tasks: &[Task], filter: Filter, tz: &Tz) -> ListView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items: Vec<TaskItem> = filter
        .apply(tasks)
        .into_iter()
        .map(|task| TaskItem {
            id: task.id.clone(),
            text: task.text.clone(),
            completed: task.completed,
            created_label: format!("Created: {}", format_created(&task.created_at, tz)),
        })
        .collect();

    let empty = items
        .is_empty()
        .then(|| empty_message(tasks.is_empty(), filter));

    ListView {
        filter,
        items,
        empty,
        remaining: tasks.iter().filter(|t| !t.completed).count(),
        total: tasks.len(),
    }
}

pub fn empty_message(collection_empty: bool, filter: Filter) -> &'static str {
    if collection_empty {
        return EMPTY_COLLECTION;
    }
    match filter {
        Filter::Completed => "No completed tasks",
        Filter::Active => "No active tasks",
        Filter::All => "No tasks",
    }
}

/// Local rendering of a stored timestamp; the raw string when it does not parse.
pub fn format_created<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(tz).format(CREATED_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::{EMPTY_COLLECTION, format_created, render};
    use crate::filter::Filter;
    use crate::task::Task;

    fn tasks() -> Vec<Task> {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let mut done = Task::new("Buy milk".to_string(), now);
        done.completed = true;
        vec![Task::new("Walk dog".to_string(), now), done]
    }

    #[test]
    fn empty_collection_message_wins_over_filter() {
        for filter in Filter::ALL {
            let view = render(&[], filter, &Utc);
            assert!(view.items.is_empty());
            assert_eq!(view.empty, Some(EMPTY_COLLECTION));
            assert_eq!(view.count_label(), "0 / 0 tasks remaining");
        }
    }

    #[test]
    fn filter_specific_empty_messages() {
        let mut all_done = tasks();
        all_done[0].completed = true;
        assert_eq!(
            render(&all_done, Filter::Active, &Utc).empty,
            Some("No active tasks")
        );

        let none_done: Vec<Task> = tasks().into_iter().take(1).collect();
        assert_eq!(
            render(&none_done, Filter::Completed, &Utc).empty,
            Some("No completed tasks")
        );
    }

    #[test]
    fn items_carry_completion_controls() {
        let view = render(&tasks(), Filter::All, &Utc);
        assert_eq!(view.empty, None);
        assert_eq!(view.count_label(), "1 / 2 tasks remaining");

        let active = &view.items[0];
        assert_eq!(active.class(), "task");
        assert_eq!(active.toggle_title(), "Mark complete");
        assert_eq!(active.aria_pressed(), "false");
        assert_eq!(active.badge(), None);

        let done = &view.items[1];
        assert_eq!(done.class(), "task completed");
        assert_eq!(done.toggle_glyph(), "✔");
        assert_eq!(done.badge(), Some("Done"));
        assert_eq!(done.created_label, "Created: 2026-02-16 05:00:00");
    }

    #[test]
    fn created_time_uses_zone_and_falls_back_to_raw() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_created("2026-02-16T05:00:00.000Z", &plus_two),
            "2026-02-16 07:00:00"
        );
        assert_eq!(format_created("yesterday-ish", &Utc), "yesterday-ish");
    }
}
