use std::time::Duration;

use crate::error::TodoError;

pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short-lived message. `ticket` identifies the dismissal timer that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub ticket: u64,
    pub duration: Duration,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Holds at most one visible notice. Showing a new one hands out a new ticket,
/// which cancels whatever dismissal the previous ticket had pending.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    next_ticket: u64,
    duration: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DURATION)
    }
}

impl NoticeBoard {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            next_ticket: 1,
            duration,
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn info(&mut self, message: impl Into<String>) -> &Notice {
        self.show(message, NoticeLevel::Info)
    }

    pub fn error(&mut self, message: impl Into<String>) -> &Notice {
        self.show(message, NoticeLevel::Error)
    }

    pub fn show(&mut self, message: impl Into<String>, level: NoticeLevel) -> &Notice {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.current.insert(Notice {
            message: message.into(),
            level,
            ticket,
            duration: self.duration,
        })
    }

    /// Hides the notice if `ticket` still owns it. A stale ticket is a no-op.
    pub fn dismiss(&mut self, ticket: u64) -> bool {
        match &self.current {
            Some(notice) if notice.ticket == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Surfaces a domain error with the wording users see.
    pub fn report(&mut self, err: &TodoError) -> &Notice {
        self.error(error_message(err))
    }
}

pub fn error_message(err: &TodoError) -> &'static str {
    match err {
        TodoError::Validation => "Task cannot be empty",
        TodoError::Persistence(_) => "Error saving to localStorage",
        TodoError::Unreadable(_) => "Error reading from localStorage",
        TodoError::CorruptState(_) => "Corrupt data — reset",
    }
}
