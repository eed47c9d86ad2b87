//! Screen view-models: the state behind each tab and the operations that
//! move it, independent of any terminal.
//!
//! Every operation that talks to the backend takes `&dyn UserApi` and returns
//! an optional [`Notice`] for the status bar.

pub mod profile;
pub mod register;
pub mod user_list;

pub use profile::ProfileScreen;
pub use register::RegisterScreen;
pub use user_list::UserListScreen;

use std::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short message for the user, like a toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into(), at: Instant::now() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into(), at: Instant::now() }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
