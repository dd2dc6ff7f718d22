//! Dependent UI components
//!
//! The workflow addresses these only through [`ComponentRegistry`]. A component that is not
//! mounted is skipped, never treated as an error.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Error;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Progress
    Info,
    /// Completed
    Success,
    /// Failed
    Error,
}

/// User facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Title
    pub title: String,
    /// Body
    pub message: String,
    /// Explorer link
    pub link: Option<String>,
}

impl Notification {
    /// Info notification
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }

    /// Success notification
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    /// Error notification
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            link: None,
        }
    }

    /// Attach explorer link
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }
}

/// Shows notifications
pub trait Notifier: Send + Sync {
    /// Show `notification`
    fn notify(&self, notification: Notification);
}

/// Approve and bridge actions panel
#[async_trait]
pub trait ActionPanel: Send + Sync {
    /// Re-read the vault approval state from chain
    async fn check_approval(&self) -> Result<(), Error>;

    /// Recompute the form after an account change
    fn update_form(&self);
}

/// Input form (recipient, ids, amount)
pub trait FormPanel: Send + Sync {
    /// Re-run input validation
    fn validate(&self);

    /// Clear inputs
    fn clear(&self);
}

/// Mounted components
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    /// Notifier
    pub notifier: Option<Arc<dyn Notifier>>,
    /// Actions panel
    pub actions: Option<Arc<dyn ActionPanel>>,
    /// Form panel
    pub form: Option<Arc<dyn FormPanel>>,
}

impl ComponentRegistry {
    /// Notify if a notifier is mounted
    pub fn notify(&self, notification: Notification) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(notification);
        }
    }

    /// Validate the form if mounted
    pub fn validate_form(&self) {
        if let Some(form) = &self.form {
            form.validate();
        }
    }

    /// Clear the form if mounted
    pub fn clear_form(&self) {
        if let Some(form) = &self.form {
            form.clear();
        }
    }

    /// Update the actions panel if mounted
    pub fn update_actions(&self) {
        if let Some(actions) = &self.actions {
            actions.update_form();
        }
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("notifier", &self.notifier.is_some())
            .field("actions", &self.actions.is_some())
            .field("form", &self.form.is_some())
            .finish()
    }
}
