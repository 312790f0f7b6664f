//! User-facing notifications.
//!
//! Systems that hit a failure the user should hear about (bad import, failed
//! cache write, rejected catalog append) send a `NotificationEvent`. The
//! events are collected into the bounded `NotificationLog`, which the
//! presentation layer reads and drains.

use bevy::prelude::*;

// =============================================================================
// Priority Levels
// =============================================================================

/// Notification priority, from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum NotificationPriority {
    /// An operation failed and nothing was changed.
    Error,
    /// Something degraded but the session continues.
    Warning,
    Info,
}

impl NotificationPriority {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationPriority::Error => "ERROR",
            NotificationPriority::Warning => "WARNING",
            NotificationPriority::Info => "INFO",
        }
    }
}

// =============================================================================
// Event + record
// =============================================================================

#[derive(Event, Debug, Clone)]
pub struct NotificationEvent {
    pub text: String,
    pub priority: NotificationPriority,
}

impl NotificationEvent {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: NotificationPriority::Error,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: NotificationPriority::Warning,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: NotificationPriority::Info,
        }
    }
}

/// A collected notification.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub priority: NotificationPriority,
}

// =============================================================================
// NotificationLog Resource
// =============================================================================

/// Pending notifications, oldest first.
#[derive(Resource)]
pub struct NotificationLog {
    pending: Vec<Notification>,
    /// Oldest entries are dropped beyond this many.
    pub max_pending: usize,
    next_id: u64,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            max_pending: 100,
            next_id: 1,
        }
    }
}

impl NotificationLog {
    pub fn push(&mut self, event: &NotificationEvent) {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Notification {
            id,
            text: event.text.clone(),
            priority: event.priority,
        });
        if self.pending.len() > self.max_pending {
            let excess = self.pending.len() - self.max_pending;
            self.pending.drain(..excess);
        }
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Removes and returns everything pending.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =============================================================================
// Systems + plugin
// =============================================================================

fn collect_notifications(
    mut events: EventReader<NotificationEvent>,
    mut log: ResMut<NotificationLog>,
) {
    for event in events.read() {
        log.push(event);
    }
}

pub struct NotificationsPlugin;

impl Plugin for NotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<NotificationEvent>()
            .init_resource::<NotificationLog>()
            .add_systems(Last, collect_notifications);
    }
}
