//! Notification side channel
//!
//! System-level notifications are delivered through a platform seam:
//! the [`Notifier`] trait. Permission is requested once, best-effort;
//! a missing grant never blocks the in-app banner path, it only skips
//! the system notification.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::info;

/// Application icon reference forwarded to the platform.
pub const APP_ICON: &str = "icon-192.png";
/// Badge icon reference forwarded to the platform.
pub const APP_BADGE: &str = "icon-192.png";

/// Platform notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    NotDetermined,
    Granted,
    Denied,
}

/// A system notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: &'static str,
    pub badge: &'static str,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: APP_ICON,
            badge: APP_BADGE,
        }
    }
}

/// Platform seam for system notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask the platform for permission if it has not been decided yet.
    async fn request_permission(&self) -> PermissionState;

    /// The last known permission decision.
    fn permission(&self) -> PermissionState;

    /// Show a system notification. Callers check [`permission`]
    /// first; implementations may drop the payload when not granted.
    ///
    /// [`permission`]: Notifier::permission
    fn notify(&self, notification: &Notification);
}

/// Default notifier: records the permission decision and logs payloads.
///
/// Stands in for the platform channel on targets without one; the
/// in-app banner remains the user-visible surface.
#[derive(Debug, Default)]
pub struct LogNotifier {
    // 0 = not determined, 1 = granted, 2 = denied
    permission: AtomicU8,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that starts out granted, for tests and headless runs.
    pub fn granted() -> Self {
        Self {
            permission: AtomicU8::new(1),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn request_permission(&self) -> PermissionState {
        // First request decides; the platform never re-prompts.
        let _ = self
            .permission
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst);
        self.permission()
    }

    fn permission(&self) -> PermissionState {
        match self.permission.load(Ordering::SeqCst) {
            1 => PermissionState::Granted,
            2 => PermissionState::Denied,
            _ => PermissionState::NotDetermined,
        }
    }

    fn notify(&self, notification: &Notification) {
        info!(
            title = %notification.title,
            body = %notification.body,
            "system notification"
        );
    }
}
