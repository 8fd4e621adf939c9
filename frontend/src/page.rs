use crate::notice::Notice;
use std::time::Duration;

/// Page-level effects: navigation, deferred reload and user notices.
pub trait Page {
    fn current_url(&self) -> String;
    /// Navigate away immediately.
    fn navigate(&self, url: &str);
    /// Reload the page once after `delay`. The timer cannot be cancelled.
    fn schedule_reload(&self, delay: Duration);
    fn notify(&self, notice: Notice);
}
