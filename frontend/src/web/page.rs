use crate::notice::Notice;
use crate::page::Page;
use gloo_timers::callback::Timeout;
use std::time::Duration;
use web_sys::Window;

#[derive(Clone)]
pub struct WebPage {
    window: Window,
}

impl WebPage {
    pub fn new() -> Option<Self> {
        Some(Self {
            window: web_sys::window()?,
        })
    }
}

impl Page for WebPage {
    fn current_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn navigate(&self, url: &str) {
        if self.window.location().set_href(url).is_err() {
            tracing::error!("navigation to {url} was refused");
        }
    }

    fn schedule_reload(&self, delay: Duration) {
        let location = self.window.location();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            if location.reload().is_err() {
                tracing::error!("page reload was refused");
            }
        })
        .forget();
    }

    fn notify(&self, notice: Notice) {
        let _ = self.window.alert_with_message(&notice.alert_text());
    }
}
