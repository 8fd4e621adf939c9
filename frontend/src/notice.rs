use crate::interpreter::ReplyError;
use crate::transport::TransportError;
use shared::MarkerError;

/// Notice variant for styling different kinds of user messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeVariant {
    /// Something the user asked for did not happen
    #[default]
    Error,
    /// The page degraded but kept working
    Warning,
}

/// User-facing notice.
///
/// `technical` carries the raw error for the console, `message` is what the
/// user reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub technical: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn from_reply_error(error: &ReplyError) -> Self {
        match error {
            ReplyError::Unsupported(kind) => Self {
                title: "Not Supported".to_string(),
                message: format!("The server asked for '{kind}', which this page does not support."),
                technical: error.to_string(),
                variant: NoticeVariant::Error,
            },
            ReplyError::Protocol(_) => Self {
                title: "Unexpected Server Reply".to_string(),
                message: "The server sent a reply this page does not understand.".to_string(),
                technical: error.to_string(),
                variant: NoticeVariant::Error,
            },
            _ => Self {
                title: "Plot Update Skipped".to_string(),
                message: "Part of the server reply could not be applied to the plot.".to_string(),
                technical: error.to_string(),
                variant: NoticeVariant::Warning,
            },
        }
    }

    pub fn from_transport_error(url: &str, error: &TransportError) -> Self {
        Self {
            title: "Connection Error".to_string(),
            message: make_error_user_friendly(&error.to_string()),
            technical: format!("POST {url} failed: {error}"),
            variant: NoticeVariant::Error,
        }
    }

    pub fn from_marker_error(class_attribute: &str, error: &MarkerError) -> Self {
        Self {
            title: "Page Control Disabled".to_string(),
            message: "A control on this page is misconfigured and was disabled.".to_string(),
            technical: format!("element with classes '{class_attribute}': {error}"),
            variant: NoticeVariant::Warning,
        }
    }

    pub fn from_binder_error(error: &crate::binder::BinderError) -> Self {
        Self {
            title: "Action Skipped".to_string(),
            message: "This control could not complete its action.".to_string(),
            technical: error.to_string(),
            variant: NoticeVariant::Warning,
        }
    }

    /// Text shown by hosts that only have a plain message box.
    pub fn alert_text(&self) -> String {
        format!("{}: {}", self.title, self.message)
    }

    /// Log the technical side of the notice.
    pub fn log(&self) {
        match self.variant {
            NoticeVariant::Error => tracing::error!("{}: {}", self.title, self.technical),
            NoticeVariant::Warning => tracing::warn!("{}: {}", self.title, self.technical),
        }
    }
}

pub fn make_error_user_friendly(error: &str) -> String {
    let error_lower = error.to_lowercase();

    if error_lower.contains("status 403") {
        "The server refused the request. Your session may have expired, please reload the page."
            .to_string()
    } else if error_lower.contains("status 404") {
        "The requested action no longer exists on the server.".to_string()
    } else if error_lower.contains("status 5") {
        "The server failed to process the request. Please try again.".to_string()
    } else if error_lower.contains("network") || error_lower.contains("fetch") {
        "Connection error. Please check your network connection.".to_string()
    } else if error_lower.contains("decode") || error_lower.contains("json") {
        "The server sent a reply this page does not understand.".to_string()
    } else {
        error.trim().to_string()
    }
}
