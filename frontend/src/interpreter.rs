use crate::notice::Notice;
use crate::page::Page;
use crate::plot::{PlotContext, PlotError};
use shared::{ClientConfig, Command, ProtocolError};
use std::time::Duration;

/// Effect performed for one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Nothing,
    ReloadScheduled(Duration),
    Redirected(String),
    CursorShown { number: usize, location: f64 },
    CursorHidden { number: usize },
    LineDataSet { len: usize },
    LineRemoved,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplyError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("command '{0}' is not supported by this client")]
    Unsupported(&'static str),
    #[error("cursor {number} does not exist, the plot has {available} cursors")]
    CursorOutOfRange { number: usize, available: usize },
    #[error("'{0}' needs a line data source but the page supplied none")]
    MissingLineData(&'static str),
    #[error("line data has {x} x values but {y} y values")]
    LengthMismatch { x: usize, y: usize },
    #[error(transparent)]
    Plot(#[from] PlotError),
}

impl ReplyError {
    /// Violations of a command's preconditions, as opposed to protocol gaps.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ReplyError::CursorOutOfRange { .. }
                | ReplyError::MissingLineData(_)
                | ReplyError::LengthMismatch { .. }
                | ReplyError::Protocol(ProtocolError::NotANumber(_))
                | ReplyError::Protocol(ProtocolError::Malformed { .. })
        )
    }
}

/// Maps server commands onto plot and page effects.
#[derive(Debug, Clone)]
pub struct ReplyInterpreter {
    reload_delay: Duration,
    fail_fast: bool,
}

impl ReplyInterpreter {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            reload_delay: config.reload_delay(),
            fail_fast: config.fail_fast,
        }
    }

    /// Decode and apply a raw reply, turning failures into a user notice.
    pub fn process(
        &self,
        reply: &serde_json::Value,
        context: &mut PlotContext,
        page: &dyn Page,
    ) -> Result<Applied, ReplyError> {
        let result = Command::from_reply(reply)
            .map_err(ReplyError::from)
            .and_then(|command| self.apply(&command, context, page));

        if let Err(error) = &result {
            if self.fail_fast && error.is_precondition() {
                panic!("precondition violated while applying server reply: {error}");
            }
            let notice = Notice::from_reply_error(error);
            notice.log();
            page.notify(notice);
        }
        result
    }

    pub fn apply(
        &self,
        command: &Command,
        context: &mut PlotContext,
        page: &dyn Page,
    ) -> Result<Applied, ReplyError> {
        match command {
            Command::None => Ok(Applied::Nothing),
            Command::Reload => {
                page.schedule_reload(self.reload_delay);
                Ok(Applied::ReloadScheduled(self.reload_delay))
            }
            Command::Redirect { location } => {
                page.navigate(location);
                Ok(Applied::Redirected(location.clone()))
            }
            Command::SetCursor { number, x } => {
                let location = x.as_f64()?;
                let available = context.cursors.len();
                let cursor = context
                    .cursors
                    .get_mut(*number)
                    .ok_or(ReplyError::CursorOutOfRange { number: *number, available })?;
                cursor.set_location(location);
                cursor.set_line_alpha(1.0);
                tracing::debug!("cursor {number} moved to {location}");
                Ok(Applied::CursorShown { number: *number, location })
            }
            Command::RemoveCursor { number } => {
                let available = context.cursors.len();
                let cursor = context
                    .cursors
                    .get_mut(*number)
                    .ok_or(ReplyError::CursorOutOfRange { number: *number, available })?;
                cursor.set_line_alpha(0.0);
                Ok(Applied::CursorHidden { number: *number })
            }
            Command::SetLineData { x, y } => {
                if x.len() != y.len() {
                    return Err(ReplyError::LengthMismatch { x: x.len(), y: y.len() });
                }
                let line_data = context
                    .line_data
                    .as_deref_mut()
                    .ok_or(ReplyError::MissingLineData("setLineData"))?;
                for (index, (x, y)) in x.iter().zip(y).enumerate() {
                    line_data.set_point(index, *x, *y)?;
                }
                line_data.truncate(x.len())?;
                line_data.notify_change()?;
                tracing::debug!("line data replaced with {} points", x.len());
                Ok(Applied::LineDataSet { len: x.len() })
            }
            Command::RemoveLine => {
                let line_data = context
                    .line_data
                    .as_deref_mut()
                    .ok_or(ReplyError::MissingLineData("removeLine"))?;
                line_data.clear()?;
                line_data.notify_change()?;
                Ok(Applied::LineRemoved)
            }
            Command::ChangeColor => Err(ReplyError::Unsupported("changeColor")),
        }
    }
}
