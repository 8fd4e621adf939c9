use crate::dom::Dom;
use crate::interpreter::{Applied, ReplyError, ReplyInterpreter};
use crate::loading::LoadingIndicator;
use crate::notice::Notice;
use crate::page::Page;
use crate::plot::PlotContext;
use crate::transport::{FormPayload, Transport, TransportError};
use shared::ClientConfig;
use std::cell::{Cell, RefCell};

/// Result of one completed request/response cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Applied(Applied),
    /// The reply arrived but its command could not be applied; the user
    /// has already been notified.
    Rejected(ReplyError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("a request is already in flight")]
    Busy,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Runs request/response cycles: overlay, POST, reply interpretation.
pub struct CommandDispatcher<T, D, P> {
    transport: T,
    dom: D,
    page: P,
    loading: RefCell<LoadingIndicator>,
    interpreter: ReplyInterpreter,
    loading_text: String,
    in_flight: Cell<bool>,
}

/// Clears the in-flight flag however the cycle ends.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T, D, P> CommandDispatcher<T, D, P>
where
    T: Transport,
    D: Dom,
    P: Page,
{
    pub fn new(transport: T, dom: D, page: P, config: &ClientConfig) -> Self {
        Self {
            transport,
            dom,
            page,
            loading: RefCell::new(LoadingIndicator::new(config)),
            interpreter: ReplyInterpreter::new(config),
            loading_text: config.loading_text.clone(),
            in_flight: Cell::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Send `payload` to `url` and apply the server's command to `context`.
    ///
    /// The overlay is torn down only after the command has been applied, and
    /// also when the transport fails.
    pub async fn send(
        &self,
        url: &str,
        payload: &FormPayload,
        context: &RefCell<PlotContext>,
    ) -> Result<DispatchOutcome, DispatchError> {
        if self.in_flight.replace(true) {
            tracing::warn!("request to {url} dropped, another request is in flight");
            return Err(DispatchError::Busy);
        }
        let _in_flight = InFlight(&self.in_flight);

        self.loading.borrow_mut().start(&self.dom, &self.loading_text);
        tracing::debug!("POST {url} with {} fields", payload.len());

        let reply = self.transport.post_form(url, payload).await;

        let outcome = match reply {
            Ok(reply) => {
                let applied =
                    self.interpreter
                        .process(&reply, &mut context.borrow_mut(), &self.page);
                Ok(match applied {
                    Ok(applied) => DispatchOutcome::Applied(applied),
                    Err(error) => DispatchOutcome::Rejected(error),
                })
            }
            Err(error) => {
                let notice = Notice::from_transport_error(url, &error);
                notice.log();
                self.page.notify(notice);
                Err(DispatchError::Transport(error))
            }
        };

        self.loading.borrow_mut().done(&self.dom);
        outcome
    }
}
