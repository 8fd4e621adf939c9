//! VoltPy browser runtime: server command replies and marker-driven page behaviors.

pub mod binder;
pub mod dispatcher;
pub mod dom;
pub mod endpoints;
pub mod interpreter;
pub mod loading;
pub mod methods;
pub mod notice;
pub mod page;
pub mod plot;
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod testing;

pub use binder::{BehaviorBinder, BinderError, Binding, FollowUp, Handled};
pub use dispatcher::{CommandDispatcher, DispatchError, DispatchOutcome};
pub use dom::{Dom, DomEvent};
pub use endpoints::AuxiliaryApi;
pub use interpreter::{Applied, ReplyError, ReplyInterpreter};
pub use loading::LoadingIndicator;
pub use methods::MethodError;
pub use notice::{Notice, NoticeVariant};
pub use page::Page;
pub use plot::{LineDataSource, ModelResolver, PlotContext, PlotCursor, PlotError};
pub use transport::{FormPayload, Transport, TransportError};
