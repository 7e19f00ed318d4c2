//! Concurrent check pipeline
//!
//! Targets go to the [`Dispatcher`], which runs checks on a bounded worker
//! pool. Each result is fanned out by the [`ResultBroadcaster`] to every
//! registered sink.

pub mod broadcaster;
pub mod counter;
pub mod dispatcher;

pub use broadcaster::{ResultBroadcaster, SinkState};
pub use counter::CompletionCounter;
pub use dispatcher::Dispatcher;
