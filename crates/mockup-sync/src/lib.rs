//! Mockup Sync: keeps a live form and its mockup in step
//!
//! - [`debounce`] collapses bursts of form changes into one sync
//! - [`form`] is the live form contract
//! - [`coordinator`] routes form changes, assistant replies and decisions

pub mod coordinator;
pub mod debounce;
pub mod form;
pub mod message;

pub use coordinator::{
    CommandOutcome, CoordinatorView, SyncCoordinator, DECISION_SOURCE, DEFAULT_DEBOUNCE,
};
pub use debounce::Debouncer;
pub use form::{FormSource, InMemoryForm};
pub use message::{ChatMessage, MessageRole};
