//! Viewport section coordinator for single-page layouts.
//!
//! [`Coordinator`] discovers the sections of a page snapshot, tracks which
//! one is in view, plays one-shot staggered entrance animations, drives
//! smooth navigation between sections and keeps a progress indicator in
//! sync. It never touches a real document: hosts feed it input and apply
//! the [`FlowCommand`](folio_flow_protocol::FlowCommand)s it queues.

pub mod config;
pub mod coordinator;
pub mod effects;
pub mod error;
pub mod input;
pub mod model;
pub mod navigation;
pub mod notify;
pub mod observer;
pub mod progress;
pub mod schedule;

pub use config::{FlowConfig, IntersectionSource, RootMargin};
pub use coordinator::Coordinator;
pub use error::FlowError;
pub use navigation::{NavIntent, NavigationOutcome};
pub use notify::SubscriptionId;
