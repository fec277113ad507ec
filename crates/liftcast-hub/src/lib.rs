//! Liftcast Hub - Platform registry, subscriptions and change broadcasting.
//!
//! The [`Hub`] is the shared handle the server hands to every request. It
//! resolves platforms by name, applies controller events to them, and pushes
//! each changed projection to the displays subscribed to that platform.

pub mod error;
pub mod hub;
pub mod ingest;
pub mod registry;
pub mod subscriptions;

// Re-exports for convenience
pub use error::IngestError;
pub use hub::{Hub, Published};
pub use ingest::{DecisionPayload, TimerPayload, UpdatePayload};
pub use registry::{PlatformRegistry, PlatformSlot, Retention};
pub use subscriptions::{Channel, Frame, SubscriberId, Subscription, Subscriptions};
