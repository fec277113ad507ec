//! Controller event handlers.
//!
//! Each handler validates its payload, logs it, and drives the platform's
//! mutators through [`Hub::apply`](crate::Hub::apply) as a single batch.

pub mod decision;
mod fields;
pub mod timer;
pub mod update;

pub use decision::DecisionPayload;
pub use timer::TimerPayload;
pub use update::UpdatePayload;
