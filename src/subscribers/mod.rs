//! # Event subscribers for the nodevisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out, and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   phases ── publish(Event) ──► Bus ──► Supervisor listener ──► SubscriberSet
//!                                                                    │
//!                                                     ┌──────────────┼─────────┐
//!                                                     ▼              ▼         ▼
//!                                                  LogWriter      Custom      ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use nodevisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ServiceFailed {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
