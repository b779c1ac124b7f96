//! On-demand ordering service.
//!
//! Peers do not push proposals; they ask for them. This crate implements the
//! service answering those requests: it accumulates transactions per future
//! round, closes a round when the gate reports the round before it resolved,
//! and keeps a bounded cache of recently emitted proposals.
//!
//! # Round packing
//!
//! Resolving `(h, r)` closes the successor reject round `(h, r + 1)`. When
//! `r` is the first attempt at its height, a block just landed: `(h + 1, 1)`
//! is closed as well and the accepting window resets to the three plausible
//! next rounds (one further reject at `h`, the reject round at `h + 1`, and
//! the commit round at `h + 2`). Otherwise a single new reject queue opens.
//!
//! All operations are infallible: transactions for rounds outside the window
//! are dropped, and the sender's multi-round fan-out covers the loss.

mod config;
mod service;

pub use config::OrderingConfig;
pub use service::InMemoryOrderingService;
