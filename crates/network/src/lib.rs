//! Session fan-out to ordering peers.
//!
//! The connection manager is a proxy implementing the same transport
//! interface as an ordering service: transactions fan out to the consumer
//! peers for the three plausible next rounds, proposal requests go to the
//! issuer. Its only state is the table of four live sessions, rebuilt
//! whenever the peer set changes.

mod manager;
mod peers;

pub use manager::ConnectionManager;
pub use peers::{PeerSet, PeerSlot};
