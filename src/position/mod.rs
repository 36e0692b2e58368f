//! Live position state and its ingestion pipeline
//!
//! [`PositionManager`] owns the live fix and the persisted last-known
//! position behind one bounded-acquisition lock; [`IngestLoop`] is the
//! single writer feeding it from a serial link.

pub mod fix;
pub mod ingest;
pub mod manager;

pub use fix::{LastPosition, LiveFix};
pub use ingest::{open_link, ChannelConfig, IngestLoop};
pub use manager::{FixCallback, PositionManager, STORE_NAMESPACE};
