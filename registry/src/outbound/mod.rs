//! Outbound adapters implementing the domain ports.

pub mod audit;
pub mod memory;
pub mod snapshot;
