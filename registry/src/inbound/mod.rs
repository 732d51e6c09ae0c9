//! Inbound adapters driving the registry.

pub mod cli;
