//! Atlas Autopause Library
//!
//! Inactivity evaluation and the cluster sweep behind the
//! `autopause-agent` binary.

pub mod agents;

pub use agents::autopause;
