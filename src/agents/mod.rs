//! Agent modules
//!
//! - `autopause`: pauses idle dedicated clusters based on access history

pub mod autopause;

pub use autopause::AtlasAdminClient;
