//! File system, journal and network access.

pub mod capi;
pub mod journal;
pub mod poller;
pub mod settings_store;
pub mod status_store;
