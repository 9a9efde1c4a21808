//! rotaconf: converge `/etc/logrotate.conf` and owned `managed-*.conf`
//! drop-ins to a declared state, and document what was declared.
//!
//! Flow: config → desired state → validate → render → sync → docs.

pub mod cli;
pub mod config;
pub mod defaults;
pub mod docs;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod packages;
pub mod render;
pub mod sync;
pub mod utils;
pub mod validate;
