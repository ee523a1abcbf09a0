//! Indexes CDN edge server access logs into a search cluster.
//!
//! A run is triggered by an object storage notification. Every log file it
//! names is downloaded, decompressed and parsed by [`weblogs_cdn_logs`], and
//! the resulting bulk request is sent through [`weblogs_elastic`].

pub mod config;
pub mod message;
mod process_log;
pub mod util;

pub use crate::config::Config;
pub use crate::message::Message;
pub use crate::process_log::{ProcessLog, ProcessLogError, ProcessLogOutcome, process_message};
