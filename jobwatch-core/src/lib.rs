//! Jobwatch Core
//!
//! Core types shared by the Jobwatch client, poller and terminal dashboard.
//!
//! This crate contains:
//! - Domain types: jobs, job summaries and their statuses
//! - Polling state: the observable snapshot every poller publishes
//! - Stats: per-status counts for dashboard headers

pub mod domain;
pub mod stats;
