//! Core domain types
//!
//! These types mirror the payloads served by the jobs REST API and the
//! state published by client-side pollers. They are shared between the
//! HTTP client (deserializes them), the poller (schedules on them) and the
//! CLI (renders them).

pub mod job;
pub mod polling;
