//! Jobwatch Poller
//!
//! Keeps a client-side view of server-side job state fresh.
//!
//! Architecture:
//! - Interval policy: how long to wait after a successful fetch
//! - Retry policy: exponential backoff after failures, with a reset
//! - Store: durable pause flag, so a restart resumes the operator's intent
//! - Poll loop: one task per poller owning timer, state and retry counter
//! - Poller: the handle views hold (pause, resume, force refresh, state)
//!
//! A poller is bound to a [`PollTarget`]: [`BulkTarget`] for the dashboard,
//! [`JobTarget`] for a single job's detail view.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jobwatch_client::DashboardClient;
//! use jobwatch_poller::{BulkTarget, PauseStore, Poller, PollerOptions};
//!
//! # async fn example() {
//! let client = Arc::new(DashboardClient::new("http://localhost:8000"));
//! let poller = Poller::builder(BulkTarget::new(client))
//!     .options(PollerOptions::bulk().with_persist_key("dashboard"))
//!     .pause_store(PauseStore::in_memory())
//!     .on_update(|jobs| println!("{} job(s)", jobs.len()))
//!     .spawn();
//!
//! poller.force_update().await;
//! println!("{:?}", poller.polling_state());
//! # }
//! ```

pub mod interval;
pub mod options;
mod poll_loop;
mod poller;
pub mod retry;
pub mod store;
pub mod target;


pub use options::PollerOptions;
pub use poll_loop::UpdateCallback;
pub use poller::{Poller, PollerBuilder};
pub use retry::{RetryDecision, RetryPolicy};
pub use store::{FileStore, KeyValueStore, MemoryStore, PauseStore, StorageError};
pub use target::{BulkTarget, FetchError, JobTarget, PollTarget};
