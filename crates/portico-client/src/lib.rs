//! Portico Client: typed access to the REST API plus the refresh logic
//! the network page runs on: a stale-time query cache, mutation-driven
//! invalidation and a background poller.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod poller;
pub mod session;

pub use cache::QueryCache;
pub use client::PorticoClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use forms::{ClusterForm, ContactForm, FormErrors};
pub use poller::{spawn_poller, Poller};
pub use session::{NetworkSession, Snapshot};
