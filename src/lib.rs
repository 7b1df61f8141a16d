//! Health summaries for NGINX Plus upstreams.
//!
//! [`Client`] queries the NGINX Plus REST API for upstream peer states and
//! reduces them to up/down counts, per upstream or summed over every upstream
//! that belongs to a hostname.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;
pub mod transport;
pub mod upstream;
pub mod zones;

pub use client::{Client, ClientBuilder};
pub use error::HealthzError;
pub use models::{AggregateReport, HostnameUpstreams, Stats};
