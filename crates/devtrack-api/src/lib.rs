// devtrack-api: Async Rust client for the deviation tracking REST API

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

pub use client::DeviationClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    CreateDeviation, Deviation, DeviationPriority, DeviationStats, DeviationStatus, ListParams,
    Page, SortOrder, UpdateDeviation,
};
