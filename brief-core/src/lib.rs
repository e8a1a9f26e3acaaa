//! Core library for the `brief` dashboard.
//!
//! This crate defines:
//! - Clients for weather, news and sports sources, each memoized with a TTL
//! - The JSON-backed grocery and todo store
//! - Tagged outcomes for every failure a section can hit
//! - Page composition over all of the above
//!
//! It is used by `brief-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod model;
pub mod news;
pub mod sports;
pub mod store;
pub mod weather;

pub use cache::TtlCache;
pub use config::Config;
pub use dashboard::{Dashboard, ListsSection, NewsSection, SportsSection, WeatherSection};
pub use error::{FetchError, StoreError};
pub use model::*;
pub use news::NewsClient;
pub use sports::{SportsClient, TrackedTeam};
pub use store::{Grocery, ListCollection, ListStore, Todo};
pub use weather::{WeatherClient, WeatherEndpoints};
