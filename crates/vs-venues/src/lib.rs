mod api_interfaces;
pub mod cancel;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod progress;
pub mod query;
pub mod reply;
mod util;
pub mod venue;

pub use api_interfaces::explore;
pub use client::Client;
pub use config::{Config, ConfigBuilder};
pub use error::{ConfigError, SearchError};
pub use query::{format_location, Location, Query, RunOutcome, SearchMetadata};
pub use reply::{CategorisedResult, Category, CategoryRenderer, SearchReply};
pub use util::redacted_url;
pub use venue::{Venue, Venues};
