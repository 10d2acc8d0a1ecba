//! App Store Connect API client for Xcode Cloud.
//!
//! [`Client::dispatch`] signs a bearer credential with [`asc_ci_token`] and
//! performs one blocking HTTP exchange against the API root from [`Config`].

pub use asc_ci_token;

pub mod ci;
pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod report;
pub mod resources;
pub mod select;

pub use client::{Client, Method, Response};
pub use config::{Config, ConfigError};
pub use error::{ApiError, Error};
pub use poll::{CancelFlag, PollOutcome, Poller};
pub use select::Selector;
