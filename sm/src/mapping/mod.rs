//! Mapping request construction and the remote mapping client

pub mod client;
mod error;
pub mod http;
mod types;

pub use client::MappingClient;
pub use error::{MappingError, UNKNOWN_ERROR};
pub use http::{HttpMappingClient, interpret_response};
pub use types::{MappingRequest, MappingResult, TableColumns};
