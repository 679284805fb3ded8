//! Transport implementations of the assistant client.

pub mod http_client;

pub use http_client::HttpAssistantClient;
