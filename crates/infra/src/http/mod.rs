//! Retrying HTTP sender

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
