//! HTTP client for the inference service.

pub mod client;

pub use client::HttpUpstreamDispatcher;
