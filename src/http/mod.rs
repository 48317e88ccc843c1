//! HTTP query layer
//!
//! Provides the authenticated query client used for every outbound
//! request, plus the inter-request pacer that enforces the configured
//! pause between consecutive calls. The client classifies transport
//! failures only; HTTP status handling belongs to callers.

mod client;
mod rate_limit;

pub use client::{QueryClient, QueryClientConfig, RawResponse, BODY_SNIPPET_MAX};
pub use rate_limit::RequestPacer;

#[cfg(test)]
mod tests;
