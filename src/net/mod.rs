// src/net/mod.rs
// =============================================================================
// HTTP plumbing shared by every feature.
//
// Submodules:
// - client: the reqwest wrapper, per-request options and the FetchError type
//
// One client is built per process with a fixed client-wide timeout. Headers
// are never stored on the client; each call carries its own RequestOptions.
// =============================================================================

mod client;

pub use client::{FetchError, HttpClient, RequestOptions};
