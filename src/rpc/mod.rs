//! gRPC contract of the cache service
//!
//! Three unary calls on `cache.Cache`: Get, Set and Delete. Get is the only
//! call that fails by design, with `NotFound` for an absent key.

pub mod client;
pub mod proto;
pub mod server;

pub use client::CacheClient;
pub use server::{Cache, CacheServer};
