//! REST client for the hosted shop collection.
//!
//! This crate talks to a PostgREST-style endpoint that exposes the shop
//! table as a JSON collection.
//!
//! ## Features
//!
//! - **HTTP Client**: full-collection fetch and filtered partial updates
//! - **Types**: the shop record as read from the wire, and the patch body
//! - **Retry**: optional bounded retry for the fetch step

mod client;
mod error;
mod records;
mod types;

pub use client::{RestClient, RestConfig, RetryPolicy};
pub use error::RestError;
pub use records::*;
pub use types::*;
