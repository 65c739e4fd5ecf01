//! HTTP gateway to the remote quote service.

mod client;
mod error;

pub use client::*;
pub use error::*;
