//! Core types and trait definitions for the helpdesk service.
//!
//! This crate carries no HTTP or database dependencies. The storage backends,
//! the REST layer and the terminal client all build on it.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures in `store`.
#![allow(async_fn_in_trait)]

pub mod dashboard;
pub mod error;
pub mod knowledge;
pub mod problem;
pub mod sla;
pub mod store;
pub mod ticket;

mod nullable;

pub use error::{Error, Result};
