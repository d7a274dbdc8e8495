//! Core types and trait definitions for the AIMindset engagement engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Scoring and featured selection are pure functions here; storage backends
//! implement [`store::BlogStore`] and everything above them is generic over
//! it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod article;
pub mod engagement;
pub mod error;
pub mod featured;
pub mod metrics;
pub mod score;
pub mod store;

pub use error::{Error, Result};
