//! Core types, validation and operations for the Rally events backend.
//!
//! This crate has no HTTP or database dependencies. Storage backends implement
//! [`store::EventStore`]; the signup and catalog operations are generic over
//! it.

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod attendee;
pub mod catalog;
pub mod error;
pub mod event;
pub mod signup;
pub mod store;

pub use error::{Error, Result};
