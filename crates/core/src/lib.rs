//! Core business logic for yatube.
//!
//! Services own the authorization and integrity rules; handlers in
//! `yatube-api` only translate HTTP into service calls.

pub mod services;

pub use services::*;
