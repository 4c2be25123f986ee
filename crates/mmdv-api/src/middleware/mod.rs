//! # Middleware
//!
//! Tower middleware applied to every route.

pub mod metrics;
