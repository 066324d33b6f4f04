//! Domain types - query intent, outcomes, errors and configuration
//!
//! These types are independent of the transport used to reach the remote
//! search service.

pub mod config;
pub mod error;
pub mod outcome;
pub mod query;
