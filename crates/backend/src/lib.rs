//! Client-side search controller.
//!
//! Holds the live search session for one UI context: query intent, the last
//! outcome, typeahead suggestions and the flags around them. Searches and
//! suggestions are asynchronous; responses that arrive after newer intent are
//! dropped instead of applied.

pub mod cache;
pub mod channel;
pub mod controller;
pub mod dirs;
pub mod maintenance;
pub mod remote;
pub mod state;

mod domain;
pub use domain::{config, error, outcome, query};

pub use config::Config;
pub use controller::{SearchController, SearchOverrides, Settlement};
pub use error::{ErrorKind, SearchError};
pub use maintenance::IndexMaintenance;
pub use remote::{HttpBackend, IndexAdmin, RemoteError, SearchBackend};
pub use state::{Action, State, reduce};
