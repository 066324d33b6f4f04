//! Remote-facing pipelines driven by the controller
//!
//! - [`SearchChannel`]: authoritative searches, gated by sequence tickets
//! - [`SuggestionChannel`]: debounced typeahead, gated by query text

mod search;
mod suggest;

pub use search::{SearchChannel, Ticket};
pub use suggest::SuggestionChannel;
