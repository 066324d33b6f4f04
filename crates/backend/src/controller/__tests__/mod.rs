//! Controller flow tests driven by a scripted in-memory backend.

pub(crate) mod helpers;

mod lifecycle;
mod suggestions;
