pub mod autoformat;
pub mod history;
pub mod model;
pub mod persistence;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use autoformat::{Outcome, on_before_insert};
pub use history::UndoHistory;
pub use model::*;
pub use persistence::{DocumentStore, StorageError};
