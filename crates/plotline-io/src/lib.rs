//! # Plotline I/O
//!
//! Persistence for graph sets: a flat, section-per-graph text format
//! (one `[name]` section with `body`, `r`, `g`, `b`, `thickness`,
//! `isFunctional`, `isVisible` keys per graph) and a [`SaveStore`]
//! managing named save files under a fixed directory.

pub mod savefile;
pub mod store;

pub use savefile::{read_graphs, write_graphs, SavefileError};
pub use store::{SaveStore, DEFAULT_SAVE_DIR};
