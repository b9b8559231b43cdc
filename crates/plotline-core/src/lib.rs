//! # Plotline Core
//!
//! Graph definitions and the ordered relation set. A [`Graph`] is one
//! user-entered relation — either `y = f(x)` or an implicit boolean
//! predicate over `(x, y)` — and a [`GraphSet`] is the ordered collection
//! the shader composer consumes. Insertion order is rendering priority:
//! the first graph whose predicate holds at a pixel wins.

pub mod graph;
pub mod set;

pub use graph::{Graph, GraphKind, DEFAULT_THICKNESS};
pub use set::{GraphSet, GraphSetError};
