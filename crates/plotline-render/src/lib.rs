//! # Plotline Render
//!
//! Everything between the graph set and the draw call, kept free of any
//! GPU dependency: the pan/zoom viewport with its screen↔world
//! transform, the shader composer that lowers the visible graphs into
//! one fragment shader, and the active-program slot that swaps compiled
//! programs atomically. The binary supplies the actual GL context
//! through the [`ProgramBackend`] trait.

pub mod compose;
pub mod program;
pub mod viewport;

pub use compose::{compose, Clause, FragmentPlan, Predicate, ShaderSource};
pub use program::{BuildError, ProgramBackend, ProgramSlot};
pub use viewport::{FrameUniforms, Viewport};
