//! Active-program bookkeeping. The renderer crate never talks to the
//! GPU itself; the binary implements [`ProgramBackend`] over its GL
//! context and [`ProgramSlot`] enforces the swap discipline: a failed
//! build leaves the previously active program untouched, a successful
//! one adopts the new program and destroys the old.

use thiserror::Error;

use crate::compose::ShaderSource;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("vertex shader failed to compile: {0}")]
    VertexCompile(String),

    #[error("fragment shader failed to compile: {0}")]
    FragmentCompile(String),

    #[error("program failed to link: {0}")]
    Link(String),

    #[error("GPU object allocation failed: {0}")]
    Allocation(String),
}

/// The GPU seam: compiles and links a [`ShaderSource`] into a program
/// object, and releases programs the slot retires. `build` must clean
/// up everything it created when it fails.
pub trait ProgramBackend {
    type Program;

    fn build(&mut self, source: &ShaderSource) -> Result<Self::Program, BuildError>;

    fn destroy(&mut self, program: Self::Program);
}

/// Holder of the single active program.
#[derive(Debug, Default)]
pub struct ProgramSlot<P> {
    active: Option<P>,
}

impl<P> ProgramSlot<P> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Attempt to replace the active program with a build of `source`.
    /// On failure the active program (if any) stays in effect and the
    /// call returns `false`; the caller uses the result to flag the
    /// triggering graph. Rebuilding an unchanged source is harmless:
    /// it yields a functionally identical program.
    pub fn rebuild<B>(&mut self, backend: &mut B, source: &ShaderSource) -> bool
    where
        B: ProgramBackend<Program = P>,
    {
        match backend.build(source) {
            Ok(program) => {
                if let Some(old) = self.active.take() {
                    backend.destroy(old);
                }
                self.active = Some(program);
                true
            }
            Err(err) => {
                log::warn!("shader rebuild failed, keeping previous program: {err}");
                false
            }
        }
    }

    pub fn active(&self) -> Option<&P> {
        self.active.as_ref()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    /// Release the active program, e.g. on shutdown.
    pub fn clear<B>(&mut self, backend: &mut B)
    where
        B: ProgramBackend<Program = P>,
    {
        if let Some(old) = self.active.take() {
            backend.destroy(old);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that allocates sequential ids and can be told to fail,
    /// tracking every create/destroy so leak behavior is observable.
    struct FakeBackend {
        next_id: u32,
        fail: bool,
        live: Vec<u32>,
        destroyed: Vec<u32>,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self { next_id: 1, fail: false, live: Vec::new(), destroyed: Vec::new() }
        }
    }

    impl ProgramBackend for FakeBackend {
        type Program = u32;

        fn build(&mut self, _source: &ShaderSource) -> Result<u32, BuildError> {
            if self.fail {
                return Err(BuildError::FragmentCompile("syntax error".into()));
            }
            let id = self.next_id;
            self.next_id += 1;
            self.live.push(id);
            Ok(id)
        }

        fn destroy(&mut self, program: u32) {
            self.live.retain(|&p| p != program);
            self.destroyed.push(program);
        }
    }

    fn source() -> ShaderSource {
        ShaderSource { vertex: String::new(), fragment: String::new() }
    }

    #[test]
    fn test_success_adopts_and_destroys_previous() {
        let mut backend = FakeBackend::new();
        let mut slot = ProgramSlot::new();

        assert!(slot.rebuild(&mut backend, &source()));
        assert_eq!(slot.active(), Some(&1));
        assert!(backend.destroyed.is_empty());

        assert!(slot.rebuild(&mut backend, &source()));
        assert_eq!(slot.active(), Some(&2));
        assert_eq!(backend.destroyed, [1]);
        assert_eq!(backend.live, [2]);
    }

    #[test]
    fn test_failure_keeps_active_and_leaks_nothing() {
        let mut backend = FakeBackend::new();
        let mut slot = ProgramSlot::new();
        assert!(slot.rebuild(&mut backend, &source()));

        backend.fail = true;
        assert!(!slot.rebuild(&mut backend, &source()));
        // The previously active program is still in effect and nothing
        // was destroyed or left dangling.
        assert_eq!(slot.active(), Some(&1));
        assert_eq!(backend.live, [1]);
        assert!(backend.destroyed.is_empty());
    }

    #[test]
    fn test_failure_with_no_active_program() {
        let mut backend = FakeBackend::new();
        backend.fail = true;
        let mut slot: ProgramSlot<u32> = ProgramSlot::new();
        assert!(!slot.rebuild(&mut backend, &source()));
        assert!(!slot.has_active());
    }

    #[test]
    fn test_clear_releases_active() {
        let mut backend = FakeBackend::new();
        let mut slot = ProgramSlot::new();
        slot.rebuild(&mut backend, &source());
        slot.clear(&mut backend);
        assert!(!slot.has_active());
        assert_eq!(backend.destroyed, [1]);
        // Clearing twice is a no-op.
        slot.clear(&mut backend);
        assert_eq!(backend.destroyed, [1]);
    }
}
