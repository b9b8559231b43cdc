use serde::{Deserialize, Serialize};

/// Band width applied to functional graphs when no explicit thickness is
/// given, and the value thickness resets to when a save file is loaded.
pub const DEFAULT_THICKNESS: f32 = 1.0;

/// How a graph's body is interpreted by the composed shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    /// `y = f(x)`: the body yields a scalar of `x`, rendered as a
    /// tolerance band around the curve.
    Functional,
    /// The body yields a boolean over `(x, y)`; every pixel where it
    /// holds is painted.
    Implicit,
}

/// One user-entered relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Unique, non-empty key within the live set.
    pub name: String,
    pub kind: GraphKind,
    /// Opaque expression text evaluated per pixel on the GPU. Never
    /// parsed or validated on the CPU side; the only feedback for a bad
    /// expression is the `compiled` flag after a rebuild.
    pub body: String,
    /// RGB, components in [0, 1].
    pub color: [f32; 3],
    /// Tolerance band width in pixels. Meaningful for functional graphs
    /// only.
    pub thickness: f32,
    pub visible: bool,
    /// Whether the currently active program successfully incorporated
    /// this graph.
    pub compiled: bool,
}

impl Graph {
    pub fn new(name: &str, kind: GraphKind, body: &str, color: [f32; 3], thickness: f32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            body: body.to_string(),
            color,
            thickness,
            visible: true,
            compiled: false,
        }
    }

    pub fn functional(name: &str, body: &str) -> Self {
        Self::new(name, GraphKind::Functional, body, [0.5; 3], DEFAULT_THICKNESS)
    }

    pub fn implicit(name: &str, body: &str) -> Self {
        Self::new(name, GraphKind::Implicit, body, [0.5; 3], DEFAULT_THICKNESS)
    }

    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = [r, g, b];
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let g = Graph::functional("line", "x").with_color(1.0, 0.0, 0.0);
        assert_eq!(g.kind, GraphKind::Functional);
        assert_eq!(g.color, [1.0, 0.0, 0.0]);
        assert_eq!(g.thickness, DEFAULT_THICKNESS);
        assert!(g.visible);
        assert!(!g.compiled);

        let g = Graph::implicit("disk", "x * x + y * y < 1.0").with_visibility(false);
        assert_eq!(g.kind, GraphKind::Implicit);
        assert!(!g.visible);
    }
}
