//! Shader composition: lowers the ordered, visible subset of a
//! [`GraphSet`] into one fragment shader. The composition is modeled as
//! an explicit list of (predicate, action) clauses so the first-match-
//! wins ordering can be tested without a GPU; [`FragmentPlan::lower`]
//! is a straight transcription of that list into an if/else chain.

use plotline_core::{GraphKind, GraphSet};

/// Fixed vertex stage: a full-screen quad, no per-graph variation.
pub const VERTEX_SHADER: &str = "\
#version 330 core
layout (location = 0) in vec2 attribPos;
out vec2 fragPos;
void main() {
  gl_Position = vec4(attribPos.xy, 0.0, 1.0);
  fragPos = attribPos;
}
";

/// Uniform declarations, the tolerance helper and the per-pixel world
/// coordinate setup. `x`, `y`, `t` and `ps` are in scope for graph
/// bodies.
const FRAGMENT_PRELUDE: &str = "\
#version 330 core
#define pi 3.1415927410125732
in vec2 fragPos;
out vec4 FragColor;
uniform vec2 windowSize;
uniform vec2 position;
uniform float zoom;
uniform float sublinePeriod;
uniform float microlinePeriod;
uniform float time;
bool isEqualApprox(float a, float b, float c) {
  return abs(a - b) <= c * 0.5;
}
void main() {
  float pixelSize = 1.0 / zoom;
  vec2 worldPos = (windowSize * 0.5 * fragPos) * pixelSize + position;
  vec2 sublineOffset = (worldPos / sublinePeriod - round(worldPos / sublinePeriod)) * sublinePeriod;
  vec2 microlineOffset = (worldPos / microlinePeriod - round(worldPos / microlinePeriod)) * microlinePeriod;
  float x = worldPos.x;
  float y = worldPos.y;
  float t = time;
  float ps = pixelSize;
";

/// Grid/axis fallback, always evaluated after every graph clause:
/// black on an axis, gray on the sub-line grid, lighter gray on the
/// micro-line grid, else white.
const FRAGMENT_EPILOGUE: &str = "\
  if (isEqualApprox(worldPos.x, 0.0, pixelSize) || isEqualApprox(worldPos.y, 0.0, pixelSize))
    FragColor = vec4(0.0, 0.0, 0.0, 1.0);
  else if (isEqualApprox(sublineOffset.x, 0.0, pixelSize) || isEqualApprox(sublineOffset.y, 0.0, pixelSize))
    FragColor = vec4(0.65, 0.65, 0.65, 1.0);
  else if (isEqualApprox(microlineOffset.x, 0.0, pixelSize) || isEqualApprox(microlineOffset.y, 0.0, pixelSize))
    FragColor = vec4(0.85, 0.85, 0.85, 1.0);
  else
    FragColor = vec4(1.0, 1.0, 1.0, 1.0);
}
";

/// Per-pixel test deciding whether a clause's color is painted.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Functional graph: the pixel lies within the tolerance band
    /// `|body(x) − y| ≤ pixelSize × thickness × 0.5`.
    NearCurve { body: String, thickness: f32 },
    /// Implicit graph: the body is the predicate.
    Truth { body: String },
}

/// One (predicate, action) node of the composed shader.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub predicate: Predicate,
    pub color: [f32; 3],
}

impl Clause {
    fn lower(&self) -> String {
        let [r, g, b] = self.color;
        match &self.predicate {
            Predicate::NearCurve { body, thickness } => format!(
                "  if (isEqualApprox({body}, worldPos.y, pixelSize * {t})) FragColor = vec4({r}, {g}, {b}, 1.0);\n  else\n",
                t = fmt_f32(*thickness),
                r = fmt_f32(r),
                g = fmt_f32(g),
                b = fmt_f32(b),
            ),
            Predicate::Truth { body } => format!(
                "  if ({body}) FragColor = vec4({r}, {g}, {b}, 1.0);\n  else\n",
                r = fmt_f32(r),
                g = fmt_f32(g),
                b = fmt_f32(b),
            ),
        }
    }
}

/// The ordered clause list for the current visible graphs. Order is
/// insertion order of the set; the first clause whose predicate holds
/// at a pixel paints it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentPlan {
    clauses: Vec<Clause>,
}

impl FragmentPlan {
    /// One clause per visible graph, in set order.
    pub fn from_graphs(set: &GraphSet) -> Self {
        let clauses = set
            .visible()
            .map(|graph| Clause {
                predicate: match graph.kind {
                    GraphKind::Functional => Predicate::NearCurve {
                        body: graph.body.clone(),
                        thickness: graph.thickness,
                    },
                    GraphKind::Implicit => Predicate::Truth {
                        body: graph.body.clone(),
                    },
                },
                color: graph.color,
            })
            .collect();
        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Index of the clause that paints a pixel, given each clause's
    /// predicate value there. Mirrors the if/else chain [`lower`]
    /// emits; `None` falls through to the grid/axis fallback.
    ///
    /// [`lower`]: FragmentPlan::lower
    pub fn winner(&self, hits: &[bool]) -> Option<usize> {
        debug_assert_eq!(hits.len(), self.clauses.len());
        hits.iter().position(|&hit| hit)
    }

    /// Full fragment shader text: prelude, one clause block per graph,
    /// grid/axis epilogue. Deterministic: an unchanged plan lowers to
    /// identical text.
    pub fn lower(&self) -> String {
        let mut source = String::from(FRAGMENT_PRELUDE);
        for clause in &self.clauses {
            source.push_str(&clause.lower());
        }
        source.push_str(FRAGMENT_EPILOGUE);
        source
    }
}

/// A complete two-stage program source.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// Compose the program source for the current visible graphs.
pub fn compose(set: &GraphSet) -> ShaderSource {
    let plan = FragmentPlan::from_graphs(set);
    log::debug!("composing shader from {} visible graphs", plan.clauses().len());
    ShaderSource {
        vertex: VERTEX_SHADER.to_string(),
        fragment: plan.lower(),
    }
}

/// Format a float as a GLSL literal that round-trips the value.
fn fmt_f32(value: f32) -> String {
    format!("{value:?}")
}
