//! Save-file codec. One section per graph, section order = graph
//! order, every value stored as decimal text with booleans as `0`/`1`:
//!
//! ```text
//! [line]
//! body = x
//! r = 1.0
//! g = 0.0
//! b = 0.0
//! thickness = 1.0
//! isFunctional = 1
//! isVisible = 1
//! ```
//!
//! Parsing is all-or-nothing: the first malformed line or missing key
//! fails the whole read so a corrupt file can never silently reorder
//! graph priorities.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use plotline_core::{Graph, GraphKind, GraphSet, DEFAULT_THICKNESS};

#[derive(Error, Debug)]
pub enum SavefileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line_no} is neither a section header nor a key: {content:?}")]
    InvalidLine { line_no: usize, content: String },

    #[error("line {line_no}: section name is empty")]
    EmptySection { line_no: usize },

    #[error("duplicate section '{0}'")]
    DuplicateSection(String),

    #[error("section '{section}' is missing key '{key}'")]
    MissingField { section: String, key: &'static str },

    #[error("section '{section}', key '{key}': invalid number")]
    InvalidFloat {
        section: String,
        key: &'static str,
        #[source]
        source: ParseFloatError,
    },

    #[error("section '{section}', key '{key}': invalid flag")]
    InvalidFlag {
        section: String,
        key: &'static str,
        #[source]
        source: ParseIntError,
    },

    #[error("save '{0}' does not exist")]
    NotFound(String),
}

/// Write every graph of the set, in insertion order.
pub fn write_graphs<W: Write>(writer: &mut W, set: &GraphSet) -> Result<(), SavefileError> {
    for graph in set.iter() {
        writeln!(writer, "[{}]", graph.name)?;
        writeln!(writer, "body = {}", graph.body)?;
        writeln!(writer, "r = {:?}", graph.color[0])?;
        writeln!(writer, "g = {:?}", graph.color[1])?;
        writeln!(writer, "b = {:?}", graph.color[2])?;
        writeln!(writer, "thickness = {:?}", graph.thickness)?;
        writeln!(writer, "isFunctional = {}", u8::from(graph.kind == GraphKind::Functional))?;
        writeln!(writer, "isVisible = {}", u8::from(graph.visible))?;
    }
    Ok(())
}

/// Read graphs back, preserving file section order. Thickness is not
/// restored: every loaded graph gets [`DEFAULT_THICKNESS`]. The field
/// is still written by [`write_graphs`] so the format stays symmetric
/// on disk.
pub fn read_graphs<R: BufRead>(reader: R) -> Result<Vec<Graph>, SavefileError> {
    let mut graphs: Vec<Graph> = Vec::new();
    let mut section: Option<(String, HashMap<String, String>)> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let name = name.trim();
            if name.is_empty() {
                return Err(SavefileError::EmptySection { line_no });
            }
            if let Some((done, fields)) = section.take() {
                push_graph(&mut graphs, build_graph(done, fields)?)?;
            }
            section = Some((name.to_string(), HashMap::new()));
            continue;
        }

        // Split on the first '=' only; graph bodies may contain more.
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(SavefileError::InvalidLine { line_no, content: trimmed.to_string() });
        };
        let Some((_, fields)) = section.as_mut() else {
            return Err(SavefileError::InvalidLine { line_no, content: trimmed.to_string() });
        };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }

    if let Some((done, fields)) = section.take() {
        push_graph(&mut graphs, build_graph(done, fields)?)?;
    }

    Ok(graphs)
}

fn push_graph(graphs: &mut Vec<Graph>, graph: Graph) -> Result<(), SavefileError> {
    if graphs.iter().any(|g| g.name == graph.name) {
        return Err(SavefileError::DuplicateSection(graph.name));
    }
    graphs.push(graph);
    Ok(())
}

fn build_graph(name: String, fields: HashMap<String, String>) -> Result<Graph, SavefileError> {
    let get = |key: &'static str| -> Result<&String, SavefileError> {
        fields.get(key).ok_or(SavefileError::MissingField { section: name.clone(), key })
    };
    let float = |key: &'static str| -> Result<f32, SavefileError> {
        get(key)?.parse::<f32>().map_err(|source| SavefileError::InvalidFloat {
            section: name.clone(),
            key,
            source,
        })
    };
    let flag = |key: &'static str| -> Result<bool, SavefileError> {
        let value = get(key)?.parse::<i32>().map_err(|source| SavefileError::InvalidFlag {
            section: name.clone(),
            key,
            source,
        })?;
        Ok(value != 0)
    };

    let body = get("body")?.clone();
    let color = [float("r")?, float("g")?, float("b")?];
    let kind = if flag("isFunctional")? { GraphKind::Functional } else { GraphKind::Implicit };
    let visible = flag("isVisible")?;

    Ok(Graph::new(&name, kind, &body, color, DEFAULT_THICKNESS).with_visibility(visible))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_set() -> GraphSet {
        let mut set = GraphSet::new();
        set.add(
            Graph::new("line", GraphKind::Functional, "x", [1.0, 0.0, 0.0], 2.5),
        )
        .unwrap();
        set.add(
            Graph::new("disk", GraphKind::Implicit, "x * x + y * y < 1.0", [0.25, 0.5, 0.75], 1.0)
                .with_visibility(false),
        )
        .unwrap();
        set
    }

    #[test]
    fn test_write_format() {
        let mut buffer = Vec::new();
        write_graphs(&mut buffer, &sample_set()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "[line]\n\
             body = x\n\
             r = 1.0\n\
             g = 0.0\n\
             b = 0.0\n\
             thickness = 2.5\n\
             isFunctional = 1\n\
             isVisible = 1\n\
             [disk]\n\
             body = x * x + y * y < 1.0\n\
             r = 0.25\n\
             g = 0.5\n\
             b = 0.75\n\
             thickness = 1.0\n\
             isFunctional = 0\n\
             isVisible = 0\n"
        );
    }

    #[test]
    fn test_roundtrip_resets_thickness() {
        let set = sample_set();
        let mut buffer = Vec::new();
        write_graphs(&mut buffer, &set).unwrap();
        let loaded = read_graphs(Cursor::new(buffer)).unwrap();

        assert_eq!(loaded.len(), 2);
        for (original, restored) in set.iter().zip(&loaded) {
            assert_eq!(restored.name, original.name);
            assert_eq!(restored.body, original.body);
            assert_eq!(restored.color, original.color);
            assert_eq!(restored.kind, original.kind);
            assert_eq!(restored.visible, original.visible);
            // Thickness is deliberately not restored.
            assert_eq!(restored.thickness, DEFAULT_THICKNESS);
        }
        assert_eq!(set.get(0).unwrap().thickness, 2.5);
    }

    #[test]
    fn test_read_preserves_section_order() {
        let text = "[b]\nbody = x\nr = 0\ng = 0\nb = 0\nisFunctional = 1\nisVisible = 1\n\
                    [a]\nbody = y > x\nr = 0\ng = 0\nb = 0\nisFunctional = 0\nisVisible = 1\n";
        let loaded = read_graphs(Cursor::new(text)).unwrap();
        let names: Vec<&str> = loaded.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(loaded[1].kind, GraphKind::Implicit);
    }

    #[test]
    fn test_body_may_contain_equals() {
        let text = "[eq]\nbody = x == y\nr = 0\ng = 0\nb = 0\nisFunctional = 0\nisVisible = 1\n";
        let loaded = read_graphs(Cursor::new(text)).unwrap();
        assert_eq!(loaded[0].body, "x == y");
    }

    #[test]
    fn test_missing_field() {
        let text = "[line]\nbody = x\nr = 1.0\ng = 0.0\nisFunctional = 1\nisVisible = 1\n";
        let err = read_graphs(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, SavefileError::MissingField { key: "b", .. }), "{err}");
    }

    #[test]
    fn test_malformed_number_fails_whole_read() {
        let text = "[ok]\nbody = x\nr = 0\ng = 0\nb = 0\nisFunctional = 1\nisVisible = 1\n\
                    [bad]\nbody = x\nr = banana\ng = 0\nb = 0\nisFunctional = 1\nisVisible = 1\n";
        let err = read_graphs(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, SavefileError::InvalidFloat { key: "r", .. }), "{err}");
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let text = "[a]\nbody = x\nr = 0\ng = 0\nb = 0\nisFunctional = 1\nisVisible = 1\n\
                    [a]\nbody = y\nr = 0\ng = 0\nb = 0\nisFunctional = 1\nisVisible = 1\n";
        let err = read_graphs(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, SavefileError::DuplicateSection(name) if name == "a"));
    }

    #[test]
    fn test_key_outside_section_rejected() {
        let err = read_graphs(Cursor::new("body = x\n")).unwrap_err();
        assert!(matches!(err, SavefileError::InvalidLine { line_no: 1, .. }));
    }

    #[test]
    fn test_empty_file_is_empty_set() {
        let loaded = read_graphs(Cursor::new("")).unwrap();
        assert!(loaded.is_empty());
    }
}
