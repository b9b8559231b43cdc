use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::Graph;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphSetError {
    #[error("graph name must not be empty")]
    EmptyName,

    #[error("a graph named '{0}' already exists")]
    DuplicateName(String),
}

/// The ordered collection of graphs. Insertion order is significant:
/// it is the priority order of the composed shader's if/else chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSet {
    graphs: Vec<Graph>,
}

impl GraphSet {
    pub fn new() -> Self {
        Self { graphs: Vec::new() }
    }

    /// Append a graph. Rejects empty and duplicate names without
    /// touching the collection.
    pub fn add(&mut self, graph: Graph) -> Result<(), GraphSetError> {
        if graph.name.is_empty() {
            return Err(GraphSetError::EmptyName);
        }
        if self.contains_name(&graph.name) {
            return Err(GraphSetError::DuplicateName(graph.name.clone()));
        }
        log::debug!("adding graph '{}'", graph.name);
        self.graphs.push(graph);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Graph> {
        self.graphs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Graph> {
        self.graphs.get_mut(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Graph> {
        if index < self.graphs.len() {
            Some(self.graphs.remove(index))
        } else {
            None
        }
    }

    pub fn toggle_visibility(&mut self, index: usize) {
        if let Some(graph) = self.graphs.get_mut(index) {
            graph.visible = !graph.visible;
        }
    }

    /// Replace the whole collection, e.g. after loading a save file.
    pub fn replace_all(&mut self, graphs: Vec<Graph>) {
        self.graphs = graphs;
    }

    /// Batch feedback after a rebuild that covered every graph at once.
    pub fn set_all_compiled(&mut self, compiled: bool) {
        for graph in &mut self.graphs {
            graph.compiled = compiled;
        }
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.graphs.iter().any(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.iter()
    }

    /// The ordered, visible-only subset the shader composer consumes.
    pub fn visible(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.iter().filter(|g| g.visible)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
