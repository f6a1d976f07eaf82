use super::{DotWriter, ModelWriter, TextModelWriter};
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// A node of a [`ModelDiagram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    id: usize,
    label: String,
    external_label: String,
}

impl DiagramNode {
    /// Returns the identifier of the node.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the label displayed inside the node.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the label displayed next to the node.
    pub fn external_label(&self) -> &str {
        &self.external_label
    }
}

/// The structure handed to the rendering sink: labelled nodes and directed edges.
///
/// For Kripke models, nodes are worlds labelled by their identifier, their external label being the set of atoms they satisfy,
/// and edges are given by the accessibility relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDiagram {
    name: String,
    nodes: Vec<DiagramNode>,
    edges: Vec<(usize, usize)>,
}

impl ModelDiagram {
    /// Builds an empty diagram.
    ///
    /// The name is used as the title of the diagram and as the stem of the files it is persisted to.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a node.
    pub fn add_node(&mut self, id: usize, label: &str, external_label: &str) {
        self.nodes.push(DiagramNode {
            id,
            label: label.to_string(),
            external_label: external_label.to_string(),
        })
    }

    /// Adds an edge.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.edges.push((from, to))
    }

    /// Returns the name of the diagram.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the nodes, in insertion order.
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    /// Returns the edges, in insertion order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }
}

/// Persists a diagram into a directory, both as a Graphviz file and as a plain text file.
///
/// The files are named after the diagram.
/// Their paths are returned.
pub fn persist_model(dir: &Path, diagram: &ModelDiagram) -> Result<Vec<PathBuf>> {
    let writers: [&dyn ModelWriter; 2] = [&DotWriter, &TextModelWriter];
    writers
        .iter()
        .map(|w| {
            let path = dir.join(format!("{}.{}", diagram.name(), w.file_extension()));
            let context = || format!(r#"while writing model file "{}""#, path.display());
            let file = File::create(&path).with_context(context)?;
            let mut buffer = BufWriter::new(file);
            w.write_model(&mut buffer, diagram).with_context(context)?;
            buffer.flush().with_context(context)?;
            Ok(path)
        })
        .collect()
}
