use super::{ModelDiagram, ModelWriter};
use anyhow::{Context, Result};
use std::io::Write;

/// A writer producing Graphviz (DOT) diagrams.
///
/// Node labels are written inside the nodes, external labels are written next to them using the `xlabel` attribute.
#[derive(Default)]
pub struct DotWriter;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl ModelWriter for DotWriter {
    fn file_extension(&self) -> &str {
        "dot"
    }

    fn write_model(&self, writer: &mut dyn Write, diagram: &ModelDiagram) -> Result<()> {
        let context = "while writing a DOT diagram";
        writeln!(writer, "digraph {} {{", quote(diagram.name())).context(context)?;
        diagram.nodes().iter().try_for_each(|n| {
            writeln!(
                writer,
                "    {} [label={}, xlabel={}];",
                n.id(),
                quote(n.label()),
                quote(&format!("{{{}}}", n.external_label()))
            )
            .context(context)
        })?;
        diagram
            .edges()
            .iter()
            .try_for_each(|(from, to)| writeln!(writer, "    {} -> {};", from, to).context(context))?;
        writeln!(writer, "}}").context(context)?;
        writer.flush().context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufWriter;

    #[test]
    fn test_write_model() {
        let mut diagram = ModelDiagram::new("phi");
        diagram.add_node(1, "1", "p1, p2");
        diagram.add_node(2, "2", "");
        diagram.add_edge(1, 2);
        diagram.add_edge(2, 2);
        let mut buffer = BufWriter::new(Vec::new());
        DotWriter.write_model(&mut buffer, &diagram).unwrap();
        assert_eq!(
            "digraph \"phi\" {\n    1 [label=\"1\", xlabel=\"{p1, p2}\"];\n    2 [label=\"2\", xlabel=\"{}\"];\n    1 -> 2;\n    2 -> 2;\n}\n",
            String::from_utf8(buffer.into_inner().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_names_are_escaped() {
        let diagram = ModelDiagram::new("a \"b\"");
        let mut buffer = BufWriter::new(Vec::new());
        DotWriter.write_model(&mut buffer, &diagram).unwrap();
        assert_eq!(
            "digraph \"a \\\"b\\\"\" {\n}\n",
            String::from_utf8(buffer.into_inner().unwrap()).unwrap()
        );
    }
}
