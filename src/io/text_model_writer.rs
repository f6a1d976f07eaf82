use super::{ModelDiagram, ModelWriter};
use anyhow::{Context, Result};
use std::io::Write;

/// A writer producing a plain text dump of a diagram.
///
/// Each node is written on its own line, as its label followed by its external label between braces.
/// Then come the edges, one per line, as `from -> to`.
#[derive(Default)]
pub struct TextModelWriter;

impl ModelWriter for TextModelWriter {
    fn file_extension(&self) -> &str {
        "txt"
    }

    fn write_model(&self, writer: &mut dyn Write, diagram: &ModelDiagram) -> Result<()> {
        let context = "while writing a model";
        diagram.nodes().iter().try_for_each(|n| {
            writeln!(writer, "{} {{{}}}", n.label(), n.external_label()).context(context)
        })?;
        diagram
            .edges()
            .iter()
            .try_for_each(|(from, to)| writeln!(writer, "{} -> {}", from, to).context(context))?;
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
        diagram.add_node(1, "1", "p1");
        diagram.add_node(2, "2", "p2");
        diagram.add_edge(1, 2);
        let mut buffer = BufWriter::new(Vec::new());
        TextModelWriter.write_model(&mut buffer, &diagram).unwrap();
        assert_eq!(
            "1 {p1}\n2 {p2}\n1 -> 2\n",
            String::from_utf8(buffer.into_inner().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_write_empty_model() {
        let mut buffer = BufWriter::new(Vec::new());
        TextModelWriter
            .write_model(&mut buffer, &ModelDiagram::new("phi"))
            .unwrap();
        assert!(String::from_utf8(buffer.into_inner().unwrap())
            .unwrap()
            .is_empty());
    }
}
