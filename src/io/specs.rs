use super::ModelDiagram;
use anyhow::Result;
use std::io::Write;

/// The type of callback functions to call when warnings are raised while parsing a problem instance.
///
/// The first parameter is the (1-based) index of the line that raised the warning.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

/// A trait implemented by objects that serialize Kripke models.
///
/// This is the rendering sink of the model finder: it receives the worlds (as labelled nodes) and the accessibility relation (as edges).
pub trait ModelWriter {
    /// Returns the extension of the files produced by this writer (without the leading dot).
    fn file_extension(&self) -> &str;

    /// Writes a model.
    fn write_model(&self, writer: &mut dyn Write, diagram: &ModelDiagram) -> Result<()>;
}
