//! Objects used to read problem instances, decode solver outputs and write Kripke models.

mod dot_writer;
pub use dot_writer::DotWriter;

mod instance_reader;
pub use instance_reader::FormulaTreeBuilder;

mod instance_template;
pub use instance_template::InstanceTemplate;

mod model_diagram;
pub use model_diagram::persist_model;
pub use model_diagram::DiagramNode;
pub use model_diagram::ModelDiagram;

mod relation_decoder;
pub use relation_decoder::Relation;
pub use relation_decoder::RelationDecoder;
pub use relation_decoder::RelationSpec;
pub use relation_decoder::TupleField;

mod specs;
pub use specs::ModelWriter;
pub use specs::WarningHandler;

mod text_model_writer;
pub use text_model_writer::TextModelWriter;
