//! RDF plumbing for ictvowl.
//!
//! This crate owns everything that is about *triples* rather than *taxa*:
//!
//! - a small owned term model ([`Node`], [`Object`], [`Literal`], [`Triple`]),
//! - an ordered, duplicate-free [`Graph`] (deterministic serialization,
//!   idempotent inserts),
//! - vocabulary constants ([`vocab`]),
//! - Turtle output through Sophia's pretty serializer ([`turtle`]),
//! - reference-ontology import through **Sophia** ([`import`]):
//!   - N-Triples (`.nt`)
//!   - Turtle (`.ttl`)
//!   - RDF/XML (`.rdf`, `.owl`, `.xml`)
//!
//! The taxonomy crate builds graphs with these types; nothing here knows about
//! releases or identity keys.

pub mod digest;
pub mod graph;
pub mod import;
pub mod term;
pub mod turtle;
pub mod vocab;

pub use graph::Graph;
pub use import::{parse_rdf, parse_rdf_file, RdfFormat};
pub use term::{Literal, Node, Object, Triple};
pub use turtle::TurtleWriter;

#[derive(Debug, thiserror::Error)]
pub enum RdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
