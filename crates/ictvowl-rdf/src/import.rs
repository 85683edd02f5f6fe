//! Reference-ontology import (Sophia).
//!
//! Reference ontologies are merged verbatim, so we only need to get their
//! statements into the owned term model. Sophia terms are read through the
//! `Term` accessors; statements with a non-IRI predicate are skipped.
//!
//! Blank-node labels are scoped per document (prefixed with a digest of the
//! source locator) so two imported files can never share a blank node.

use std::io::{BufReader, Cursor};
use std::path::Path;

use sophia::api::prelude::*;
use sophia::api::term::TermKind;

use crate::digest::fnv1a64_parts;
use crate::graph::Graph;
use crate::term::{Literal, Node, Object};
use crate::{vocab, RdfError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    pub fn from_path(path: &Path) -> Result<Self, RdfError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(RdfFormat::NTriples),
            "ttl" | "turtle" => Ok(RdfFormat::Turtle),
            "rdf" | "owl" | "xml" => Ok(RdfFormat::RdfXml),
            other => Err(RdfError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Parse an RDF file, picking the syntax from its extension.
pub fn parse_rdf_file(path: &Path) -> Result<Graph, RdfError> {
    let format = RdfFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let graph = parse_rdf(&bytes, format, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), triples = graph.len(), "imported reference ontology");
    Ok(graph)
}

/// Parse RDF bytes. `locator` scopes blank-node labels.
pub fn parse_rdf(bytes: &[u8], format: RdfFormat, locator: &str) -> Result<Graph, RdfError> {
    let scope = format!("b{:08x}", fnv1a64_parts(&[locator]) as u32);
    let reader = BufReader::new(Cursor::new(bytes));
    let mut graph = Graph::new();

    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| insert_triple(&mut graph, t, &scope))
                .map_err(|e| RdfError::Parse(format!("failed to parse N-Triples: {e}")))?;
        }
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| insert_triple(&mut graph, t, &scope))
                .map_err(|e| RdfError::Parse(format!("failed to parse Turtle: {e}")))?;
        }
        RdfFormat::RdfXml => {
            let mut parser = sophia::xml::parser::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| insert_triple(&mut graph, t, &scope))
                .map_err(|e| RdfError::Parse(format!("failed to parse RDF/XML: {e}")))?;
        }
    }

    Ok(graph)
}

fn insert_triple<T: Triple>(graph: &mut Graph, t: T, scope: &str) -> Result<(), RdfError> {
    let Some(predicate) = t.p().iri().map(|iri| iri.as_str().to_string()) else {
        return Ok(());
    };
    let subject = convert_node(t.s(), scope)?;
    let object = convert_object(t.o(), scope)?;
    graph.add(subject, predicate, object);
    Ok(())
}

fn convert_node<T: Term>(term: T, scope: &str) -> Result<Node, RdfError> {
    match term.kind() {
        TermKind::Iri => term
            .iri()
            .map(|iri| Node::Iri(iri.as_str().to_string()))
            .ok_or_else(|| RdfError::Parse("IRI term without an IRI".into())),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Node::BlankNode(scoped_blank_label(scope, id.as_str())))
            .ok_or_else(|| RdfError::Parse("blank node without an id".into())),
        other => Err(RdfError::Parse(format!(
            "expected IRI or blank node, got {other:?}"
        ))),
    }
}

fn convert_object<T: Term>(term: T, scope: &str) -> Result<Object, RdfError> {
    if term.kind() != TermKind::Literal {
        return convert_node(term, scope).map(Object::Node);
    }
    let lexical = term
        .lexical_form()
        .map(|lex| lex.to_string())
        .unwrap_or_default();
    let language = term.language_tag().map(|tag| tag.as_str().to_string());
    // Language-tagged literals carry rdf:langString; plain strings are stored untyped.
    let datatype = term
        .datatype()
        .map(|dt| dt.as_str().to_string())
        .filter(|dt| language.is_none() && dt != vocab::XSD_STRING);
    Ok(Object::Literal(Literal {
        lexical,
        datatype,
        language,
    }))
}

fn scoped_blank_label(scope: &str, label: &str) -> String {
    let clean: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{scope}{clean}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_turtle_into_owned_graph() {
        let turtle = r#"
@prefix ex: <http://example.org/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
ex:dna rdfs:label "DNA"@en .
ex:dna rdfs:subClassOf ex:molecule .
ex:dna rdfs:comment "a \"quoted\" note" .
"#;
        let g = parse_rdf(turtle.as_bytes(), RdfFormat::Turtle, "memory.ttl").expect("turtle");
        assert_eq!(g.len(), 3);

        let dna = Node::iri("http://example.org/dna");
        assert!(g.contains(
            &dna,
            vocab::RDFS_SUBCLASS_OF,
            &Object::iri("http://example.org/molecule")
        ));
        let label = g.object(&dna, vocab::RDFS_LABEL).expect("label");
        assert_eq!(
            label,
            &Object::Literal(Literal {
                lexical: "DNA".into(),
                datatype: None,
                language: Some("en".into()),
            })
        );
        assert_eq!(
            g.object(&dna, vocab::RDFS_COMMENT).and_then(Object::as_lexical),
            Some("a \"quoted\" note")
        );
    }

    #[test]
    fn blank_nodes_are_scoped_per_document() {
        let nt = "_:a <http://example.org/p> \"x\" .\n";
        let g1 = parse_rdf(nt.as_bytes(), RdfFormat::NTriples, "one.nt").expect("nt");
        let g2 = parse_rdf(nt.as_bytes(), RdfFormat::NTriples, "two.nt").expect("nt");
        let s1: Vec<_> = g1.subjects().cloned().collect();
        let s2: Vec<_> = g2.subjects().cloned().collect();
        assert_ne!(s1, s2);
    }

    #[test]
    fn unicode_escapes_and_datatypes_are_decoded() {
        let nt = concat!(
            "<http://example.org/m> <http://www.w3.org/2000/01/rdf-schema#label> \"ss\\u00E9RNA\" .\n",
            "<http://example.org/m> <http://example.org/count> ",
            "\"3\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
        );
        let g = parse_rdf(nt.as_bytes(), RdfFormat::NTriples, "escapes.nt").expect("nt");
        let m = Node::iri("http://example.org/m");
        assert_eq!(
            g.object(&m, vocab::RDFS_LABEL).and_then(Object::as_lexical),
            Some("ss\u{e9}RNA")
        );
        assert_eq!(
            g.object(&m, "http://example.org/count"),
            Some(&Object::Literal(Literal {
                lexical: "3".into(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".into()),
                language: None,
            }))
        );
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            RdfFormat::from_path(Path::new("ictv_molecules.owl")).unwrap(),
            RdfFormat::RdfXml
        );
        assert_eq!(
            RdfFormat::from_path(Path::new("x.ttl")).unwrap(),
            RdfFormat::Turtle
        );
        assert!(RdfFormat::from_path(Path::new("x.json")).is_err());
    }
}
