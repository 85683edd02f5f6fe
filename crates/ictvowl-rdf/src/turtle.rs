//! Turtle serialization (Sophia).
//!
//! The owned graph is lent to Sophia's pretty Turtle serializer as a sorted
//! vector of borrowed terms, so output depends only on the graph contents and
//! the registered prefixes.

use std::io::Write;

use sophia::api::prefix::{Prefix, PrefixMapPair};
use sophia::api::serializer::TripleSerializer;
use sophia::api::term::{BnodeId, IriRef, LanguageTag, SimpleTerm};
use sophia::iri::Iri;
use sophia::turtle::serializer::turtle::{TurtleConfig, TurtleSerializer};

use crate::graph::Graph;
use crate::term::{Node, Object};
use crate::{vocab, RdfError};

#[derive(Debug, Clone)]
pub struct TurtleWriter {
    prefixes: Vec<(String, String)>,
}

impl Default for TurtleWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TurtleWriter {
    /// A writer with the standard prefix bindings from [`vocab::STANDARD_PREFIXES`].
    pub fn new() -> Self {
        Self {
            prefixes: vocab::STANDARD_PREFIXES
                .iter()
                .map(|(p, ns)| (p.to_string(), ns.to_string()))
                .collect(),
        }
    }

    /// Bind (or rebind) `prefix` to `namespace`.
    pub fn with_prefix(mut self, prefix: &str, namespace: &str) -> Self {
        self.prefixes.retain(|(p, _)| p != prefix);
        self.prefixes
            .push((prefix.to_string(), namespace.to_string()));
        self
    }

    pub fn write<W: Write>(&self, graph: &Graph, out: W) -> Result<(), RdfError> {
        let triples = sophia_triples(graph)?;
        let mut serializer = TurtleSerializer::new_with_config(out, self.config()?);
        serializer
            .serialize_graph(&triples)
            .map_err(|e| RdfError::Serialize(e.to_string()))?;
        Ok(())
    }

    pub fn to_turtle_string(&self, graph: &Graph) -> Result<String, RdfError> {
        let mut buf = Vec::new();
        self.write(graph, &mut buf)?;
        String::from_utf8(buf).map_err(|e| RdfError::Serialize(e.to_string()))
    }

    fn config(&self) -> Result<TurtleConfig, RdfError> {
        let mut prefix_map: Vec<PrefixMapPair> = Vec::with_capacity(self.prefixes.len());
        for (prefix, namespace) in &self.prefixes {
            let prefix = Prefix::new(Box::from(prefix.as_str()))
                .map_err(|e| invalid("prefix", prefix, e))?;
            let namespace = Iri::new(Box::from(namespace.as_str()))
                .map_err(|e| invalid("namespace", namespace, e))?;
            prefix_map.push((prefix, namespace));
        }
        Ok(TurtleConfig::new()
            .with_pretty(true)
            .with_own_prefix_map(prefix_map))
    }
}

fn invalid(what: &str, value: &str, err: impl std::fmt::Display) -> RdfError {
    RdfError::Serialize(format!("invalid {what} {value:?}: {err}"))
}

fn sophia_triples(graph: &Graph) -> Result<Vec<[SimpleTerm<'_>; 3]>, RdfError> {
    let mut triples = Vec::with_capacity(graph.len());
    for (s, p, o) in graph.iter() {
        let predicate = IriRef::new(p.into()).map_err(|e| invalid("IRI", p, e))?;
        triples.push([node_term(s)?, SimpleTerm::Iri(predicate), object_term(o)?]);
    }
    Ok(triples)
}

fn node_term(node: &Node) -> Result<SimpleTerm<'_>, RdfError> {
    Ok(match node {
        Node::Iri(iri) => {
            SimpleTerm::Iri(IriRef::new(iri.as_str().into()).map_err(|e| invalid("IRI", iri, e))?)
        }
        Node::BlankNode(label) => SimpleTerm::BlankNode(
            BnodeId::new(label.as_str().into()).map_err(|e| invalid("blank node", label, e))?,
        ),
    })
}

fn object_term(object: &Object) -> Result<SimpleTerm<'_>, RdfError> {
    let lit = match object {
        Object::Node(node) => return node_term(node),
        Object::Literal(lit) => lit,
    };
    if let Some(lang) = &lit.language {
        let tag = LanguageTag::new(lang.as_str().into())
            .map_err(|e| invalid("language tag", lang, e))?;
        return Ok(SimpleTerm::LiteralLanguage(lit.lexical.as_str().into(), tag));
    }
    let datatype = lit.datatype.as_deref().unwrap_or(vocab::XSD_STRING);
    let datatype =
        IriRef::new(datatype.into()).map_err(|e| invalid("datatype", datatype, e))?;
    Ok(SimpleTerm::LiteralDatatype(lit.lexical.as_str().into(), datatype))
}
