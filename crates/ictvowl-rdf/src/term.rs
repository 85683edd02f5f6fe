//! Owned RDF terms.
//!
//! Ordering is derived so that a `BTreeSet<Triple>` groups statements by
//! subject, which keeps serialized output stable.

use crate::vocab;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Iri(String),
    BlankNode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Object {
    Node(Node),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Node,
    pub predicate: String,
    pub object: Object,
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Node::BlankNode(label.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            Node::BlankNode(_) => None,
        }
    }
}

impl Literal {
    /// A plain (`xsd:string`) literal.
    pub fn string(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Some(vocab::XSD_BOOLEAN.to_string()),
            language: None,
        }
    }
}

impl Object {
    pub fn iri(iri: impl Into<String>) -> Self {
        Object::Node(Node::Iri(iri.into()))
    }

    pub fn string(lexical: impl Into<String>) -> Self {
        Object::Literal(Literal::string(lexical))
    }

    pub fn boolean(value: bool) -> Self {
        Object::Literal(Literal::boolean(value))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Object::Node(node) => Some(node),
            Object::Literal(_) => None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        self.as_node().and_then(Node::as_iri)
    }

    /// Lexical form of a literal object.
    pub fn as_lexical(&self) -> Option<&str> {
        match self {
            Object::Literal(lit) => Some(&lit.lexical),
            Object::Node(_) => None,
        }
    }
}

impl From<Node> for Object {
    fn from(node: Node) -> Self {
        Object::Node(node)
    }
}

impl From<Literal> for Object {
    fn from(lit: Literal) -> Self {
        Object::Literal(lit)
    }
}

impl Triple {
    pub fn new(subject: Node, predicate: impl Into<String>, object: impl Into<Object>) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}
