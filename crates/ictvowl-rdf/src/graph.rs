//! Ordered, duplicate-free triple set.

use std::collections::{BTreeMap, BTreeSet};

use crate::term::{Node, Object, Triple};

type PredicateMap = BTreeMap<String, BTreeSet<Object>>;

/// An in-memory RDF graph indexed by subject, then predicate.
///
/// Inserting a statement that is already present is a no-op, so every pass that
/// only *adds* facts is idempotent by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    statements: BTreeMap<Node, PredicateMap>,
    len: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.add(triple.subject, triple.predicate, triple.object)
    }

    pub fn add(
        &mut self,
        subject: Node,
        predicate: impl Into<String>,
        object: impl Into<Object>,
    ) -> bool {
        let inserted = self
            .statements
            .entry(subject)
            .or_default()
            .entry(predicate.into())
            .or_default()
            .insert(object.into());
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Union `other` into `self`.
    pub fn merge(&mut self, other: &Graph) {
        for triple in other.triples() {
            self.insert(triple);
        }
    }

    pub fn contains(&self, subject: &Node, predicate: &str, object: &Object) -> bool {
        self.statements
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .is_some_and(|objects| objects.contains(object))
    }

    pub fn objects<'a>(
        &'a self,
        subject: &Node,
        predicate: &str,
    ) -> impl Iterator<Item = &'a Object> + 'a {
        self.statements
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .into_iter()
            .flat_map(|objects| objects.iter())
    }

    /// First object (in term order) for `subject predicate ?o`.
    pub fn object(&self, subject: &Node, predicate: &str) -> Option<&Object> {
        self.objects(subject, predicate).next()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Node> {
        self.statements.keys()
    }

    /// Subjects of `?s predicate object`.
    pub fn subjects_with<'a>(
        &'a self,
        predicate: &'a str,
        object: &'a Object,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.statements.iter().filter_map(move |(subject, preds)| {
            preds
                .get(predicate)
                .filter(|objects| objects.contains(object))
                .map(|_| subject)
        })
    }

    /// Statements grouped by subject, in term order.
    pub fn by_subject(&self) -> impl Iterator<Item = (&Node, &PredicateMap)> {
        self.statements.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, &str, &Object)> {
        self.statements.iter().flat_map(|(subject, preds)| {
            preds.iter().flat_map(move |(predicate, objects)| {
                objects
                    .iter()
                    .map(move |object| (subject, predicate.as_str(), object))
            })
        })
    }

    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        self.iter()
            .map(|(s, p, o)| Triple::new(s.clone(), p, o.clone()))
    }

    /// Drop every statement about `subject`. Returns the number removed.
    pub fn remove_subject(&mut self, subject: &Node) -> usize {
        let removed = self
            .statements
            .remove(subject)
            .map(|preds| preds.values().map(BTreeSet::len).sum())
            .unwrap_or(0);
        self.len -= removed;
        removed
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}
