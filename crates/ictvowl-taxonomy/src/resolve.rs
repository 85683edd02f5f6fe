//! Cross-Release Resolver.
//!
//! Three passes over the built release graphs:
//!
//! 1. deprecation marking for every class outside the latest release;
//! 2. final-successor resolution over `prov:hadRevision`;
//! 3. former-name synonyms from same-identity classes of older releases.
//!
//! Each pass reads an immutable [`ClassIndex`] plus the graphs as they stood
//! at the previous boundary and returns [`Additions`]. Nothing is written
//! until the pass is done.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use ictvowl_rdf::digest::blank_node_label;
use ictvowl_rdf::{vocab, Graph, Node, Object};

use crate::build::ReleaseGraph;
use crate::ids::{IdentityKey, ReleaseId};

/// What the resolver knows about one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub release: ReleaseId,
    pub identity: Option<IdentityKey>,
    pub label: Option<String>,
    /// Immediate successors (`prov:hadRevision`), in graph order.
    pub successors: Vec<String>,
}

/// Read-only view of every class across all releases.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    classes: BTreeMap<String, ClassEntry>,
    by_identity: BTreeMap<IdentityKey, BTreeMap<ReleaseId, String>>,
}

impl ClassIndex {
    pub fn from_graphs<'a>(graphs: impl IntoIterator<Item = &'a ReleaseGraph>) -> Self {
        let mut index = ClassIndex::default();
        let class_type = Object::iri(vocab::OWL_CLASS);

        for rg in graphs {
            let g = &rg.graph;
            for subject in g.subjects_with(vocab::RDF_TYPE, &class_type) {
                let Some(iri) = subject.as_iri() else {
                    continue;
                };
                let Some(release) = version_of(g, subject) else {
                    tracing::warn!(class = iri, "class has no parseable version tag; skipped by resolver");
                    continue;
                };

                let identity = g
                    .object(subject, vocab::DCTERMS_IDENTIFIER)
                    .and_then(Object::as_lexical)
                    .and_then(|raw| IdentityKey::parse(raw).ok());
                let label = g
                    .object(subject, vocab::RDFS_LABEL)
                    .and_then(Object::as_lexical)
                    .map(str::to_string);
                let successors = g
                    .objects(subject, vocab::PROV_HAD_REVISION)
                    .filter_map(Object::as_iri)
                    .map(str::to_string)
                    .collect();

                if let Some(key) = &identity {
                    index
                        .by_identity
                        .entry(key.clone())
                        .or_default()
                        .insert(release, iri.to_string());
                }
                index.classes.insert(
                    iri.to_string(),
                    ClassEntry {
                        release,
                        identity,
                        label,
                        successors,
                    },
                );
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, iri: &str) -> Option<&ClassEntry> {
        self.classes.get(iri)
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassEntry)> {
        self.classes.iter().map(|(iri, entry)| (iri.as_str(), entry))
    }

    pub fn latest_release(&self) -> Option<ReleaseId> {
        self.classes.values().map(|e| e.release).max()
    }

    /// Immediate successors of `iri`; empty for IRIs outside the index.
    pub fn successors(&self, iri: &str) -> &[String] {
        self.classes
            .get(iri)
            .map(|e| e.successors.as_slice())
            .unwrap_or(&[])
    }

    /// Same-identity classes from releases strictly older than `release`,
    /// oldest first.
    pub fn older_versions<'a>(
        &'a self,
        key: &IdentityKey,
        release: ReleaseId,
    ) -> impl Iterator<Item = (ReleaseId, &'a str)> + 'a {
        self.by_identity
            .get(key)
            .into_iter()
            .flat_map(move |versions| versions.range(..release))
            .map(|(release, iri)| (*release, iri.as_str()))
    }
}

fn version_of(g: &Graph, subject: &Node) -> Option<ReleaseId> {
    g.object(subject, vocab::OWL_VERSION_INFO)?
        .as_lexical()?
        .parse()
        .ok()
}

/// New triples produced by one pass, grouped by the release that owns the
/// subject.
#[derive(Debug, Default)]
pub struct Additions {
    by_release: BTreeMap<ReleaseId, Graph>,
}

impl Additions {
    pub fn add(
        &mut self,
        owner: ReleaseId,
        subject: Node,
        predicate: &str,
        object: impl Into<Object>,
    ) -> bool {
        self.by_release
            .entry(owner)
            .or_default()
            .add(subject, predicate, object)
    }

    pub fn len(&self) -> usize {
        self.by_release.values().map(Graph::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn for_release(&self, release: ReleaseId) -> Option<&Graph> {
        self.by_release.get(&release)
    }

    /// Merge into the release graphs. Returns how many triples were new.
    pub fn apply(self, releases: &mut BTreeMap<ReleaseId, ReleaseGraph>) -> usize {
        let mut added = 0;
        for (release, graph) in self.by_release {
            let Some(target) = releases.get_mut(&release) else {
                tracing::warn!(%release, "additions for a release that was not built; dropped");
                continue;
            };
            for triple in graph.triples() {
                if target.graph.insert(triple) {
                    added += 1;
                }
            }
        }
        added
    }
}

/// Run every pass and return the resolved graphs, oldest release first.
pub fn resolve(releases: Vec<ReleaseGraph>) -> Vec<ReleaseGraph> {
    let mut state: BTreeMap<ReleaseId, ReleaseGraph> = BTreeMap::new();
    for rg in releases {
        match state.get_mut(&rg.release) {
            Some(existing) => existing.graph.merge(&rg.graph),
            None => {
                state.insert(rg.release, rg);
            }
        }
    }

    let passes: [(&str, fn(&ClassIndex, &BTreeMap<ReleaseId, ReleaseGraph>) -> Additions); 3] = [
        ("deprecation", mark_deprecated),
        ("final successors", resolve_final_successors),
        ("former names", propagate_former_names),
    ];

    for (name, pass) in passes {
        let index = ClassIndex::from_graphs(state.values());
        let additions = pass(&index, &state);
        let added = additions.apply(&mut state);
        tracing::info!(pass = name, classes = index.len(), added, "resolver pass finished");
    }

    state.into_values().collect()
}

/// Every class outside the latest release is deprecated, with or without a
/// recorded successor.
pub fn mark_deprecated(
    index: &ClassIndex,
    _graphs: &BTreeMap<ReleaseId, ReleaseGraph>,
) -> Additions {
    let mut additions = Additions::default();
    let Some(latest) = index.latest_release() else {
        return additions;
    };
    for (iri, entry) in index.classes() {
        if entry.release != latest {
            additions.add(
                entry.release,
                Node::iri(iri),
                vocab::OWL_DEPRECATED,
                Object::boolean(true),
            );
        }
    }
    additions
}

/// Terminal successors of `start`: the nodes reachable over `successors`
/// that have no successors themselves.
///
/// When every path ends in a cycle, a start node on one of those cycles is its
/// own terminal; otherwise the terminals are the cycle members it reaches.
pub fn final_successors<F, I>(start: &str, successors: F) -> BTreeSet<String>
where
    F: Fn(&str) -> I,
    I: IntoIterator<Item = String>,
{
    let (reached, sinks) = reach(start, &successors);
    if !sinks.is_empty() {
        return sinks;
    }
    if reached.is_empty() || reached.contains(start) {
        return BTreeSet::from([start.to_string()]);
    }
    reached
        .iter()
        .filter(|node| reach(node, &successors).0.contains(node.as_str()))
        .cloned()
        .collect()
}

/// Nodes reachable from `start` in one or more steps, and the ones among them
/// with no successors.
fn reach<F, I>(start: &str, successors: &F) -> (HashSet<String>, BTreeSet<String>)
where
    F: Fn(&str) -> I,
    I: IntoIterator<Item = String>,
{
    let mut reached: HashSet<String> = HashSet::new();
    let mut sinks = BTreeSet::new();
    let mut frontier: Vec<String> = successors(start).into_iter().collect();

    while let Some(node) = frontier.pop() {
        if !reached.insert(node.clone()) {
            continue;
        }
        let mut has_next = false;
        for next in successors(&node) {
            has_next = true;
            if !reached.contains(&next) {
                frontier.push(next);
            }
        }
        if !has_next {
            sinks.insert(node);
        }
    }
    (reached, sinks)
}

/// `IAO_0100001` to every terminal successor, and `prov:wasRevisionOf` back
/// to the predecessor on each immediate successor that is a known class.
pub fn resolve_final_successors(
    index: &ClassIndex,
    _graphs: &BTreeMap<ReleaseId, ReleaseGraph>,
) -> Additions {
    let mut additions = Additions::default();

    for (iri, entry) in index.classes() {
        for successor in &entry.successors {
            if let Some(next) = index.get(successor) {
                additions.add(
                    next.release,
                    Node::iri(successor),
                    vocab::PROV_WAS_REVISION_OF,
                    Object::iri(iri),
                );
            }
        }

        let terminals = final_successors(iri, |node| index.successors(node).to_vec());
        if terminals.len() == 1 && terminals.contains(iri) {
            continue;
        }
        for terminal in terminals {
            additions.add(
                entry.release,
                Node::iri(iri),
                vocab::IAO_TERM_REPLACED_BY,
                Object::iri(terminal),
            );
        }
    }
    additions
}

/// Labels held by the same logical taxon in strictly older releases become
/// exact synonyms, each annotated with an `owl:Axiom` naming the release the
/// old name comes from.
pub fn propagate_former_names(
    index: &ClassIndex,
    graphs: &BTreeMap<ReleaseId, ReleaseGraph>,
) -> Additions {
    let mut additions = Additions::default();
    let mut added: HashSet<(&str, &str)> = HashSet::new();

    for (iri, entry) in index.classes() {
        let (Some(key), Some(label)) = (&entry.identity, &entry.label) else {
            continue;
        };
        let Some(graph) = graphs.get(&entry.release).map(|rg| &rg.graph) else {
            continue;
        };
        let class = Node::iri(iri);

        for (older, older_iri) in index.older_versions(key, entry.release) {
            let Some(old_label) = index.get(older_iri).and_then(|e| e.label.as_deref()) else {
                continue;
            };
            let literal = Object::string(old_label);
            if old_label == label
                || graph.contains(&class, vocab::OIO_HAS_EXACT_SYNONYM, &literal)
                || !added.insert((iri, old_label))
            {
                continue;
            }

            let source = graphs
                .get(&older)
                .map(|rg| rg.ontology_iri.clone())
                .unwrap_or_default();
            add_former_name(&mut additions, entry.release, &class, iri, old_label, source);
        }
    }
    additions
}

fn add_former_name(
    additions: &mut Additions,
    owner: ReleaseId,
    class: &Node,
    iri: &str,
    name: &str,
    source_ontology: String,
) {
    let literal = Object::string(name);
    additions.add(
        owner,
        class.clone(),
        vocab::OIO_HAS_EXACT_SYNONYM,
        literal.clone(),
    );

    let axiom = Node::blank(blank_node_label("syn", &[iri, name]));
    additions.add(owner, axiom.clone(), vocab::RDF_TYPE, Object::iri(vocab::OWL_AXIOM));
    additions.add(owner, axiom.clone(), vocab::OWL_ANNOTATED_SOURCE, class.clone());
    additions.add(
        owner,
        axiom.clone(),
        vocab::OWL_ANNOTATED_PROPERTY,
        Object::iri(vocab::OIO_HAS_EXACT_SYNONYM),
    );
    additions.add(owner, axiom.clone(), vocab::OWL_ANNOTATED_TARGET, literal);
    additions.add(
        owner,
        axiom.clone(),
        vocab::OIO_HAS_SYNONYM_TYPE,
        Object::iri(vocab::OMO_PREVIOUS_NAME),
    );
    if !source_ontology.is_empty() {
        additions.add(
            owner,
            axiom,
            vocab::RDFS_IS_DEFINED_BY,
            Object::iri(source_ontology),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IriScheme;

    fn iris() -> IriScheme {
        IriScheme::default()
    }

    fn class_iri(release: u32, key: &str) -> String {
        iris().class_iri(ReleaseId(release), &IdentityKey::parse(key).unwrap())
    }

    /// Minimal release graph: classes as `(identity, label, successors)`.
    fn release(n: u32, classes: &[(&str, &str, &[String])]) -> ReleaseGraph {
        let mut graph = Graph::new();
        for (key, label, successors) in classes {
            let class = Node::iri(class_iri(n, key));
            graph.add(class.clone(), vocab::RDF_TYPE, Object::iri(vocab::OWL_CLASS));
            graph.add(class.clone(), vocab::RDFS_LABEL, Object::string(*label));
            graph.add(
                class.clone(),
                vocab::DCTERMS_IDENTIFIER,
                Object::string(format!("ICTV{key}")),
            );
            graph.add(
                class.clone(),
                vocab::OWL_VERSION_INFO,
                Object::string(format!("MSL{n}")),
            );
            for s in *successors {
                graph.add(class.clone(), vocab::PROV_HAD_REVISION, Object::iri(s));
            }
        }
        ReleaseGraph {
            release: ReleaseId(n),
            ontology_iri: iris().ontology_iri(ReleaseId(n)),
            graph,
        }
    }

    fn graph_of(resolved: &[ReleaseGraph], n: u32) -> &Graph {
        &resolved
            .iter()
            .find(|rg| rg.release == ReleaseId(n))
            .unwrap()
            .graph
    }

    fn replaced_by(g: &Graph, iri: &str) -> BTreeSet<String> {
        g.objects(&Node::iri(iri), vocab::IAO_TERM_REPLACED_BY)
            .filter_map(Object::as_iri)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn cycle_terminates_with_self_terminal() {
        let a = "A".to_string();
        let b = "B".to_string();
        let succ = |n: &str| match n {
            "A" => vec![b.clone()],
            "B" => vec![a.clone()],
            _ => vec![],
        };
        assert_eq!(final_successors("A", succ), BTreeSet::from([a.clone()]));
        assert_eq!(final_successors("B", succ), BTreeSet::from([b.clone()]));
    }

    #[test]
    fn chain_into_foreign_cycle_ends_at_cycle_members() {
        let succ = |n: &str| match n {
            "A" => vec!["B".to_string()],
            "B" => vec!["C".to_string()],
            "C" => vec!["B".to_string()],
            _ => vec![],
        };
        assert_eq!(
            final_successors("A", succ),
            BTreeSet::from(["B".to_string(), "C".to_string()])
        );
        assert_eq!(final_successors("B", succ), BTreeSet::from(["B".to_string()]));
    }

    #[test]
    fn tail_node_before_cycle_is_not_a_terminal() {
        let succ = |n: &str| match n {
            "A" => vec!["T".to_string()],
            "T" => vec!["C".to_string()],
            "C" => vec!["D".to_string()],
            "D" => vec!["C".to_string()],
            _ => vec![],
        };
        assert_eq!(
            final_successors("A", succ),
            BTreeSet::from(["C".to_string(), "D".to_string()])
        );
    }

    #[test]
    fn chain_reaches_final_successors() {
        let succ = |n: &str| match n {
            "A" => vec!["B".to_string()],
            "B" => vec!["C".to_string(), "D".to_string()],
            _ => vec![],
        };
        assert_eq!(
            final_successors("A", succ),
            BTreeSet::from(["C".to_string(), "D".to_string()])
        );
        assert_eq!(final_successors("C", succ), BTreeSet::from(["C".to_string()]));
    }

    #[test]
    fn split_then_merge_points_to_final_classes() {
        let b = class_iri(2, "2");
        let c = class_iri(3, "3");
        let d = class_iri(3, "4");
        let resolved = resolve(vec![
            release(1, &[("1", "A virus", &[b.clone()])]),
            release(2, &[("2", "B virus", &[c.clone(), d.clone()])]),
            release(3, &[("3", "C virus", &[]), ("4", "D virus", &[])]),
        ]);

        let a = class_iri(1, "1");
        assert_eq!(
            replaced_by(graph_of(&resolved, 1), &a),
            BTreeSet::from([c.clone(), d.clone()])
        );
        assert!(replaced_by(graph_of(&resolved, 3), &c).is_empty());
        assert!(graph_of(&resolved, 2).contains(
            &Node::iri(&b),
            vocab::PROV_WAS_REVISION_OF,
            &Object::iri(&a)
        ));
    }

    #[test]
    fn cyclic_classes_get_no_replacement() {
        let a = class_iri(1, "1");
        let b = class_iri(2, "2");
        let resolved = resolve(vec![
            release(1, &[("1", "A virus", &[b.clone()])]),
            release(2, &[("2", "B virus", &[a.clone()])]),
        ]);
        assert!(replaced_by(graph_of(&resolved, 1), &a).is_empty());
        assert!(replaced_by(graph_of(&resolved, 2), &b).is_empty());
    }

    #[test]
    fn class_leading_into_a_cycle_is_replaced_by_its_members() {
        let a = class_iri(1, "1");
        let b = class_iri(2, "2");
        let c = class_iri(3, "3");
        let resolved = resolve(vec![
            release(1, &[("1", "A virus", &[b.clone()])]),
            release(2, &[("2", "B virus", &[c.clone()])]),
            release(3, &[("3", "C virus", &[b.clone()])]),
        ]);
        assert_eq!(
            replaced_by(graph_of(&resolved, 1), &a),
            BTreeSet::from([b.clone(), c.clone()])
        );
        assert!(replaced_by(graph_of(&resolved, 2), &b).is_empty());
        assert!(replaced_by(graph_of(&resolved, 3), &c).is_empty());
    }

    #[test]
    fn only_non_latest_classes_are_deprecated() {
        let resolved = resolve(vec![
            release(1, &[("1", "Foo", &[])]),
            release(2, &[("1", "Foo", &[])]),
        ]);
        let deprecated = Object::boolean(true);
        assert!(graph_of(&resolved, 1).contains(
            &Node::iri(class_iri(1, "1")),
            vocab::OWL_DEPRECATED,
            &deprecated
        ));
        assert!(graph_of(&resolved, 2)
            .object(&Node::iri(class_iri(2, "1")), vocab::OWL_DEPRECATED)
            .is_none());
    }

    #[test]
    fn former_name_becomes_one_synonym_with_provenance() {
        let resolved = resolve(vec![
            release(1, &[("1", "Foo", &[])]),
            release(2, &[("1", "Bar", &[])]),
        ]);
        let g = graph_of(&resolved, 2);
        let bar = Node::iri(class_iri(2, "1"));

        let synonyms: Vec<_> = g
            .objects(&bar, vocab::OIO_HAS_EXACT_SYNONYM)
            .filter_map(Object::as_lexical)
            .collect();
        assert_eq!(synonyms, vec!["Foo"]);

        let axioms: Vec<_> = g
            .subjects_with(vocab::OWL_ANNOTATED_SOURCE, &Object::Node(bar.clone()))
            .cloned()
            .collect();
        assert_eq!(axioms.len(), 1);
        assert!(g.contains(
            &axioms[0],
            vocab::RDFS_IS_DEFINED_BY,
            &Object::iri("http://ictv.global/ontology/MSL1")
        ));
        assert!(g.contains(
            &axioms[0],
            vocab::OIO_HAS_SYNONYM_TYPE,
            &Object::iri(vocab::OMO_PREVIOUS_NAME)
        ));

        // The older class never learns the newer name.
        let foo = Node::iri(class_iri(1, "1"));
        assert!(graph_of(&resolved, 1)
            .object(&foo, vocab::OIO_HAS_EXACT_SYNONYM)
            .is_none());
    }

    #[test]
    fn repeated_old_name_is_added_once_from_oldest_release() {
        let resolved = resolve(vec![
            release(1, &[("1", "Foo", &[])]),
            release(2, &[("1", "Foo", &[])]),
            release(3, &[("1", "Bar", &[])]),
        ]);
        let g = graph_of(&resolved, 3);
        let bar = Node::iri(class_iri(3, "1"));
        assert_eq!(g.objects(&bar, vocab::OIO_HAS_EXACT_SYNONYM).count(), 1);
        let axiom = g
            .subjects_with(vocab::OWL_ANNOTATED_SOURCE, &Object::Node(bar.clone()))
            .next()
            .cloned()
            .unwrap();
        assert!(g.contains(
            &axiom,
            vocab::RDFS_IS_DEFINED_BY,
            &Object::iri("http://ictv.global/ontology/MSL1")
        ));
    }

    #[test]
    fn resolving_twice_adds_nothing() {
        let b = class_iri(2, "1");
        let once = resolve(vec![
            release(1, &[("1", "Foo", &[b.clone()])]),
            release(2, &[("1", "Bar", &[])]),
        ]);
        let twice = resolve(once.clone());
        assert_eq!(once, twice);
    }
}
