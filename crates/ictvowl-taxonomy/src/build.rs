//! Per-Release Ontology Builder.
//!
//! One release in, one [`ReleaseGraph`] out. The builder only reads `&Tables`
//! and owns the graph it produces, so releases can be built concurrently.

use std::collections::{BTreeSet, HashMap};

use ictvowl_rdf::{vocab, Graph, Node, Object};

use crate::changes::{select_rule, ChangeFlags};
use crate::error::TaxonomyError;
use crate::ids::{IdentityKey, IriScheme, ReleaseId, TaxnodeId};
use crate::metadata::OntologyMetadata;
use crate::tables::{ReleaseRow, Tables, TaxonRow};
use crate::Result;

/// The ontology for one release: every triple whose subject is a class,
/// individual, or header minted for that release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseGraph {
    pub release: ReleaseId,
    pub ontology_iri: String,
    pub graph: Graph,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub iris: IriScheme,
    pub metadata: OntologyMetadata,
}

pub fn build_release(
    release: ReleaseId,
    tables: &Tables,
    options: &BuildOptions,
) -> Result<ReleaseGraph> {
    let root = tables
        .release(release)
        .ok_or(TaxonomyError::UnknownRelease(release))?;
    let taxa = tables.taxa(release);

    let mut builder = ReleaseBuilder {
        tables,
        options,
        root,
        ontology: Node::iri(options.iris.ontology_iri(release)),
        local: taxa.iter().map(|t| (t.taxnode_id, &t.ictv_id)).collect(),
        graph: Graph::new(),
    };

    builder.add_header();
    for taxon in taxa {
        builder.add_taxon(taxon);
    }

    let graph = builder.graph;
    tracing::info!(%release, classes = taxa.len(), triples = graph.len(), "built release ontology");

    Ok(ReleaseGraph {
        release,
        ontology_iri: options.iris.ontology_iri(release),
        graph,
    })
}

struct ReleaseBuilder<'a> {
    tables: &'a Tables,
    options: &'a BuildOptions,
    root: &'a ReleaseRow,
    ontology: Node,
    /// Taxa of this release by row id, for parent lookups.
    local: HashMap<TaxnodeId, &'a IdentityKey>,
    graph: Graph,
}

impl ReleaseBuilder<'_> {
    fn iris(&self) -> &IriScheme {
        &self.options.iris
    }

    fn add_header(&mut self) {
        let meta = &self.options.metadata;
        let release = self.root.release;
        let o = self.ontology.clone();
        self.graph
            .add(o.clone(), vocab::RDF_TYPE, Object::iri(vocab::OWL_ONTOLOGY));
        self.graph.add(
            o.clone(),
            vocab::RDFS_LABEL,
            Object::string(format!("{} ({release}, {})", meta.title, self.root.name)),
        );
        self.graph
            .add(o.clone(), vocab::RDFS_COMMENT, Object::string(&meta.comment));
        self.graph
            .add(o.clone(), vocab::FOAF_HOMEPAGE, Object::iri(&meta.homepage));
        self.graph
            .add(o, vocab::OWL_VERSION_INFO, Object::string(release.to_string()));
    }

    fn add_taxon(&mut self, taxon: &TaxonRow) {
        let release = self.root.release;
        let class = Node::iri(self.iris().class_iri(release, &taxon.ictv_id));

        let g = &mut self.graph;
        g.add(class.clone(), vocab::RDF_TYPE, Object::iri(vocab::OWL_CLASS));
        g.add(class.clone(), vocab::RDFS_LABEL, Object::string(&taxon.name));
        g.add(
            class.clone(),
            vocab::DCTERMS_IDENTIFIER,
            Object::string(taxon.ictv_id.as_str()),
        );
        g.add(
            class.clone(),
            vocab::OWL_VERSION_INFO,
            Object::string(release.to_string()),
        );
        g.add(class.clone(), vocab::RDFS_IS_DEFINED_BY, self.ontology.clone());
        g.add(
            class.clone(),
            vocab::TAXRANK_HAS_RANK,
            Object::iri(taxon.rank.term_iri()),
        );
        if let Some(abbrev) = &taxon.abbreviation {
            g.add(
                class.clone(),
                vocab::OIO_HAS_EXACT_SYNONYM,
                Object::string(abbrev),
            );
        }

        self.add_parent(&class, taxon);
        self.add_isolates(&class, taxon);
        self.add_changes(&class, taxon);
    }

    fn add_parent(&mut self, class: &Node, taxon: &TaxonRow) {
        let parent = if taxon.parent_id == self.root.taxnode_id {
            Some(self.options.metadata.root_term.clone())
        } else {
            self.local
                .get(&taxon.parent_id)
                .map(|key| self.iris().class_iri(self.root.release, key))
        };

        match parent {
            Some(parent) => {
                self.graph
                    .add(class.clone(), vocab::RDFS_SUBCLASS_OF, Object::iri(parent));
            }
            None => tracing::warn!(
                release = %self.root.release,
                taxnode_id = %taxon.taxnode_id,
                parent_id = %taxon.parent_id,
                "parent is not part of this release; no parent edge emitted"
            ),
        }
    }

    fn add_isolates(&mut self, class: &Node, taxon: &TaxonRow) {
        for isolate in self.tables.isolates_of(taxon.taxnode_id) {
            let node = Node::iri(self.options.iris.isolate_iri(isolate.isolate_id));
            let g = &mut self.graph;

            g.add(
                node.clone(),
                vocab::RDF_TYPE,
                Object::iri(vocab::OWL_NAMED_INDIVIDUAL),
            );
            g.add(node.clone(), vocab::RDF_TYPE, class.clone());
            g.add(node.clone(), vocab::RDFS_IS_DEFINED_BY, self.ontology.clone());
            for name in &isolate.names {
                g.add(node.clone(), vocab::RDFS_LABEL, Object::string(name));
            }
            for abbrev in &isolate.abbreviations {
                g.add(
                    node.clone(),
                    vocab::OIO_HAS_EXACT_SYNONYM,
                    Object::string(abbrev),
                );
            }

            let xrefs = [("genbank", &isolate.genbank), ("refseq", &isolate.refseq)];
            for (db, accessions) in xrefs {
                for accession in accessions {
                    let xref = format!("{db}:{accession}");
                    g.add(node.clone(), vocab::SKOS_EXACT_MATCH, Object::string(&xref));
                    g.add(class.clone(), vocab::SKOS_NARROW_MATCH, Object::string(xref));
                }
            }
        }
    }

    /// Deprecation, immediate-successor edges and the editor note.
    fn add_changes(&mut self, class: &Node, taxon: &TaxonRow) {
        let deltas = self.tables.deltas_from(taxon.taxnode_id);
        if deltas.is_empty() {
            return;
        }

        self.graph
            .add(class.clone(), vocab::OWL_DEPRECATED, Object::boolean(true));

        let mut flags = ChangeFlags::empty();
        let mut target_release = None;
        let mut successors: BTreeSet<String> = BTreeSet::new();
        let mut curies: Vec<String> = Vec::new();

        for delta in deltas {
            flags |= delta.flags;
            target_release = target_release.or(delta.target_release);

            let Some(new_taxid) = delta.new_taxid else {
                continue;
            };
            let (iri, curie) = match self.tables.identity().resolve(new_taxid) {
                Some((release, key)) => (
                    self.iris().class_iri(release, key),
                    IriScheme::curie(release, key),
                ),
                None => {
                    tracing::warn!(
                        prev_taxid = %delta.prev_taxid,
                        new_taxid = %new_taxid,
                        "successor not found in identity index; using raw id"
                    );
                    let raw = new_taxid.to_string();
                    (self.iris().unresolved_iri(delta.target_release, &raw), raw)
                }
            };

            if successors.insert(iri.clone()) {
                self.graph
                    .add(class.clone(), vocab::PROV_HAD_REVISION, Object::iri(iri));
                curies.push(curie);
            }
        }

        if let Some(rule) = select_rule(flags) {
            self.graph.add(
                class.clone(),
                vocab::IAO_EDITOR_NOTE,
                Object::string(rule.render(&curies, target_release)),
            );
            if let Some(reason) = rule.obsolescence_reason {
                self.graph.add(
                    class.clone(),
                    vocab::IAO_OBSOLESCENCE_REASON,
                    Object::iri(reason),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::Rank;
    use crate::tables::{DeltaRow, IsolateRow};

    fn key(n: u64) -> IdentityKey {
        IdentityKey::parse(&n.to_string()).unwrap()
    }

    fn taxon(id: u64, parent: u64, release: u32, ictv: u64, name: &str, rank: Rank) -> TaxonRow {
        TaxonRow {
            taxnode_id: TaxnodeId(id),
            ictv_id: key(ictv),
            name: name.to_string(),
            rank,
            parent_id: TaxnodeId(parent),
            release: ReleaseId(release),
            abbreviation: None,
        }
    }

    fn root(id: u64, release: u32) -> ReleaseRow {
        ReleaseRow {
            taxnode_id: TaxnodeId(id),
            release: ReleaseId(release),
            name: format!("20{release}"),
        }
    }

    fn class(release: u32, ictv: u64) -> Node {
        Node::iri(IriScheme::default().class_iri(ReleaseId(release), &key(ictv)))
    }

    #[test]
    fn emits_class_parent_and_rank() {
        let mut tmv = taxon(3, 2, 38, 30, "Tobacco mosaic virus", Rank::Species);
        tmv.abbreviation = Some("TMV".into());
        let tables = Tables::from_rows(
            vec![root(1, 38)],
            vec![taxon(2, 1, 38, 20, "Tobamovirus", Rank::Genus), tmv],
            vec![],
            vec![],
        )
        .unwrap();

        let rg = build_release(ReleaseId(38), &tables, &BuildOptions::default()).unwrap();
        let g = &rg.graph;
        let genus = class(38, 20);
        let species = class(38, 30);

        assert!(g.contains(
            &species,
            vocab::RDFS_SUBCLASS_OF,
            &Object::iri("http://ictv.global/id/MSL38/ICTV20")
        ));
        assert!(g.contains(
            &genus,
            vocab::RDFS_SUBCLASS_OF,
            &Object::iri(OntologyMetadata::default().root_term)
        ));
        assert!(g.contains(
            &species,
            vocab::TAXRANK_HAS_RANK,
            &Object::iri(Rank::Species.term_iri())
        ));
        assert!(g.contains(&species, vocab::OIO_HAS_EXACT_SYNONYM, &Object::string("TMV")));
        assert!(g.contains(&species, vocab::OWL_VERSION_INFO, &Object::string("MSL38")));
        assert!(g.contains(
            &species,
            vocab::DCTERMS_IDENTIFIER,
            &Object::string("ICTV30")
        ));
        assert!(g.object(&species, vocab::OWL_DEPRECATED).is_none());
    }

    #[test]
    fn deltas_add_successors_and_single_ranked_note() {
        let tables = Tables::from_rows(
            vec![root(1, 38), root(10, 39)],
            vec![
                taxon(2, 1, 38, 20, "Old virus", Rank::Species),
                taxon(11, 10, 39, 21, "New virus A", Rank::Species),
                taxon(12, 10, 39, 22, "New virus B", Rank::Species),
            ],
            vec![
                DeltaRow {
                    prev_taxid: TaxnodeId(2),
                    new_taxid: Some(TaxnodeId(11)),
                    target_release: Some(ReleaseId(39)),
                    flags: ChangeFlags::SPLIT | ChangeFlags::RENAMED,
                },
                DeltaRow {
                    prev_taxid: TaxnodeId(2),
                    new_taxid: Some(TaxnodeId(12)),
                    target_release: Some(ReleaseId(39)),
                    flags: ChangeFlags::SPLIT,
                },
            ],
            vec![],
        )
        .unwrap();

        let rg = build_release(ReleaseId(38), &tables, &BuildOptions::default()).unwrap();
        let g = &rg.graph;
        let old = class(38, 20);

        assert!(g.contains(&old, vocab::OWL_DEPRECATED, &Object::boolean(true)));
        let successors: Vec<_> = g
            .objects(&old, vocab::PROV_HAD_REVISION)
            .filter_map(Object::as_iri)
            .collect();
        assert_eq!(
            successors,
            vec![
                "http://ictv.global/id/MSL39/ICTV21",
                "http://ictv.global/id/MSL39/ICTV22"
            ]
        );
        let notes: Vec<_> = g
            .objects(&old, vocab::IAO_EDITOR_NOTE)
            .filter_map(Object::as_lexical)
            .collect();
        assert_eq!(notes, vec!["Split into ictv:MSL39/ICTV21, ictv:MSL39/ICTV22"]);
        assert!(g.contains(
            &old,
            vocab::IAO_OBSOLESCENCE_REASON,
            &Object::iri(vocab::IAO_TERM_SPLIT)
        ));
    }

    #[test]
    fn unresolved_successor_uses_raw_id() {
        let tables = Tables::from_rows(
            vec![root(1, 38)],
            vec![taxon(2, 1, 38, 20, "Gone virus", Rank::Species)],
            vec![DeltaRow {
                prev_taxid: TaxnodeId(2),
                new_taxid: Some(TaxnodeId(999)),
                target_release: Some(ReleaseId(39)),
                flags: ChangeFlags::MOVED,
            }],
            vec![],
        )
        .unwrap();

        let rg = build_release(ReleaseId(38), &tables, &BuildOptions::default()).unwrap();
        let old = class(38, 20);
        assert!(rg.graph.contains(
            &old,
            vocab::PROV_HAD_REVISION,
            &Object::iri("http://ictv.global/id/MSL39/999")
        ));
        assert!(rg
            .graph
            .contains(&old, vocab::IAO_EDITOR_NOTE, &Object::string("Moved to 999")));
    }

    #[test]
    fn isolates_carry_names_and_xrefs() {
        let tables = Tables::from_rows(
            vec![root(1, 38)],
            vec![taxon(2, 1, 38, 20, "Tobacco mosaic virus", Rank::Species)],
            vec![],
            vec![IsolateRow {
                isolate_id: 7,
                taxnode_id: TaxnodeId(2),
                names: vec!["U1".into()],
                abbreviations: vec!["TMV-U1".into()],
                genbank: vec!["V01408".into()],
                refseq: vec!["NC_001367".into()],
            }],
        )
        .unwrap();

        let rg = build_release(ReleaseId(38), &tables, &BuildOptions::default()).unwrap();
        let g = &rg.graph;
        let isolate = Node::iri("http://ictv.global/id/VMR7");
        let species = class(38, 20);

        assert!(g.contains(&isolate, vocab::RDF_TYPE, &Object::iri(vocab::OWL_NAMED_INDIVIDUAL)));
        assert!(g.contains(&isolate, vocab::RDF_TYPE, &Object::Node(species.clone())));
        assert!(g.contains(&isolate, vocab::RDFS_LABEL, &Object::string("U1")));
        assert!(g.contains(&isolate, vocab::SKOS_EXACT_MATCH, &Object::string("genbank:V01408")));
        assert!(g.contains(&species, vocab::SKOS_NARROW_MATCH, &Object::string("refseq:NC_001367")));
    }

    #[test]
    fn unknown_release_is_an_error() {
        let tables = Tables::default();
        let err = build_release(ReleaseId(1), &tables, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, TaxonomyError::UnknownRelease(ReleaseId(1))));
    }
}
