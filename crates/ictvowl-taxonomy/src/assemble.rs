//! Ontology Assembler: the merged cross-release ontology plus one standalone
//! ontology per release.

use ictvowl_rdf::{vocab, Graph, Node, Object};

use crate::build::{BuildOptions, ReleaseGraph};
use crate::ids::ReleaseId;
use crate::rank::rank_vocabulary;

#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub merged: Graph,
    /// Oldest release first.
    pub releases: Vec<(ReleaseId, Graph)>,
}

/// `references` are imported reference-ontology triples; they are copied into
/// every output.
pub fn assemble(resolved: &[ReleaseGraph], references: &Graph, options: &BuildOptions) -> Assembly {
    let ranks = rank_vocabulary();
    let root_term = Object::iri(&options.metadata.root_term);

    let mut releases: Vec<(ReleaseId, Graph)> = resolved
        .iter()
        .map(|rg| {
            let mut graph = rg.graph.clone();
            graph.merge(references);
            graph.merge(&ranks);
            graph.add(
                Node::iri(&rg.ontology_iri),
                vocab::IAO_ONTOLOGY_ROOT_TERM,
                root_term.clone(),
            );
            (rg.release, graph)
        })
        .collect();
    releases.sort_by_key(|(release, _)| *release);

    let mut merged = Graph::new();
    for rg in resolved {
        merged.merge(&rg.graph);
    }
    for rg in resolved {
        merged.remove_subject(&Node::iri(&rg.ontology_iri));
    }
    merged.merge(references);
    merged.merge(&ranks);
    merged.merge(&merged_header(options));

    tracing::info!(
        releases = releases.len(),
        merged_triples = merged.len(),
        "assembled ontologies"
    );

    Assembly { merged, releases }
}

fn merged_header(options: &BuildOptions) -> Graph {
    let meta = &options.metadata;
    let ontology = Node::iri(options.iris.merged_ontology_iri());
    let mut g = Graph::new();
    g.add(ontology.clone(), vocab::RDF_TYPE, Object::iri(vocab::OWL_ONTOLOGY));
    g.add(ontology.clone(), vocab::DCTERMS_TITLE, Object::string(&meta.title));
    g.add(ontology.clone(), vocab::FOAF_HOMEPAGE, Object::iri(&meta.homepage));
    g.add(ontology.clone(), vocab::RDFS_COMMENT, Object::string(&meta.comment));
    g.add(
        ontology,
        vocab::IAO_ONTOLOGY_ROOT_TERM,
        Object::iri(&meta.root_term),
    );
    g
}
