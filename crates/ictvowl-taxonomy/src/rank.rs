//! Taxonomic ranks and their ontology terms.
//!
//! Ranks that TAXRANK defines map to TAXRANK terms; realm and subrealm have
//! no TAXRANK term and map to terms under [`ICTV_RANK_NS`]. The table is
//! closed: a rank name outside it is a fatal `UnrecognizedRank`.

use std::fmt;

use ictvowl_rdf::{vocab, Graph, Node, Object};

pub const ICTV_RANK_NS: &str = "http://ictv.global/rank/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Realm,
    Subrealm,
    Kingdom,
    Subkingdom,
    Phylum,
    Subphylum,
    Class,
    Subclass,
    Order,
    Suborder,
    Family,
    Subfamily,
    Genus,
    Subgenus,
    Species,
}

/// `(rank, name, ontology term)`, ordered from the top of the hierarchy down.
const RANK_TABLE: &[(Rank, &str, &str)] = &[
    (Rank::Realm, "realm", "http://ictv.global/rank/Realm"),
    (Rank::Subrealm, "subrealm", "http://ictv.global/rank/Subrealm"),
    (Rank::Kingdom, "kingdom", "http://purl.obolibrary.org/obo/TAXRANK_0000017"),
    (Rank::Subkingdom, "subkingdom", "http://purl.obolibrary.org/obo/TAXRANK_0000029"),
    (Rank::Phylum, "phylum", "http://purl.obolibrary.org/obo/TAXRANK_0000001"),
    (Rank::Subphylum, "subphylum", "http://purl.obolibrary.org/obo/TAXRANK_0000008"),
    (Rank::Class, "class", "http://purl.obolibrary.org/obo/TAXRANK_0000002"),
    (Rank::Subclass, "subclass", "http://purl.obolibrary.org/obo/TAXRANK_0000007"),
    (Rank::Order, "order", "http://purl.obolibrary.org/obo/TAXRANK_0000003"),
    (Rank::Suborder, "suborder", "http://purl.obolibrary.org/obo/TAXRANK_0000014"),
    (Rank::Family, "family", "http://purl.obolibrary.org/obo/TAXRANK_0000004"),
    (Rank::Subfamily, "subfamily", "http://purl.obolibrary.org/obo/TAXRANK_0000024"),
    (Rank::Genus, "genus", "http://purl.obolibrary.org/obo/TAXRANK_0000005"),
    (Rank::Subgenus, "subgenus", "http://purl.obolibrary.org/obo/TAXRANK_0000009"),
    (Rank::Species, "species", "http://purl.obolibrary.org/obo/TAXRANK_0000006"),
];

impl Rank {
    /// Case-insensitive lookup by rank name. `None` for anything outside the table.
    pub fn from_name(name: &str) -> Option<Rank> {
        let name = name.trim();
        RANK_TABLE
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(name))
            .map(|(rank, _, _)| *rank)
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn term_iri(self) -> &'static str {
        self.entry().2
    }

    pub fn all() -> impl Iterator<Item = Rank> {
        RANK_TABLE.iter().map(|(rank, _, _)| *rank)
    }

    fn entry(self) -> &'static (Rank, &'static str, &'static str) {
        // RANK_TABLE lists every variant in declaration order.
        &RANK_TABLE[self as usize]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarations for the locally minted rank terms (TAXRANK terms are declared
/// by TAXRANK itself).
pub fn rank_vocabulary() -> Graph {
    let mut g = Graph::new();
    for rank in Rank::all() {
        let iri = rank.term_iri();
        if !iri.starts_with(ICTV_RANK_NS) {
            continue;
        }
        let node = Node::iri(iri);
        g.add(node.clone(), vocab::RDF_TYPE, Object::iri(vocab::OWL_CLASS));
        g.add(node, vocab::RDFS_LABEL, Object::string(rank.name()));
    }
    g
}
