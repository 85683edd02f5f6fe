//! IRIs used by the taxonomy ontologies.

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";
pub const OIO_NS: &str = "http://www.geneontology.org/formats/oboInOwl#";
pub const IAO_NS: &str = "http://purl.obolibrary.org/obo/IAO_";
pub const OMO_NS: &str = "http://purl.obolibrary.org/obo/OMO_";
pub const TAXRANK_NS: &str = "http://purl.obolibrary.org/obo/TAXRANK_";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";

pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
pub const OWL_AXIOM: &str = "http://www.w3.org/2002/07/owl#Axiom";
pub const OWL_VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";
pub const OWL_DEPRECATED: &str = "http://www.w3.org/2002/07/owl#deprecated";
pub const OWL_ANNOTATED_SOURCE: &str = "http://www.w3.org/2002/07/owl#annotatedSource";
pub const OWL_ANNOTATED_PROPERTY: &str = "http://www.w3.org/2002/07/owl#annotatedProperty";
pub const OWL_ANNOTATED_TARGET: &str = "http://www.w3.org/2002/07/owl#annotatedTarget";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

pub const SKOS_EXACT_MATCH: &str = "http://www.w3.org/2004/02/skos/core#exactMatch";
pub const SKOS_NARROW_MATCH: &str = "http://www.w3.org/2004/02/skos/core#narrowMatch";

/// Immediate successor edge: taxon → revised taxon in a later release.
pub const PROV_HAD_REVISION: &str = "http://www.w3.org/ns/prov#hadRevision";
pub const PROV_WAS_REVISION_OF: &str = "http://www.w3.org/ns/prov#wasRevisionOf";

pub const DCTERMS_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";
pub const FOAF_HOMEPAGE: &str = "http://xmlns.com/foaf/0.1/homepage";

pub const OIO_HAS_EXACT_SYNONYM: &str =
    "http://www.geneontology.org/formats/oboInOwl#hasExactSynonym";
pub const OIO_HAS_SYNONYM_TYPE: &str =
    "http://www.geneontology.org/formats/oboInOwl#hasSynonymType";

/// `editor note`
pub const IAO_EDITOR_NOTE: &str = "http://purl.obolibrary.org/obo/IAO_0000116";
/// `has obsolescence reason`
pub const IAO_OBSOLESCENCE_REASON: &str = "http://purl.obolibrary.org/obo/IAO_0000225";
/// `terms merged`
pub const IAO_TERMS_MERGED: &str = "http://purl.obolibrary.org/obo/IAO_0000227";
/// `term split`
pub const IAO_TERM_SPLIT: &str = "http://purl.obolibrary.org/obo/IAO_0000229";
/// `term replaced by`
pub const IAO_TERM_REPLACED_BY: &str = "http://purl.obolibrary.org/obo/IAO_0100001";
/// `has ontology root term`
pub const IAO_ONTOLOGY_ROOT_TERM: &str = "http://purl.obolibrary.org/obo/IAO_0000700";

/// `previous name` synonym type
pub const OMO_PREVIOUS_NAME: &str = "http://purl.obolibrary.org/obo/OMO_0003008";

/// `has rank`
pub const TAXRANK_HAS_RANK: &str = "http://purl.obolibrary.org/obo/TAXRANK_1000000";

/// Prefix bindings emitted at the top of every Turtle document.
pub const STANDARD_PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("owl", OWL_NS),
    ("xsd", XSD_NS),
    ("skos", SKOS_NS),
    ("prov", PROV_NS),
    ("dcterms", DCTERMS_NS),
    ("foaf", FOAF_NS),
    ("oio", OIO_NS),
    ("iao", IAO_NS),
    ("omo", OMO_NS),
    ("taxrank", TAXRANK_NS),
];
