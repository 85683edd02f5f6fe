/// Descriptive header fields shared by every emitted ontology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyMetadata {
    pub title: String,
    pub homepage: String,
    pub comment: String,
    /// External term every top-level taxon is attached to.
    pub root_term: String,
}

impl Default for OntologyMetadata {
    fn default() -> Self {
        Self {
            title: "ICTV Taxonomy".to_string(),
            homepage: "https://ictv.global/".to_string(),
            comment: "International Committee on Taxonomy of Viruses (ICTV)".to_string(),
            root_term: "http://purl.obolibrary.org/obo/NCBITaxon_10239".to_string(),
        }
    }
}
