use crate::ids::ReleaseId;

/// Fatal conditions. Any of these aborts the run before output is written.
///
/// Recoverable data-quality problems (an unresolvable successor, a dangling
/// parent id) are logged with `tracing::warn!` instead and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("duplicate {key} `{id}` in {table} table")]
    DuplicateIdentity {
        table: &'static str,
        key: &'static str,
        id: String,
    },
    #[error("unrecognized rank `{rank}` on taxnode {taxnode_id}")]
    UnrecognizedRank { rank: String, taxnode_id: String },
    #[error("malformed row in {table} table at line {line}: {reason}")]
    MalformedRow {
        table: &'static str,
        line: u64,
        reason: String,
    },
    #[error("release {0} is not present in the node table")]
    UnknownRelease(ReleaseId),
    #[error("CSV error in {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rdf(#[from] ictvowl_rdf::RdfError),
}
