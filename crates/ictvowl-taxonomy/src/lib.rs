//! ICTV taxonomy → versioned OWL ontologies.
//!
//! ```text
//!   node / delta / isolate tables
//!              │  tables::Tables::load
//!              ▼
//!   typed rows + identity index ──► build::build_release   (one per release, parallel-safe)
//!                                          │
//!                                          ▼
//!                                   ReleaseGraph × N
//!                                          │  resolve::resolve
//!                                          ▼
//!           deprecation → final successors → former-name synonyms
//!                                          │  assemble::assemble
//!                                          ▼
//!                     merged ontology + one ontology per release
//! ```
//!
//! Every stage is a pure function of its inputs. Passes never mutate a graph
//! they are reading; they return [`resolve::Additions`] that are merged at the
//! pass boundary.

pub mod assemble;
pub mod build;
pub mod changes;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod rank;
pub mod resolve;
pub mod tables;

pub use assemble::{assemble, Assembly};
pub use build::{build_release, BuildOptions, ReleaseGraph};
pub use error::TaxonomyError;
pub use ids::{IdentityKey, IriScheme, ReleaseId, TaxnodeId};
pub use metadata::OntologyMetadata;
pub use rank::Rank;
pub use resolve::{resolve, Additions, ClassIndex};
pub use tables::{TablePaths, Tables};

pub type Result<T, E = TaxonomyError> = std::result::Result<T, E>;
