//! Identifiers and the IRI scheme built from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A published taxonomy release (Master Species List), e.g. `MSL39`.
///
/// Ordered by release number, so `BTreeMap<ReleaseId, _>` iterates oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseId(pub u32);

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MSL{}", self.0)
    }
}

impl FromStr for ReleaseId {
    type Err = String;

    /// Accepts `MSL39`, `msl39` or a bare `39`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = match s.get(..3) {
            Some(head) if head.eq_ignore_ascii_case("msl") => &s[3..],
            _ => s,
        };
        digits
            .parse::<u32>()
            .map(ReleaseId)
            .map_err(|_| format!("invalid release id `{s}`"))
    }
}

impl TryFrom<String> for ReleaseId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReleaseId> for String {
    fn from(value: ReleaseId) -> Self {
        value.to_string()
    }
}

/// Row id of one taxon *instance* in the node table (unique across the table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxnodeId(pub u64);

impl fmt::Display for TaxnodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxnodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TaxnodeId)
            .map_err(|_| format!("invalid taxnode id `{s}`"))
    }
}

/// Stable cross-release identity of a logical taxon, normalised to `ICTV<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Normalise a raw `ictv_id` cell (`19990862` or `ICTV19990862`).
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let digits = match raw.get(..4) {
            Some(head) if head.eq_ignore_ascii_case("ictv") => &raw[4..],
            _ => raw,
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid ictv_id `{raw}`"));
        }
        Ok(Self(format!("ICTV{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the merged cross-release ontology.
pub const MERGED_ONTOLOGY_ID: &str = "ictv_all_versions";

/// Mints every IRI the pipeline emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IriScheme {
    base: String,
}

impl Default for IriScheme {
    fn default() -> Self {
        Self::new("http://ictv.global")
    }
}

impl IriScheme {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<base>/id/`, the namespace root for classes and isolates.
    pub fn id_namespace(&self) -> String {
        format!("{}/id/", self.base)
    }

    pub fn class_iri(&self, release: ReleaseId, key: &IdentityKey) -> String {
        format!("{}/id/{release}/{key}", self.base)
    }

    /// Best-effort reference for a successor missing from the identity index.
    pub fn unresolved_iri(&self, release: Option<ReleaseId>, raw: &str) -> String {
        match release {
            Some(release) => format!("{}/id/{release}/{raw}", self.base),
            None => format!("{}/id/unresolved/{raw}", self.base),
        }
    }

    pub fn isolate_iri(&self, isolate_id: u64) -> String {
        format!("{}/id/VMR{isolate_id}", self.base)
    }

    pub fn ontology_iri(&self, release: ReleaseId) -> String {
        format!("{}/ontology/{release}", self.base)
    }

    pub fn merged_ontology_iri(&self) -> String {
        format!("{}/ontology/{MERGED_ONTOLOGY_ID}", self.base)
    }

    /// Compact form used in human-readable notes: `ictv:MSL39/ICTV19990862`.
    pub fn curie(release: ReleaseId, key: &IdentityKey) -> String {
        format!("ictv:{release}/{key}")
    }
}
