//! Change kinds recorded in the delta table and the editor note each one gets.
//!
//! A taxon instance may carry several flags at once (a species can be moved
//! *and* renamed in the same release). Only one editor note is written per
//! taxon: the first rule in [`CHANGE_PRIORITY`] whose flag is set wins.

use bitflags::bitflags;
use ictvowl_rdf::vocab;

use crate::ids::ReleaseId;

bitflags! {
    /// Set of boolean delta flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u16 {
        const NEW = 1 << 0;
        const MERGED = 1 << 1;
        const SPLIT = 1 << 2;
        const MOVED = 1 << 3;
        const PROMOTED = 1 << 4;
        const DEMOTED = 1 << 5;
        const RENAMED = 1 << 6;
        const DELETED = 1 << 7;
        const LINEAGE_UPDATED = 1 << 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Merged,
    Split,
    Moved,
    Promoted,
    Demoted,
    Renamed,
    Deleted,
}

/// One row of the priority table.
///
/// `template` placeholders: `{targets}` (comma-separated successor curies) and
/// `{release}` (the target release).
#[derive(Debug, Clone, Copy)]
pub struct ChangeRule {
    pub kind: ChangeKind,
    pub flag: ChangeFlags,
    pub template: &'static str,
    pub obsolescence_reason: Option<&'static str>,
}

/// First match wins. `LINEAGE_UPDATED` deliberately has no rule.
pub const CHANGE_PRIORITY: &[ChangeRule] = &[
    ChangeRule {
        kind: ChangeKind::New,
        flag: ChangeFlags::NEW,
        template: "New in {release}",
        obsolescence_reason: None,
    },
    ChangeRule {
        kind: ChangeKind::Merged,
        flag: ChangeFlags::MERGED,
        template: "Merged into {targets}",
        obsolescence_reason: Some(vocab::IAO_TERMS_MERGED),
    },
    ChangeRule {
        kind: ChangeKind::Split,
        flag: ChangeFlags::SPLIT,
        template: "Split into {targets}",
        obsolescence_reason: Some(vocab::IAO_TERM_SPLIT),
    },
    ChangeRule {
        kind: ChangeKind::Moved,
        flag: ChangeFlags::MOVED,
        template: "Moved to {targets}",
        obsolescence_reason: None,
    },
    ChangeRule {
        kind: ChangeKind::Promoted,
        flag: ChangeFlags::PROMOTED,
        template: "Promoted, see {targets}",
        obsolescence_reason: None,
    },
    ChangeRule {
        kind: ChangeKind::Demoted,
        flag: ChangeFlags::DEMOTED,
        template: "Demoted, see {targets}",
        obsolescence_reason: None,
    },
    ChangeRule {
        kind: ChangeKind::Renamed,
        flag: ChangeFlags::RENAMED,
        template: "Renamed, see {targets}",
        obsolescence_reason: None,
    },
    ChangeRule {
        kind: ChangeKind::Deleted,
        flag: ChangeFlags::DELETED,
        template: "Deleted",
        obsolescence_reason: None,
    },
];

/// The rule that decides the editor note for a taxon with these flags.
pub fn select_rule(flags: ChangeFlags) -> Option<&'static ChangeRule> {
    CHANGE_PRIORITY.iter().find(|rule| flags.contains(rule.flag))
}

impl ChangeRule {
    /// Without a target release the ` in {release}` clause is dropped.
    pub fn render(&self, targets: &[String], release: Option<ReleaseId>) -> String {
        let note = self.template.replace("{targets}", &targets.join(", "));
        match release {
            Some(release) => note.replace("{release}", &release.to_string()),
            None => note.replace(" in {release}", ""),
        }
    }
}
