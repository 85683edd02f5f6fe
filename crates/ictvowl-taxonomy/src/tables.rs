//! Taxon Table Loader.
//!
//! Reads the three tab-separated exports into typed rows. Everything that can
//! be wrong with a row (missing required cell, non-numeric id, unknown rank,
//! duplicate primary key) is rejected here, before any graph is built.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::changes::ChangeFlags;
use crate::error::TaxonomyError;
use crate::ids::{IdentityKey, ReleaseId, TaxnodeId};
use crate::rank::Rank;
use crate::Result;

/// Synthetic root of one release (the node-table row with rank `tree`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRow {
    pub taxnode_id: TaxnodeId,
    pub release: ReleaseId,
    /// Year label, e.g. `2023`.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRow {
    pub taxnode_id: TaxnodeId,
    pub ictv_id: IdentityKey,
    pub name: String,
    pub rank: Rank,
    pub parent_id: TaxnodeId,
    pub release: ReleaseId,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaRow {
    pub prev_taxid: TaxnodeId,
    pub new_taxid: Option<TaxnodeId>,
    /// Release of `new_taxid`, when the export records it.
    pub target_release: Option<ReleaseId>,
    pub flags: ChangeFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolateRow {
    pub isolate_id: u64,
    pub taxnode_id: TaxnodeId,
    pub names: Vec<String>,
    pub abbreviations: Vec<String>,
    pub genbank: Vec<String>,
    pub refseq: Vec<String>,
}

/// `taxnode_id → (release, identity key)` across every release.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    by_taxnode: HashMap<TaxnodeId, (ReleaseId, IdentityKey)>,
}

impl IdentityIndex {
    pub fn resolve(&self, taxnode_id: TaxnodeId) -> Option<(ReleaseId, &IdentityKey)> {
        self.by_taxnode
            .get(&taxnode_id)
            .map(|(release, key)| (*release, key))
    }

    pub fn len(&self) -> usize {
        self.by_taxnode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_taxnode.is_empty()
    }
}

/// Locations of the three exports.
#[derive(Debug, Clone)]
pub struct TablePaths {
    pub nodes: PathBuf,
    pub deltas: PathBuf,
    pub isolates: PathBuf,
}

/// All source rows, loaded fully into memory and indexed for the builder.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    releases: BTreeMap<ReleaseId, ReleaseRow>,
    taxa: BTreeMap<ReleaseId, Vec<TaxonRow>>,
    deltas: HashMap<TaxnodeId, Vec<DeltaRow>>,
    isolates: HashMap<TaxnodeId, Vec<IsolateRow>>,
    identity: IdentityIndex,
}

impl Tables {
    pub fn load(paths: &TablePaths) -> Result<Self> {
        let tables = Self::from_readers(
            open(&paths.nodes)?,
            open(&paths.deltas)?,
            open(&paths.isolates)?,
        )?;
        tracing::info!(
            releases = tables.releases.len(),
            taxa = tables.identity.len(),
            "loaded taxonomy tables"
        );
        Ok(tables)
    }

    pub fn from_readers<N: Read, D: Read, I: Read>(nodes: N, deltas: D, isolates: I) -> Result<Self> {
        let (releases, taxa) = read_nodes(nodes)?;
        let deltas = read_deltas(deltas)?;
        let isolates = read_isolates(isolates)?;
        Self::from_rows(releases, taxa, deltas, isolates)
    }

    /// Index typed rows, enforcing the primary-key invariants:
    /// `taxnode_id` unique across the node table, `isolate_id` unique across
    /// the isolate table, and `ictv_id` unique within each release.
    pub fn from_rows(
        releases: Vec<ReleaseRow>,
        taxa: Vec<TaxonRow>,
        deltas: Vec<DeltaRow>,
        isolates: Vec<IsolateRow>,
    ) -> Result<Self> {
        let mut tables = Tables::default();
        let mut seen_taxnodes: HashSet<TaxnodeId> = HashSet::new();

        for row in releases {
            if !seen_taxnodes.insert(row.taxnode_id) {
                return Err(duplicate("node", "taxnode_id", row.taxnode_id));
            }
            if tables.releases.contains_key(&row.release) {
                return Err(duplicate("node", "release", row.release));
            }
            tables.releases.insert(row.release, row);
        }

        let mut seen_keys: HashSet<(ReleaseId, IdentityKey)> = HashSet::new();
        for row in taxa {
            if !seen_taxnodes.insert(row.taxnode_id) {
                return Err(duplicate("node", "taxnode_id", row.taxnode_id));
            }
            if !seen_keys.insert((row.release, row.ictv_id.clone())) {
                return Err(duplicate(
                    "node",
                    "ictv_id",
                    format!("{} in {}", row.ictv_id, row.release),
                ));
            }
            tables
                .identity
                .by_taxnode
                .insert(row.taxnode_id, (row.release, row.ictv_id.clone()));
            tables.taxa.entry(row.release).or_default().push(row);
        }

        for release in tables.taxa.keys() {
            if !tables.releases.contains_key(release) {
                tracing::warn!(%release, "taxa reference a release without a tree row; they will not be built");
            }
        }

        for row in deltas {
            tables.deltas.entry(row.prev_taxid).or_default().push(row);
        }

        let mut seen_isolates: HashSet<u64> = HashSet::new();
        for row in isolates {
            if !seen_isolates.insert(row.isolate_id) {
                return Err(duplicate("isolate", "isolate_id", row.isolate_id));
            }
            tables.isolates.entry(row.taxnode_id).or_default().push(row);
        }

        Ok(tables)
    }

    /// Release roots, oldest first.
    pub fn releases(&self) -> impl Iterator<Item = &ReleaseRow> {
        self.releases.values()
    }

    pub fn release(&self, id: ReleaseId) -> Option<&ReleaseRow> {
        self.releases.get(&id)
    }

    pub fn latest_release(&self) -> Option<ReleaseId> {
        self.releases.keys().next_back().copied()
    }

    pub fn taxa(&self, release: ReleaseId) -> &[TaxonRow] {
        self.taxa.get(&release).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Delta rows whose `prev_taxid` is this taxon instance.
    pub fn deltas_from(&self, taxnode_id: TaxnodeId) -> &[DeltaRow] {
        self.deltas
            .get(&taxnode_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn isolates_of(&self, taxnode_id: TaxnodeId) -> &[IsolateRow] {
        self.isolates
            .get(&taxnode_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn identity(&self) -> &IdentityIndex {
        &self.identity
    }
}

fn duplicate(table: &'static str, key: &'static str, id: impl ToString) -> TaxonomyError {
    TaxonomyError::DuplicateIdentity {
        table,
        key,
        id: id.to_string(),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        TaxonomyError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })?;
    Ok(BufReader::new(file))
}

// ============================================================================
// Raw rows (exactly what the exports contain)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    taxnode_id: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    msl_release_num: Option<String>,
    #[serde(default, alias = "level_name")]
    rank: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    ictv_id: Option<String>,
    #[serde(default)]
    abbrev_csv: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDelta {
    #[serde(default)]
    prev_taxid: Option<String>,
    #[serde(default)]
    new_taxid: Option<String>,
    #[serde(default)]
    msl: Option<String>,
    #[serde(default)]
    is_new: Option<String>,
    #[serde(default)]
    is_merged: Option<String>,
    #[serde(default)]
    is_split: Option<String>,
    #[serde(default)]
    is_moved: Option<String>,
    #[serde(default)]
    is_promoted: Option<String>,
    #[serde(default)]
    is_demoted: Option<String>,
    #[serde(default)]
    is_renamed: Option<String>,
    #[serde(default)]
    is_deleted: Option<String>,
    #[serde(default)]
    is_lineage_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIsolate {
    #[serde(default)]
    isolate_id: Option<String>,
    #[serde(default)]
    taxnode_id: Option<String>,
    #[serde(default)]
    isolate_names: Option<String>,
    #[serde(default)]
    isolate_abbrevs: Option<String>,
    #[serde(default)]
    genbank_accessions: Option<String>,
    #[serde(default)]
    refseq_accessions: Option<String>,
}

/// Per-row context for error messages.
struct RowCtx {
    table: &'static str,
    line: u64,
}

impl RowCtx {
    fn malformed(&self, reason: impl Into<String>) -> TaxonomyError {
        TaxonomyError::MalformedRow {
            table: self.table,
            line: self.line,
            reason: reason.into(),
        }
    }

    fn required<'a>(&self, column: &str, value: &'a Option<String>) -> Result<&'a str> {
        non_empty(value).ok_or_else(|| self.malformed(format!("missing required `{column}`")))
    }

    fn parse<T: std::str::FromStr<Err = String>>(&self, value: &str) -> Result<T> {
        value.parse::<T>().map_err(|e| self.malformed(e))
    }

    fn flag(&self, column: &str, value: &Option<String>) -> Result<bool> {
        match non_empty(value).map(str::to_ascii_lowercase).as_deref() {
            None | Some("0") | Some("false") | Some("no") => Ok(false),
            Some("1") | Some("true") | Some("yes") => Ok(true),
            Some(other) => Err(self.malformed(format!("`{column}` is not a boolean: `{other}`"))),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Deserialize every record of a table. Records with more cells than the
/// header (trailing delimiter in the export) are truncated to the header.
fn for_each_row<R: Read, T: DeserializeOwned>(
    table: &'static str,
    reader: R,
    mut f: impl FnMut(T, RowCtx) -> Result<()>,
) -> Result<()> {
    let csv_err = |source: csv::Error| TaxonomyError::Csv { table, source };
    let mut rdr = tsv_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();

    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let record: csv::StringRecord = if record.len() > headers.len() {
            record.iter().take(headers.len()).collect()
        } else {
            record
        };
        let ctx = RowCtx { table, line };
        let raw: T = record
            .deserialize(Some(&headers))
            .map_err(|e| ctx.malformed(e.to_string()))?;
        f(raw, ctx)?;
    }
    Ok(())
}

fn read_nodes<R: Read>(reader: R) -> Result<(Vec<ReleaseRow>, Vec<TaxonRow>)> {
    let mut releases = Vec::new();
    let mut taxa = Vec::new();

    for_each_row("node", reader, |raw: RawNode, ctx| {
        let taxnode_id: TaxnodeId = ctx.parse(ctx.required("taxnode_id", &raw.taxnode_id)?)?;
        let release: ReleaseId =
            ctx.parse(ctx.required("msl_release_num", &raw.msl_release_num)?)?;
        let rank = ctx.required("rank", &raw.rank)?;
        let name = ctx.required("name", &raw.name)?;

        if rank.eq_ignore_ascii_case("tree") {
            if name != "empty_tree" {
                releases.push(ReleaseRow {
                    taxnode_id,
                    release,
                    name: name.to_string(),
                });
            }
            return Ok(());
        }

        let rank = Rank::from_name(rank).ok_or_else(|| TaxonomyError::UnrecognizedRank {
            rank: rank.to_string(),
            taxnode_id: taxnode_id.to_string(),
        })?;
        let ictv_id = IdentityKey::parse(ctx.required("ictv_id", &raw.ictv_id)?)
            .map_err(|e| ctx.malformed(e))?;
        let parent_id: TaxnodeId = ctx.parse(ctx.required("parent_id", &raw.parent_id)?)?;

        taxa.push(TaxonRow {
            taxnode_id,
            ictv_id,
            name: name.to_string(),
            rank,
            parent_id,
            release,
            abbreviation: non_empty(&raw.abbrev_csv).map(str::to_string),
        });
        Ok(())
    })?;

    Ok((releases, taxa))
}

fn read_deltas<R: Read>(reader: R) -> Result<Vec<DeltaRow>> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for_each_row("delta", reader, |raw: RawDelta, ctx| {
        // Rows without a predecessor (pure additions) never attach to a taxon.
        let Some(prev) = non_empty(&raw.prev_taxid) else {
            skipped += 1;
            return Ok(());
        };
        let prev_taxid: TaxnodeId = ctx.parse(prev)?;
        let new_taxid = non_empty(&raw.new_taxid)
            .map(|s| ctx.parse::<TaxnodeId>(s))
            .transpose()?;
        let target_release = non_empty(&raw.msl)
            .map(|s| ctx.parse::<ReleaseId>(s))
            .transpose()?;

        let mut flags = ChangeFlags::empty();
        flags.set(ChangeFlags::NEW, ctx.flag("is_new", &raw.is_new)?);
        flags.set(ChangeFlags::MERGED, ctx.flag("is_merged", &raw.is_merged)?);
        flags.set(ChangeFlags::SPLIT, ctx.flag("is_split", &raw.is_split)?);
        flags.set(ChangeFlags::MOVED, ctx.flag("is_moved", &raw.is_moved)?);
        flags.set(ChangeFlags::PROMOTED, ctx.flag("is_promoted", &raw.is_promoted)?);
        flags.set(ChangeFlags::DEMOTED, ctx.flag("is_demoted", &raw.is_demoted)?);
        flags.set(ChangeFlags::RENAMED, ctx.flag("is_renamed", &raw.is_renamed)?);
        flags.set(ChangeFlags::DELETED, ctx.flag("is_deleted", &raw.is_deleted)?);
        flags.set(
            ChangeFlags::LINEAGE_UPDATED,
            ctx.flag("is_lineage_updated", &raw.is_lineage_updated)?,
        );

        rows.push(DeltaRow {
            prev_taxid,
            new_taxid,
            target_release,
            flags,
        });
        Ok(())
    })?;

    if skipped > 0 {
        tracing::debug!(skipped, "delta rows without prev_taxid ignored");
    }
    Ok(rows)
}

fn read_isolates<R: Read>(reader: R) -> Result<Vec<IsolateRow>> {
    let mut rows = Vec::new();

    for_each_row("isolate", reader, |raw: RawIsolate, ctx| {
        let isolate_id = ctx.required("isolate_id", &raw.isolate_id)?;
        let isolate_id = isolate_id
            .parse::<u64>()
            .map_err(|_| ctx.malformed(format!("invalid isolate id `{isolate_id}`")))?;
        let taxnode_id: TaxnodeId = ctx.parse(ctx.required("taxnode_id", &raw.taxnode_id)?)?;

        rows.push(IsolateRow {
            isolate_id,
            taxnode_id,
            names: split_multi(non_empty(&raw.isolate_names)),
            abbreviations: split_multi(non_empty(&raw.isolate_abbrevs)),
            genbank: split_accessions(non_empty(&raw.genbank_accessions)),
            refseq: split_accessions(non_empty(&raw.refseq_accessions)),
        });
        Ok(())
    })?;

    Ok(rows)
}

/// Split a multi-valued cell on `;` and `,`.
pub fn split_multi(cell: Option<&str>) -> Vec<String> {
    cell.map(|cell| {
        cell.split([';', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Like [`split_multi`], dropping segment labels: `"L: MN1234; S: MN1235"`
/// yields `["MN1234", "MN1235"]`.
pub fn split_accessions(cell: Option<&str>) -> Vec<String> {
    split_multi(cell)
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((_, accession)) => accession.trim().to_string(),
            None => entry,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODES: &str = "taxnode_id\tparent_id\ttree_id\tmsl_release_num\trank\tname\tictv_id\tabbrev_csv
100\t100\t100\t38\ttree\t2022\t\t
101\t100\t100\t38\trealm\tRiboviria\t201850001\t
102\t101\t100\t38\tspecies\tTobacco mosaic virus\t19990862\tTMV
";

    const DELTAS: &str = "prev_taxid\tnew_taxid\tmsl\tis_new\tis_merged\tis_split\tis_moved\tis_promoted\tis_demoted\tis_renamed\tis_deleted\tis_lineage_updated
102\t202\t39\t0\t0\t0\t1\t0\t0\t1\t0\t0
\t203\t39\t1\t0\t0\t0\t0\t0\t0\t0\t0
";

    const ISOLATES: &str = "isolate_id\ttaxnode_id\tisolate_names\tisolate_abbrevs\tgenbank_accessions\trefseq_accessions
7\t102\tU1; vulgare\tTMV-U1\tRNA: V01408\t
";

    #[test]
    fn loads_typed_rows() {
        let tables =
            Tables::from_readers(NODES.as_bytes(), DELTAS.as_bytes(), ISOLATES.as_bytes())
                .expect("tables");

        let releases: Vec<_> = tables.releases().map(|r| r.release).collect();
        assert_eq!(releases, vec![ReleaseId(38)]);

        let taxa = tables.taxa(ReleaseId(38));
        assert_eq!(taxa.len(), 2);
        assert_eq!(taxa[1].rank, Rank::Species);
        assert_eq!(taxa[1].abbreviation.as_deref(), Some("TMV"));
        assert_eq!(taxa[0].abbreviation, None);

        let deltas = tables.deltas_from(TaxnodeId(102));
        assert_eq!(deltas.len(), 1);
        assert!(deltas[0].flags.contains(ChangeFlags::MOVED));
        assert!(deltas[0].flags.contains(ChangeFlags::RENAMED));
        assert_eq!(deltas[0].target_release, Some(ReleaseId(39)));

        let isolates = tables.isolates_of(TaxnodeId(102));
        assert_eq!(isolates[0].names, vec!["U1", "vulgare"]);
        assert_eq!(isolates[0].genbank, vec!["V01408"]);
        assert!(isolates[0].refseq.is_empty());

        let (release, key) = tables.identity().resolve(TaxnodeId(102)).unwrap();
        assert_eq!(release, ReleaseId(38));
        assert_eq!(key.as_str(), "ICTV19990862");
    }

    #[test]
    fn duplicate_taxnode_id_is_fatal() {
        let nodes = format!("{NODES}102\t101\t100\t38\tspecies\tOther virus\t19990863\t\n");
        let err = Tables::from_readers(nodes.as_bytes(), DELTAS.as_bytes(), ISOLATES.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::DuplicateIdentity { key: "taxnode_id", .. }
        ));
    }

    #[test]
    fn unknown_rank_is_fatal() {
        let nodes = format!("{NODES}103\t101\t100\t38\tserotype\tOdd\t19990864\t\n");
        let err = Tables::from_readers(nodes.as_bytes(), DELTAS.as_bytes(), ISOLATES.as_bytes())
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::UnrecognizedRank { ref rank, .. } if rank == "serotype"));
    }

    #[test]
    fn missing_required_cell_is_malformed() {
        let nodes = format!("{NODES}103\t\t100\t38\tspecies\tOrphan\t19990865\t\n");
        let err = Tables::from_readers(nodes.as_bytes(), DELTAS.as_bytes(), ISOLATES.as_bytes())
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::MalformedRow { table: "node", .. }));
    }

    #[test]
    fn trailing_cells_are_tolerated() {
        let nodes = NODES.replace("\tTMV\n", "\tTMV\textra\n");
        let tables =
            Tables::from_readers(nodes.as_bytes(), DELTAS.as_bytes(), ISOLATES.as_bytes())
                .expect("tables");
        assert_eq!(tables.taxa(ReleaseId(38)).len(), 2);
    }

    #[test]
    fn multi_value_cells() {
        assert_eq!(split_multi(Some("a; b,c ,")), vec!["a", "b", "c"]);
        assert!(split_multi(None).is_empty());
        assert_eq!(
            split_accessions(Some("L: MN1234; S: MN1235, AB1")),
            vec!["MN1234", "MN1235", "AB1"]
        );
    }
}
