//! Full run: tables → per-release builds (parallel) → resolver → assembler →
//! Turtle files → registry configuration.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use ictvowl_rdf::{parse_rdf_file, Graph, TurtleWriter};
use ictvowl_taxonomy::ids::MERGED_ONTOLOGY_ID;
use ictvowl_taxonomy::{
    assemble, build_release, resolve, ReleaseGraph, ReleaseId, Tables,
};

use crate::config::PipelineConfig;
use crate::registry::{self, ONTOLOGY_SUFFIX};

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub releases: Vec<(ReleaseId, PathBuf)>,
    pub merged: PathBuf,
    pub registry: PathBuf,
}

pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let tables = Tables::load(&config.table_paths()).context("loading taxonomy tables")?;
    let releases = select_releases(&tables, &config.releases)?;
    let options = config.build_options();

    tracing::info!(releases = releases.len(), "building release ontologies");
    let built: Vec<ReleaseGraph> = releases
        .par_iter()
        .map(|release| build_release(*release, &tables, &options))
        .collect::<Result<_, _>>()
        .context("building release ontologies")?;

    let resolved = resolve(built);
    let references = load_references(&config.reference_ontologies)?;
    let assembly = assemble(&resolved, &references, &options);

    let out_dir = &config.out_dir;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let writer = TurtleWriter::new().with_prefix("ictv", &options.iris.id_namespace());

    let mut written = Vec::with_capacity(assembly.releases.len());
    for (release, graph) in &assembly.releases {
        let path = out_dir.join(format!("{release}{ONTOLOGY_SUFFIX}"));
        write_turtle(&writer, graph, &path)?;
        written.push((*release, path));
    }

    let merged = out_dir.join(format!("{MERGED_ONTOLOGY_ID}{ONTOLOGY_SUFFIX}"));
    write_turtle(&writer, &assembly.merged, &merged)?;

    let registry = registry::write_registry(config, out_dir)?;

    Ok(PipelineReport {
        releases: written,
        merged,
        registry,
    })
}

/// Releases to build, oldest first. An explicit filter naming a release the
/// node table does not have is an error.
pub fn select_releases(tables: &Tables, filter: &[ReleaseId]) -> Result<Vec<ReleaseId>> {
    if filter.is_empty() {
        return Ok(tables.releases().map(|r| r.release).collect());
    }
    let mut selected = Vec::with_capacity(filter.len());
    for release in filter {
        if tables.release(*release).is_none() {
            bail!("release {release} is not in the node table");
        }
        if !selected.contains(release) {
            selected.push(*release);
        }
    }
    selected.sort();
    Ok(selected)
}

fn load_references(paths: &[PathBuf]) -> Result<Graph> {
    let mut references = Graph::new();
    for path in paths {
        let graph = parse_rdf_file(path)
            .with_context(|| format!("importing reference ontology {}", path.display()))?;
        tracing::info!(path = %path.display(), triples = graph.len(), "imported reference ontology");
        references.merge(&graph);
    }
    Ok(references)
}

fn write_turtle(writer: &TurtleWriter, graph: &Graph, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writer
        .write(graph, &mut out)
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), triples = graph.len(), "wrote ontology");
    Ok(())
}
