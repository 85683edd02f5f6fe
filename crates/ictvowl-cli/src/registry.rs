//! `ols_config.json` generation for the ontology browser.
//!
//! The entry keys (`id`, `ontology_purl`, `preferredPrefix`, `base_uri`) are
//! what the browser's loader reads; keep them as they are.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use walkdir::WalkDir;

use ictvowl_taxonomy::ids::MERGED_ONTOLOGY_ID;
use ictvowl_taxonomy::ReleaseId;

use crate::config::PipelineConfig;

pub const REGISTRY_FILE: &str = "ols_config.json";
pub const ONTOLOGY_SUFFIX: &str = ".owl.ttl";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OlsEntry {
    pub id: String,
    pub ontology_purl: String,
    #[serde(
        rename = "preferredPrefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_uri: Vec<String>,
}

/// Supporting ontologies are not interpreted, so they stay raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OlsConfig {
    pub ontologies: Vec<Value>,
}

/// Ontology files in `out_dir` that belong in the registry: release files
/// oldest first, then the merged file.
pub fn scan_ontology_files(out_dir: &Path) -> Result<Vec<String>> {
    let merged = format!("{MERGED_ONTOLOGY_ID}{ONTOLOGY_SUFFIX}");
    let mut releases: Vec<(ReleaseId, String)> = Vec::new();
    let mut has_merged = false;

    for entry in WalkDir::new(out_dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("scanning {}", out_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name == merged {
            has_merged = true;
            continue;
        }
        let Some(stem) = name.strip_suffix(ONTOLOGY_SUFFIX) else {
            continue;
        };
        if !stem.starts_with("MSL") {
            continue;
        }
        match stem.parse::<ReleaseId>() {
            Ok(release) => releases.push((release, name.to_string())),
            Err(_) => tracing::warn!(file = name, "ontology file name is not a release id; skipped"),
        }
    }

    releases.sort();
    let mut files: Vec<String> = releases.into_iter().map(|(_, name)| name).collect();
    if has_merged {
        files.push(merged);
    }
    Ok(files)
}

pub fn entry_for_file(file_name: &str, config: &PipelineConfig) -> OlsEntry {
    let stem = file_name.strip_suffix(ONTOLOGY_SUFFIX).unwrap_or(file_name);
    OlsEntry {
        id: stem.to_lowercase(),
        ontology_purl: format!("{}{file_name}", config.registry.purl_prefix),
        preferred_prefix: Some(config.registry.preferred_prefix.clone()),
        base_uri: config.base_uris(),
    }
}

fn supporting_entries(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading supporting ontologies {}", path.display()))?;
    let parsed: OlsConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing supporting ontologies {}", path.display()))?;
    Ok(parsed.ontologies)
}

/// Extra entries, then supporting ontologies, then one entry per scanned file.
pub fn build_registry(config: &PipelineConfig, out_dir: &Path) -> Result<OlsConfig> {
    let mut ontologies: Vec<Value> = config
        .registry
        .extra
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    if let Some(path) = &config.supporting_ontologies {
        ontologies.extend(supporting_entries(path)?);
    }

    for file in scan_ontology_files(out_dir)? {
        ontologies.push(serde_json::to_value(entry_for_file(&file, config))?);
    }

    Ok(OlsConfig { ontologies })
}

pub fn write_registry(config: &PipelineConfig, out_dir: &Path) -> Result<PathBuf> {
    let registry = build_registry(config, out_dir)?;
    let path = out_dir.join(REGISTRY_FILE);
    let json = serde_json::to_string_pretty(&registry)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        entries = registry.ontologies.len(),
        "wrote registry configuration"
    );
    Ok(path)
}
