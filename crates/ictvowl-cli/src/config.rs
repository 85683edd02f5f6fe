//! Pipeline configuration (JSON file, every field defaulted; CLI flags win).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ictvowl_taxonomy::{BuildOptions, IriScheme, OntologyMetadata, ReleaseId, TablePaths};

use crate::registry::OlsEntry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub node_file: String,
    pub delta_file: String,
    pub isolate_file: String,
    pub out_dir: PathBuf,
    pub base_iri: String,
    pub root_term: String,
    /// RDF files merged into every output (Turtle, N-Triples or RDF/XML).
    pub reference_ontologies: Vec<PathBuf>,
    /// JSON file with an `ontologies` array copied into the registry as is.
    pub supporting_ontologies: Option<PathBuf>,
    pub registry: RegistryConfig,
    /// Releases to build; empty means all.
    pub releases: Vec<ReleaseId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub purl_prefix: String,
    pub preferred_prefix: String,
    /// Defaults to the class/isolate namespace of `base_iri`.
    pub base_uris: Vec<String>,
    pub extra: Vec<OlsEntry>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let metadata = OntologyMetadata::default();
        Self {
            data_dir: PathBuf::from("data"),
            node_file: "taxonomy_node_export.utf8.txt".to_string(),
            delta_file: "taxonomy_node_delta.utf8.txt".to_string(),
            isolate_file: "species_isolates.utf8.txt".to_string(),
            out_dir: PathBuf::from("out"),
            base_iri: IriScheme::default().base().to_string(),
            root_term: metadata.root_term,
            reference_ontologies: Vec::new(),
            supporting_ontologies: None,
            registry: RegistryConfig::default(),
            releases: Vec::new(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            purl_prefix: "file:///opt/dataload/out/".to_string(),
            preferred_prefix: "ictv".to_string(),
            base_uris: Vec::new(),
            extra: vec![OlsEntry {
                id: "evora".to_string(),
                ontology_purl: "https://raw.githubusercontent.com/EVORA-project/evora-ontology/refs/heads/main/models/owl/evora_ontology.owl.ttl".to_string(),
                preferred_prefix: None,
                base_uri: Vec::new(),
            }],
        }
    }
}

impl PipelineConfig {
    /// Read `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    pub fn table_paths(&self) -> TablePaths {
        TablePaths {
            nodes: self.data_dir.join(&self.node_file),
            deltas: self.data_dir.join(&self.delta_file),
            isolates: self.data_dir.join(&self.isolate_file),
        }
    }

    pub fn iris(&self) -> IriScheme {
        IriScheme::new(&self.base_iri)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            iris: self.iris(),
            metadata: OntologyMetadata {
                root_term: self.root_term.clone(),
                ..OntologyMetadata::default()
            },
        }
    }

    pub fn base_uris(&self) -> Vec<String> {
        if self.registry.base_uris.is_empty() {
            vec![self.iris().id_namespace()]
        } else {
            self.registry.base_uris.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{ "out_dir": "/tmp/ictv", "releases": ["MSL38", "39"], "registry": { "preferred_prefix": "ICTV" } }"#,
        )
        .unwrap();
        assert_eq!(config.out_dir, PathBuf::from("/tmp/ictv"));
        assert_eq!(config.releases, vec![ReleaseId(38), ReleaseId(39)]);
        assert_eq!(config.registry.preferred_prefix, "ICTV");
        assert_eq!(config.registry.purl_prefix, "file:///opt/dataload/out/");
        assert_eq!(config.node_file, "taxonomy_node_export.utf8.txt");
        assert_eq!(config.base_uris(), vec!["http://ictv.global/id/".to_string()]);
    }

    #[test]
    fn table_paths_join_data_dir() {
        let config = PipelineConfig {
            data_dir: PathBuf::from("/data"),
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.table_paths().deltas,
            PathBuf::from("/data/taxonomy_node_delta.utf8.txt")
        );
    }

    #[test]
    fn root_term_flows_into_build_options() {
        let config = PipelineConfig {
            root_term: "http://example.org/Root".to_string(),
            base_iri: "https://ictv.example/".to_string(),
            ..PipelineConfig::default()
        };
        let options = config.build_options();
        assert_eq!(options.metadata.root_term, "http://example.org/Root");
        assert_eq!(options.iris.base(), "https://ictv.example");
    }
}
