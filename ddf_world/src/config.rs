use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::datapoints::UnmappedGeoPolicy;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory the source files are read from.
    pub source_dir: PathBuf,
    /// Directory the DDF files are written to.
    pub output_dir: PathBuf,
    pub sources: SourcePaths,
    /// Position of the grouping level whose group ids drop separators entirely.
    pub strict_grouping_index: Option<usize>,
    pub unmapped_geo: UnmappedGeoPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_dir: "source".into(),
            output_dir: ".".into(),
            sources: SourcePaths::default(),
            strict_grouping_index: Some(4),
            unmapped_geo: UnmappedGeoPolicy::default(),
        }
    }
}

impl Config {
    /// Resolve a source file name against `source_dir`.
    pub fn source_path<P: AsRef<Path>>(&self, file_name: P) -> PathBuf {
        self.source_dir.join(file_name)
    }
}

/// File names of the inputs, relative to `Config::source_dir`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourcePaths {
    pub regions: String,
    pub area_categorization: String,
    pub country_synonyms: String,
    pub graph_settings: String,
    pub canonical_countries: String,
    pub discrete_concepts: String,
    pub metadata: String,
    pub indicator_names: String,
    pub indicators_dir: String,
}

impl Default for SourcePaths {
    fn default() -> Self {
        SourcePaths {
            regions: "regions.json".into(),
            area_categorization: "area_categorizarion.json".into(),
            country_synonyms: "country_synonyms.csv".into(),
            graph_settings: "graph_settings.csv".into(),
            canonical_countries: "ddf--entities--geo--country.csv".into(),
            discrete_concepts: "ddf--concepts--discrete.csv".into(),
            metadata: "metadata.json".into(),
            indicator_names: "indicator_names.csv".into(),
            indicators_dir: "indicators".into(),
        }
    }
}
