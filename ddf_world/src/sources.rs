//! Loading of the raw inputs into the value objects and tables the extractors consume.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use polars::prelude::*;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::datapoints::list_indicator_files;
use crate::error::DdfResult;
use crate::metadata::{IndicatorMetadata, IndicatorNames};
use crate::regions::{Grouping, GroupingLevels, RegionNames, RegionRecord};

/// All inputs of one export, fully loaded except the per-indicator files.
#[derive(Debug)]
pub struct SourceData {
    pub regions: RegionNames,
    pub levels: GroupingLevels,
    pub synonyms: DataFrame,
    pub graph_settings: DataFrame,
    pub canonical_countries: DataFrame,
    pub discrete_concepts: DataFrame,
    pub metadata: IndicatorMetadata,
    pub indicator_names: IndicatorNames,
    pub indicator_files: Vec<PathBuf>,
}

impl SourceData {
    pub fn load(config: &Config) -> DdfResult<Self> {
        let paths = &config.sources;
        let records: Vec<RegionRecord> = read_json(config.source_path(&paths.regions))?;
        let definitions: Vec<Grouping> =
            read_json(config.source_path(&paths.area_categorization))?;
        let regions = RegionNames::from_records(&records);
        let levels = GroupingLevels::new(definitions, config.strict_grouping_index);
        info!(
            "Loaded {} region names and {} grouping levels",
            regions.len(),
            levels.len()
        );

        let indicator_files = list_indicator_files(config.source_path(&paths.indicators_dir))?;
        info!("Found {} indicator files", indicator_files.len());

        Ok(Self {
            regions,
            levels,
            synonyms: read_csv(config.source_path(&paths.country_synonyms))?,
            graph_settings: read_csv(config.source_path(&paths.graph_settings))?,
            canonical_countries: read_csv(config.source_path(&paths.canonical_countries))?,
            discrete_concepts: read_csv(config.source_path(&paths.discrete_concepts))?,
            metadata: read_json(config.source_path(&paths.metadata))?,
            indicator_names: IndicatorNames::from_df(&read_csv(
                config.source_path(&paths.indicator_names),
            )?)?,
            indicator_files,
        })
    }
}

/// Deserialize a JSON document.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> DdfResult<T> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse '{}'", path.display()))?;
    Ok(value)
}

/// Read a CSV file with every column as string, so codes such as `004` keep their form.
pub fn read_csv<P: AsRef<Path>>(path: P) -> DdfResult<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .with_context(|| format!("Failed to load '{}'", path.display()))?;
    info!("Loaded '{}' with shape: {:?}", path.display(), df.shape());
    Ok(df)
}
