//! Writing generated tables as DDF csv files.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use polars::prelude::*;

use crate::error::DdfResult;
use crate::COL;

/// This module contains the DDF file naming conventions.
pub mod paths {
    pub const CONCEPTS: &str = "ddf--concepts.csv";

    /// e.g. `ddf--entities--geo--country.csv`
    pub fn entities(domain: &str, entity_set: &str) -> String {
        format!("ddf--entities--{domain}--{entity_set}.csv")
    }

    /// e.g. `ddf--datapoints--population_total--by--geo--time.csv`
    pub fn datapoints(concept: &str, keys: &[&str]) -> String {
        format!("ddf--datapoints--{concept}--by--{}.csv", keys.join("--"))
    }
}
use paths as PATHS;

/// Writes tables into a DDF dataset directory.
#[derive(Debug, Clone)]
pub struct DdfWriter {
    output_dir: PathBuf,
}

impl DdfWriter {
    /// Create the writer, creating `output_dir` if it does not exist.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> DdfResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create '{}'", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write any table under `file_name`.
    pub fn write_table(&self, file_name: &str, df: &mut DataFrame) -> DdfResult<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut file =
            File::create(&path).with_context(|| format!("Failed to write '{}'", path.display()))?;
        CsvWriter::new(&mut file).finish(df)?;
        info!("Wrote '{}' with shape: {:?}", path.display(), df.shape());
        Ok(path)
    }

    pub fn write_concepts(&self, df: &mut DataFrame) -> DdfResult<PathBuf> {
        self.write_table(PATHS::CONCEPTS, df)
    }

    /// Write an entity set of the `geo` domain.
    pub fn write_entities(&self, entity_set: &str, df: &mut DataFrame) -> DdfResult<PathBuf> {
        self.write_table(&PATHS::entities(COL::GEO, entity_set), df)
    }

    /// Write a datapoint table keyed by geo and time.
    pub fn write_datapoints(&self, concept: &str, df: &mut DataFrame) -> DdfResult<PathBuf> {
        self.write_table(&PATHS::datapoints(concept, &[COL::GEO, COL::TIME]), df)
    }
}
