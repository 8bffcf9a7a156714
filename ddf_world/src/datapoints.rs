//! Datapoint extraction: a lazy iterator turning per-indicator files into one datapoint table per
//! concept, with geography codes translated to unified codes.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::codes::GeoCodeMapping;
use crate::concepts::ConceptIndex;
use crate::error::{DdfError, DdfResult};
use crate::metadata::IndicatorNames;
use crate::COL;

const INDICATOR_EXTENSION: &str = "json";

/// Reads one per-indicator file into a table.
pub trait TableReader {
    fn read(&self, path: &Path) -> DdfResult<DataFrame>;
}

/// Reads files holding a JSON array of records. An empty file or an empty array reads as an
/// empty table.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTableReader;

impl TableReader for JsonTableReader {
    fn read(&self, path: &Path) -> DdfResult<DataFrame> {
        let bytes = std::fs::read(path)?;
        let mut content = bytes.iter().copied().filter(|b| !b.is_ascii_whitespace());
        if matches!(
            (content.next(), content.next(), content.next()),
            (None, _, _) | (Some(b'['), Some(b']'), None)
        ) {
            debug!("'{}' holds no records", path.display());
            return Ok(DataFrame::empty());
        }
        Ok(JsonReader::new(Cursor::new(bytes)).finish()?)
    }
}

/// What to do with datapoint rows whose geography code has no unified code.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedGeoPolicy {
    /// Drop the rows and log how many were dropped.
    #[default]
    Drop,
    /// Keep the rows with a null geography.
    Keep,
    /// Abort the extraction.
    Fail,
}

/// List the candidate indicator files of a directory, sorted by name.
pub fn list_indicator_files<P: AsRef<Path>>(dir: P) -> DdfResult<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    files.retain(|path| path.is_file());
    files.sort();
    Ok(files)
}

/// Lazily yields `(concept id, table)` for each indicator file that resolves to a concept.
///
/// Each call to `next` reads and converts at most one matching file. Files that are not JSON,
/// whose key has no indicator name, whose name has no concept, whose concept was already yielded
/// or that have no geography column are skipped.
pub struct DatapointExtractor<'a, R: TableReader> {
    files: std::vec::IntoIter<PathBuf>,
    reader: R,
    names: &'a IndicatorNames,
    concepts: &'a ConceptIndex,
    geo: &'a GeoCodeMapping,
    policy: UnmappedGeoPolicy,
    yielded: HashSet<String>,
}

impl<'a, R: TableReader> DatapointExtractor<'a, R> {
    pub fn new(
        files: Vec<PathBuf>,
        reader: R,
        names: &'a IndicatorNames,
        concepts: &'a ConceptIndex,
        geo: &'a GeoCodeMapping,
    ) -> Self {
        Self {
            files: files.into_iter(),
            reader,
            names,
            concepts,
            geo,
            policy: UnmappedGeoPolicy::default(),
            yielded: HashSet::new(),
        }
    }

    pub fn with_policy(mut self, policy: UnmappedGeoPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve a file to its concept id, or `None` if it should be skipped.
    fn resolve(&self, path: &Path) -> Option<(String, String)> {
        if path.extension().and_then(|e| e.to_str()) != Some(INDICATOR_EXTENSION) {
            debug!("Skipping non indicator file {}", path.display());
            return None;
        }
        let key = path.file_stem()?.to_str()?;
        let Some(name) = self.names.get(key) else {
            warn!("No indicator name for file key '{key}', skipping");
            return None;
        };
        let Some(concept) = self.concepts.concept(name) else {
            warn!("No concept for indicator '{name}' ({key}), skipping");
            return None;
        };
        if self.yielded.contains(concept) {
            warn!("Concept '{concept}' already extracted, skipping {}", path.display());
            return None;
        }
        Some((key.to_string(), concept.to_string()))
    }

    fn extract(&mut self, path: &Path) -> DdfResult<Option<(String, DataFrame)>> {
        let Some((key, concept)) = self.resolve(path) else {
            return Ok(None);
        };
        let mut df = self.reader.read(path)?;
        let Ok(geo) = df.column(COL::GEO) else {
            debug!("'{}' has no '{}' column, treating as empty", key, COL::GEO);
            return Ok(None);
        };

        let (translated, unmapped) = self.geo.translate_series(geo)?;
        let mask = translated.is_not_null();
        df.with_column(translated)?;
        if !unmapped.is_empty() {
            match self.policy {
                UnmappedGeoPolicy::Fail => {
                    return Err(DdfError::UnmappedGeo {
                        concept,
                        code: unmapped[0].clone(),
                    })
                }
                UnmappedGeoPolicy::Drop => {
                    warn!(
                        "Dropping {} rows of '{concept}' with unmapped geography codes: {:?}",
                        unmapped.len(),
                        unmapped
                    );
                    df = df.filter(&mask)?;
                }
                UnmappedGeoPolicy::Keep => warn!(
                    "{} rows of '{concept}' have unmapped geography codes: {:?}",
                    unmapped.len(),
                    unmapped
                ),
            }
        }

        if df.get_column_names().contains(&key.as_str()) {
            df.rename(&key, &concept)?;
        } else {
            warn!("'{key}' has no value column named after its key");
        }
        info!("Extracted '{concept}' with shape: {:?}", df.shape());
        self.yielded.insert(concept.clone());
        Ok(Some((concept, df)))
    }
}

impl<'a, R: TableReader> Iterator for DatapointExtractor<'a, R> {
    type Item = DdfResult<(String, DataFrame)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.files.next()?;
            match self.extract(&path) {
                Ok(Some(item)) => return Some(Ok(item)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;

    use super::*;
    use crate::codes::CountryCodeMap;
    use crate::table::string_values;

    struct MemoryReader(HashMap<PathBuf, DataFrame>);

    impl TableReader for MemoryReader {
        fn read(&self, path: &Path) -> DdfResult<DataFrame> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| DdfError::InvalidSource(path.display().to_string()))
        }
    }

    fn test_geo() -> GeoCodeMapping {
        GeoCodeMapping::new(
            HashMap::from([
                ("i1".to_string(), "AFG".to_string()),
                ("i7".to_string(), "AGO".to_string()),
            ]),
            CountryCodeMap::new(HashMap::from([
                ("AFG".to_string(), "afg".to_string()),
                ("AGO".to_string(), "ago".to_string()),
            ])),
        )
    }

    fn test_names() -> IndicatorNames {
        IndicatorNames::new(HashMap::from([
            ("abc".to_string(), "Total population".to_string()),
            ("def".to_string(), "Life expectancy".to_string()),
            ("dup".to_string(), "Total population".to_string()),
            ("old".to_string(), "Deprecated indicator".to_string()),
        ]))
    }

    fn test_concepts() -> anyhow::Result<ConceptIndex> {
        let df = df!(
            COL::CONCEPT => &["population_total", "life_expectancy_years"],
            COL::CONCEPT_FULL_NAME => &["Total population", "Life expectancy"]
        )?;
        Ok(ConceptIndex::from_df(&df, COL::CONCEPT_FULL_NAME)?)
    }

    fn test_reader() -> anyhow::Result<MemoryReader> {
        Ok(MemoryReader(HashMap::from([
            (
                PathBuf::from("abc.json"),
                df!("geo" => &["i1", "i7", "i99"], "time" => &[1800i64, 1800, 1800], "abc" => &[1.0, 2.0, 3.0])?,
            ),
            (
                PathBuf::from("def.json"),
                df!("time" => &[1800i64], "def" => &[30.0])?,
            ),
            (
                PathBuf::from("dup.json"),
                df!("geo" => &["i1"], "time" => &[1900i64], "dup" => &[5.0])?,
            ),
        ])))
    }

    fn test_files() -> Vec<PathBuf> {
        ["abc.json", "abcd123.json", "def.json", "dup.json", "old.json", "notes.txt"]
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    #[test]
    fn test_extract_datapoints() -> anyhow::Result<()> {
        let (names, concepts, geo) = (test_names(), test_concepts()?, test_geo());
        let extractor =
            DatapointExtractor::new(test_files(), test_reader()?, &names, &concepts, &geo);
        let results = extractor.collect::<DdfResult<Vec<_>>>()?;
        assert_eq!(results.len(), 1);
        let (concept, df) = &results[0];
        assert_eq!(concept, "population_total");
        assert_eq!(df.get_column_names(), vec!["geo", "time", "population_total"]);
        assert_eq!(
            string_values(df, "datapoints", "geo")?,
            vec![Some("afg".to_string()), Some("ago".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_unmapped_geo_kept_as_null() -> anyhow::Result<()> {
        let (names, concepts, geo) = (test_names(), test_concepts()?, test_geo());
        let mut extractor =
            DatapointExtractor::new(test_files(), test_reader()?, &names, &concepts, &geo)
                .with_policy(UnmappedGeoPolicy::Keep);
        let (_, df) = extractor.next().unwrap()?;
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("geo")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_unmapped_geo_fails() -> anyhow::Result<()> {
        let (names, concepts, geo) = (test_names(), test_concepts()?, test_geo());
        let mut extractor =
            DatapointExtractor::new(test_files(), test_reader()?, &names, &concepts, &geo)
                .with_policy(UnmappedGeoPolicy::Fail);
        assert!(matches!(
            extractor.next(),
            Some(Err(DdfError::UnmappedGeo { code, .. })) if code == "i99"
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_skipped_without_error() -> anyhow::Result<()> {
        let (names, concepts, geo) = (test_names(), test_concepts()?, test_geo());
        let files = vec![PathBuf::from("abcd123.json")];
        let mut extractor =
            DatapointExtractor::new(files, test_reader()?, &names, &concepts, &geo);
        assert!(extractor.next().is_none());
        Ok(())
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("drop".parse::<UnmappedGeoPolicy>().unwrap(), UnmappedGeoPolicy::Drop);
        assert_eq!("FAIL".parse::<UnmappedGeoPolicy>().unwrap(), UnmappedGeoPolicy::Fail);
        assert_eq!(UnmappedGeoPolicy::Keep.to_string(), "keep");
    }

    #[test]
    fn test_empty_json_files_are_skipped() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("abc.json"), "[]")?;
        std::fs::write(dir.path().join("dup.json"), " \n")?;
        std::fs::write(
            dir.path().join("def.json"),
            r#"[{"geo": "i7", "time": 1800, "def": 27.0}]"#,
        )?;
        let files = list_indicator_files(dir.path())?;
        let (names, concepts, geo) = (test_names(), test_concepts()?, test_geo());
        let results = DatapointExtractor::new(files, JsonTableReader, &names, &concepts, &geo)
            .collect::<DdfResult<Vec<_>>>()?;
        assert_eq!(results.len(), 1);
        let (concept, df) = &results[0];
        assert_eq!(concept, "life_expectancy_years");
        assert_eq!(df.shape(), (1, 3));
        Ok(())
    }

    #[test]
    fn test_json_files_from_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut file = File::create(dir.path().join("abc.json"))?;
        write!(
            file,
            r#"[{{"geo": "i1", "time": 1800, "abc": 3280000}}, {{"geo": "i7", "time": 1800, "abc": 1570000}}]"#
        )?;
        File::create(dir.path().join("readme.txt"))?;

        let files = list_indicator_files(dir.path())?;
        assert_eq!(files.len(), 2);
        let (names, concepts, geo) = (test_names(), test_concepts()?, test_geo());
        let results = DatapointExtractor::new(files, JsonTableReader, &names, &concepts, &geo)
            .collect::<DdfResult<Vec<_>>>()?;
        assert_eq!(results.len(), 1);
        let (concept, df) = &results[0];
        assert_eq!(concept, "population_total");
        assert_eq!(df.height(), 2);
        assert!(df.column("population_total").is_ok());
        Ok(())
    }
}
