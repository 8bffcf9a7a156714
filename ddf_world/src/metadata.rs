//! Indicator metadata: the indicator document with source links and scale preferences, and the
//! hashed file key → indicator name lookup used to identify datapoint files.

use std::collections::HashMap;

use log::{debug, warn};
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::{DdfError, DdfResult};
use crate::table::string_values;
use crate::COL;

/// One entry of the indicator document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorInfo {
    #[serde(default)]
    pub source_link: Option<String>,
    #[serde(default)]
    pub scales: Vec<String>,
}

/// The indicator metadata document, keyed by indicator key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMetadata {
    #[serde(rename = "indicatorsDB")]
    pub indicators: HashMap<String, IndicatorInfo>,
}

impl IndicatorMetadata {
    pub fn get(&self, key: &str) -> DdfResult<&IndicatorInfo> {
        self.indicators
            .get(key)
            .ok_or_else(|| DdfError::MetadataNotFound(key.to_string()))
    }
}

/// Hashed indicator key → indicator display name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndicatorNames(HashMap<String, String>);

impl IndicatorNames {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self(names)
    }

    /// Build from a table with the `-t-ind` and `-t-name` columns. Keys listed twice keep their
    /// first name.
    pub fn from_df(df: &DataFrame) -> DdfResult<Self> {
        let keys = string_values(df, "indicator names", COL::IND_HASH)?;
        let names = string_values(df, "indicator names", COL::IND_NAME)?;
        let mut lookup = HashMap::new();
        for (key, name) in keys.into_iter().zip(names) {
            match (key, name) {
                (Some(key), Some(name)) => {
                    if lookup.contains_key(&key) {
                        warn!("Indicator key '{key}' is listed twice, keeping the first name");
                        continue;
                    }
                    lookup.insert(key, name);
                }
                (Some(key), None) => debug!("Indicator key '{key}' has no name"),
                _ => {}
            }
        }
        Ok(Self(lookup))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
