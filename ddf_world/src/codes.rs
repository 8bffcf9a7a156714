//! Translation of legacy geography codes into the unified country code space.
//!
//! Datapoint files identify countries by gwid. The country spreadsheet maps each gwid to a legacy
//! ISO3 code and the entity extractor maps each legacy ISO3 code to a unified code;
//! `GeoCodeMapping` composes the two steps so the whole path can be inspected and tested in one
//! place.

use std::collections::{HashMap, HashSet};

use log::debug;
use polars::prelude::*;

use crate::error::DdfResult;
use crate::table::string_values;
use crate::COL;

/// Legacy ISO3 code → unified country code.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountryCodeMap(HashMap<String, String>);

impl CountryCodeMap {
    pub fn new(codes: HashMap<String, String>) -> Self {
        Self(codes)
    }

    pub fn get(&self, iso3: &str) -> Option<&str> {
        self.0.get(iso3).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Unified code → legacy ISO3 code. Where several legacy codes share a unified code the
    /// lexicographically smallest legacy code is kept.
    pub fn inverse(&self) -> HashMap<String, String> {
        let mut inverse: HashMap<String, String> = HashMap::new();
        for (iso3, country) in self.0.iter() {
            inverse
                .entry(country.clone())
                .and_modify(|existing| {
                    if iso3 < existing {
                        *existing = iso3.clone();
                    }
                })
                .or_insert_with(|| iso3.clone());
        }
        inverse
    }

    /// The mapping as a two column table sorted by legacy code.
    pub fn to_df(&self) -> PolarsResult<DataFrame> {
        let mut pairs = self.0.iter().collect::<Vec<_>>();
        pairs.sort();
        let (old, new): (Vec<&str>, Vec<&str>) = pairs
            .into_iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .unzip();
        DataFrame::new(vec![
            Series::new(COL::COUNTRY_OLD, old),
            Series::new(COL::COUNTRY, new),
        ])
    }
}

/// The two-stage gwid → legacy ISO3 → unified code translation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoCodeMapping {
    gwid_to_iso3: HashMap<String, String>,
    countries: CountryCodeMap,
}

impl GeoCodeMapping {
    pub fn new(gwid_to_iso3: HashMap<String, String>, countries: CountryCodeMap) -> Self {
        Self {
            gwid_to_iso3,
            countries,
        }
    }

    /// Build the first stage from the country synonyms spreadsheet.
    pub fn from_synonyms(synonyms: &DataFrame, countries: CountryCodeMap) -> DdfResult<Self> {
        let gwids = string_values(synonyms, "country synonyms", COL::SYN_GWID)?;
        let isos = string_values(synonyms, "country synonyms", COL::SYN_ISO3)?;
        let gwid_to_iso3: HashMap<String, String> = gwids
            .into_iter()
            .zip(isos)
            .filter_map(|(gwid, iso)| Some((gwid?, iso?)))
            .collect();
        debug!(
            "Geo code mapping: {} gwids, {} legacy ISO3 codes",
            gwid_to_iso3.len(),
            countries.len()
        );
        Ok(Self::new(gwid_to_iso3, countries))
    }

    pub fn iso3(&self, gwid: &str) -> Option<&str> {
        self.gwid_to_iso3.get(gwid).map(|s| s.as_str())
    }

    /// Unified code for a gwid, if both stages have an entry.
    pub fn translate(&self, gwid: &str) -> Option<&str> {
        self.iso3(gwid).and_then(|iso3| self.countries.get(iso3))
    }

    /// Every unified code the mapping can produce.
    pub fn unified_codes(&self) -> HashSet<&str> {
        self.gwid_to_iso3
            .values()
            .filter_map(|iso3| self.countries.get(iso3))
            .collect()
    }

    pub fn countries(&self) -> &CountryCodeMap {
        &self.countries
    }

    /// Translate a whole column. Untranslatable values become null and are returned alongside.
    pub fn translate_series(&self, values: &Series) -> DdfResult<(Series, Vec<String>)> {
        let strings = values.cast(&DataType::String)?;
        let mut unmapped = vec![];
        let translated: Vec<Option<&str>> = strings
            .str()?
            .into_iter()
            .map(|value| {
                let value = value?;
                let code = self.translate(value);
                if code.is_none() {
                    unmapped.push(value.to_string());
                }
                code
            })
            .collect();
        Ok((Series::new(values.name(), translated), unmapped))
    }
}
