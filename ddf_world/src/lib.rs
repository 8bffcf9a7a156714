use std::cell::OnceCell;
use std::collections::BTreeMap;

use log::debug;
use polars::frame::DataFrame;

use crate::codes::{CountryCodeMap, GeoCodeMapping};
use crate::concepts::ConceptIndex;
use crate::config::Config;
use crate::datapoints::{DatapointExtractor, JsonTableReader};
use crate::entities::CountryEntities;
use crate::error::DdfResult;
use crate::sources::SourceData;

// Re-exports
pub use column_names as COL;

// Modules
pub mod codes;
pub mod column_names;
pub mod concepts;
pub mod config;
pub mod datapoints;
pub mod ddf;
pub mod entities;
pub mod error;
pub mod metadata;
pub mod regions;
pub mod slug;
pub mod sources;
pub mod table;

/// Loaded sources and configuration of one DDF export
pub struct DdfWorld {
    pub sources: SourceData,
    pub config: Config,
    country: OnceCell<CountryEntities>,
}

impl DdfWorld {
    /// Load the sources with default configuration
    pub fn new() -> DdfResult<Self> {
        Self::new_with_config(Config::default())
    }

    /// Load the sources with custom configuration
    pub fn new_with_config(config: Config) -> DdfResult<Self> {
        debug!("config: {config:?}");
        let sources = SourceData::load(&config)?;
        Ok(Self {
            sources,
            config,
            country: OnceCell::new(),
        })
    }

    /// One entity table per grouping level
    pub fn entities_groups(&self) -> DdfResult<BTreeMap<String, DataFrame>> {
        entities::extract_entities_groups(&self.sources.regions, &self.sources.levels)
    }

    /// The country join, built on first use and shared by the country table, the code map and
    /// the geography mapping.
    fn country(&self) -> DdfResult<&CountryEntities> {
        if let Some(country) = self.country.get() {
            return Ok(country);
        }
        let country = entities::extract_entities_country(
            &self.sources.regions,
            &self.sources.synonyms,
            &self.sources.levels,
            &self.sources.canonical_countries,
        )?;
        Ok(self.country.get_or_init(|| country))
    }

    /// The unified country entity table
    pub fn entities_country(&self) -> DdfResult<CountryEntities> {
        self.country().cloned()
    }

    /// Legacy ISO3 → unified country code
    pub fn country_code_map(&self) -> DdfResult<CountryCodeMap> {
        Ok(self.country()?.codes.clone())
    }

    /// The full concept catalogue
    pub fn concepts(&self) -> DdfResult<DataFrame> {
        concepts::extract_concepts(
            &self.sources.graph_settings,
            &self.sources.synonyms,
            &self.sources.levels,
            &self.sources.discrete_concepts,
            &self.sources.metadata,
        )
    }

    /// Indicator display name → measure concept id
    pub fn concept_index(&self) -> DdfResult<ConceptIndex> {
        let measures = concepts::cleanup_concepts(&self.sources.graph_settings, true)?;
        ConceptIndex::from_df(&measures, COL::CONCEPT_FULL_NAME)
    }

    /// gwid → unified country code
    pub fn geo_mapping(&self) -> DdfResult<GeoCodeMapping> {
        GeoCodeMapping::from_synonyms(&self.sources.synonyms, self.country_code_map()?)
    }

    /// Lazily extract the datapoint tables of all indicator files
    pub fn datapoints<'a>(
        &'a self,
        concepts: &'a ConceptIndex,
        geo: &'a GeoCodeMapping,
    ) -> DatapointExtractor<'a, JsonTableReader> {
        DatapointExtractor::new(
            self.sources.indicator_files.clone(),
            JsonTableReader,
            &self.sources.indicator_names,
            concepts,
            geo,
        )
        .with_policy(self.config.unmapped_geo)
    }
}
