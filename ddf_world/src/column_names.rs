//! This module stores the column names of the source tables and of the generated DDF tables.
//! Source column names must be kept in sync with the upstream spreadsheets and JSON dumps.

// Country synonyms spreadsheet
pub const SYN_GWID: &str = "Gwid";
pub const SYN_ISO3: &str = "ISO3dig_ext";
pub const SYN_UPPER_NAME: &str = "NAME";
pub const SYN_USE_NAME: &str = "Use Name";
pub const SYN_UPPER_NAME_RENAMED: &str = "Upper Case Name";
pub const SYN_USE_NAME_RENAMED: &str = "Name";

// Indicator graph settings spreadsheet
pub const GS_DDF_ID: &str = "ddf_id";
pub const GS_NAME: &str = "Name";
pub const GS_TOOLTIP: &str = "Tooltip";
pub const GS_MENU_LEVEL1: &str = "Menu level1";
pub const GS_MENU_LEVEL2: &str = "Menu level 2";
pub const GS_INDICATOR_URL: &str = "Indicator url";
pub const GS_SCALE: &str = "Scale";
pub const GS_DDF_NAME: &str = "ddf_name";
pub const GS_DDF_UNIT: &str = "ddf_unit";
pub const GS_INTERPOLATION: &str = "Interpolation";

// Hashed indicator key lookup
pub const IND_HASH: &str = "-t-ind";
pub const IND_NAME: &str = "-t-name";

// Canonical (systema globalis) country entities and discrete concepts
pub const SG_GEO: &str = "geo";
pub const SG_NAME: &str = "name";
pub const SG_CONTINENT: &str = "world_4region";
pub const SG_LATITUDE: &str = "latitude";
pub const SG_LONGITUDE: &str = "longitude";
pub const SG_CONCEPT: &str = "concept";

// Generated tables
pub const GEO: &str = "geo";
pub const TIME: &str = "time";
pub const GWID: &str = "gwid";
pub const NAME: &str = "name";
pub const COUNTRY: &str = "country";
pub const COUNTRY_OLD: &str = "country_2";

pub const CONCEPT: &str = "concept";
pub const CONCEPT_FULL_NAME: &str = "full_name";
pub const CONCEPT_TYPE: &str = "concept_type";
pub const CONCEPT_DESCRIPTION: &str = "description";
pub const CONCEPT_MENU_LEVEL1: &str = "menu_level1";
pub const CONCEPT_MENU_LEVEL2: &str = "menu_level_2";
pub const CONCEPT_INDICATOR_URL: &str = "indicator_url";
pub const CONCEPT_SCALE: &str = "scale";
pub const CONCEPT_UNIT: &str = "unit";
pub const CONCEPT_INTERPOLATION: &str = "interpolation";
pub const CONCEPT_DRILL_UP: &str = "drill_up";
pub const CONCEPT_DOMAIN: &str = "domain";
pub const CONCEPT_SCALES: &str = "scales";

/// Name of the boolean membership column of an entity set, e.g. `is--country`.
pub fn is_member(entity_set: &str) -> String {
    format!("is--{entity_set}")
}
