//! Entity extraction: one table per grouping level and the unified country table.

use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;
use log::{debug, info, warn};
use polars::prelude::*;

use crate::codes::CountryCodeMap;
use crate::error::DdfResult;
use crate::regions::{GroupingLevels, RegionNames};
use crate::slug::{to_concept_id, SlugRule};
use crate::table::string_values;
use crate::COL;

const SYNONYMS: &str = "country synonyms";
const CANONICAL: &str = "canonical countries";

/// Build the entity table of every grouping level, keyed by the level's concept id.
///
/// Each row is one group of the level with columns `{<level>, name, gwid, is--<level>}`. Levels
/// slugified with the strict rule leave `name` empty. A group code missing from `regions` aborts
/// the extraction.
pub fn extract_entities_groups(
    regions: &RegionNames,
    levels: &GroupingLevels,
) -> DdfResult<BTreeMap<String, DataFrame>> {
    let mut res = BTreeMap::new();
    for level in levels.iter() {
        let codes = level.groups.keys().map(|c| c.as_str()).collect_vec();
        let ids = codes
            .iter()
            .map(|code| level.group_id(code, regions))
            .collect::<DdfResult<Vec<_>>>()?;
        let names: Vec<Option<&str>> = match level.rule {
            SlugRule::Strict => vec![None; codes.len()],
            _ => codes
                .iter()
                .map(|code| regions.name(code).map(Some))
                .collect::<DdfResult<_>>()?,
        };
        let df = DataFrame::new(vec![
            Series::new(&level.id, ids),
            Series::new(COL::NAME, names),
            Series::new(COL::GWID, &codes),
            Series::new(&COL::is_member(&level.id), vec!["TRUE"; codes.len()]),
        ])?;
        debug!("Entity set '{}' has {} groups", level.id, df.height());
        res.insert(level.id.clone(), df);
    }
    Ok(res)
}

/// Join coverage problems found while building the country table. None of these abort the
/// extraction; they surface here and in the log instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoinGaps {
    /// Spreadsheet country names without a row in the canonical country table.
    pub unmatched_countries: Vec<String>,
    /// Canonical country names that no spreadsheet row matched.
    pub unused_canonical: Vec<String>,
    /// `(level, member code)` pairs listed under more than one group of a level.
    pub membership_conflicts: Vec<(String, String)>,
}

impl JoinGaps {
    pub fn is_empty(&self) -> bool {
        self.unmatched_countries.is_empty()
            && self.unused_canonical.is_empty()
            && self.membership_conflicts.is_empty()
    }

    fn log(&self) {
        if !self.unmatched_countries.is_empty() {
            warn!(
                "{} countries have no canonical match: {:?}",
                self.unmatched_countries.len(),
                self.unmatched_countries
            );
        }
        if !self.unused_canonical.is_empty() {
            warn!(
                "{} canonical countries were not matched: {:?}",
                self.unused_canonical.len(),
                self.unused_canonical
            );
        }
    }
}

/// The unified country entity table along with the gaps found building it.
#[derive(Clone, Debug)]
pub struct CountryEntities {
    pub table: DataFrame,
    pub gaps: JoinGaps,
    /// The mapping-mode output of the same join.
    pub codes: CountryCodeMap,
}

/// Build the country entity table.
///
/// Columns are `country, gwid, name` followed by one membership column per grouping level, the
/// remaining spreadsheet columns, `is--country`, the continent classification, `latitude` and
/// `longitude`. Canonical fields are matched on the exact display name; misses are reported in
/// `JoinGaps` and left null.
pub fn extract_entities_country(
    regions: &RegionNames,
    synonyms: &DataFrame,
    levels: &GroupingLevels,
    canonical: &DataFrame,
) -> DdfResult<CountryEntities> {
    let (df, gaps) = country_frame(regions, synonyms, levels, canonical)?;
    gaps.log();
    let codes = code_map_from_frame(&df)?;
    let leading = [COL::COUNTRY, COL::GWID, COL::NAME];
    let order = leading
        .into_iter()
        .chain(
            df.get_column_names()
                .into_iter()
                .filter(|c| !leading.contains(c) && *c != COL::COUNTRY_OLD),
        )
        .map(str::to_string)
        .collect_vec();
    let table = df.select(order)?;
    info!("Country entities table with shape: {:?}", table.shape());
    Ok(CountryEntities { table, gaps, codes })
}

/// Build the legacy ISO3 → unified country code mapping from the same join as the country table.
pub fn extract_country_code_map(
    regions: &RegionNames,
    synonyms: &DataFrame,
    levels: &GroupingLevels,
    canonical: &DataFrame,
) -> DdfResult<CountryCodeMap> {
    let (df, _) = country_frame(regions, synonyms, levels, canonical)?;
    code_map_from_frame(&df)
}

fn code_map_from_frame(df: &DataFrame) -> DdfResult<CountryCodeMap> {
    let old = string_values(df, SYNONYMS, COL::COUNTRY_OLD)?;
    let new = string_values(df, CANONICAL, COL::COUNTRY)?;
    let mut codes = HashMap::new();
    for (old, new) in old.into_iter().zip(new) {
        match (old, new) {
            (Some(old), Some(new)) => {
                codes.entry(old).or_insert(new);
            }
            (Some(old), None) => debug!("No unified code for legacy code '{old}'"),
            _ => {}
        }
    }
    info!("Country code map with {} entries", codes.len());
    Ok(CountryCodeMap::new(codes))
}

/// Rename the spreadsheet headers the way the output expects before slugifying them.
fn synonyms_column_id(column: &str) -> String {
    match column {
        COL::SYN_UPPER_NAME => to_concept_id(COL::SYN_UPPER_NAME_RENAMED),
        COL::SYN_USE_NAME => to_concept_id(COL::SYN_USE_NAME_RENAMED),
        other => to_concept_id(other),
    }
}

/// Spreadsheet columns that become plain string concepts (every column except the display name
/// and the legacy ISO3 code), as `(concept id, header)` after the header renames.
pub fn synonyms_concepts(synonyms: &DataFrame) -> Vec<(String, String)> {
    synonyms
        .get_column_names()
        .into_iter()
        .filter(|c| *c != COL::SYN_USE_NAME && *c != COL::SYN_ISO3)
        .map(|c| {
            let header = match c {
                COL::SYN_UPPER_NAME => COL::SYN_UPPER_NAME_RENAMED,
                other => other,
            };
            (to_concept_id(header), header.to_string())
        })
        .collect()
}

fn country_frame(
    regions: &RegionNames,
    synonyms: &DataFrame,
    levels: &GroupingLevels,
    canonical: &DataFrame,
) -> DdfResult<(DataFrame, JoinGaps)> {
    let gwids = string_values(synonyms, SYNONYMS, COL::SYN_GWID)?;
    let height = gwids.len();
    let mut gaps = JoinGaps::default();
    let mut columns = vec![
        Series::new(COL::GWID, &gwids),
        Series::new(COL::COUNTRY_OLD, string_values(synonyms, SYNONYMS, COL::SYN_ISO3)?),
    ];
    let mut used: HashSet<String> = HashSet::from([COL::GWID.into(), COL::COUNTRY_OLD.into()]);

    for level in levels.iter() {
        let membership = level.membership(regions)?;
        let values = gwids
            .iter()
            .map(|gwid| {
                gwid.as_ref()
                    .and_then(|gwid| membership.groups.get(gwid).cloned())
            })
            .collect_vec();
        gaps.membership_conflicts.extend(
            membership
                .conflicts
                .into_iter()
                .map(|code| (level.id.clone(), code)),
        );
        used.insert(level.id.clone());
        columns.push(Series::new(&level.id, values));
    }

    for column in synonyms.get_column_names() {
        if column == COL::SYN_GWID || column == COL::SYN_ISO3 {
            continue;
        }
        let id = synonyms_column_id(column);
        if !used.insert(id.clone()) {
            warn!("Skipping spreadsheet column '{column}': '{id}' is already a column");
            continue;
        }
        let series = synonyms.column(column)?.cast(&DataType::String)?;
        columns.push(series.with_name(&id));
    }
    columns.push(Series::new(
        &COL::is_member(COL::COUNTRY),
        vec!["TRUE"; height],
    ));

    let names = string_values(synonyms, SYNONYMS, COL::SYN_USE_NAME)?;
    columns.extend(canonical_columns(&names, canonical, &mut gaps)?);
    Ok((DataFrame::new(columns)?, gaps))
}

/// Look up the canonical country fields for every spreadsheet name.
fn canonical_columns(
    names: &[Option<String>],
    canonical: &DataFrame,
    gaps: &mut JoinGaps,
) -> DdfResult<Vec<Series>> {
    let canonical_names = string_values(canonical, CANONICAL, COL::SG_NAME)?;
    let fields = [
        (COL::SG_GEO, COL::COUNTRY),
        (COL::SG_CONTINENT, COL::SG_CONTINENT),
        (COL::SG_LATITUDE, COL::SG_LATITUDE),
        (COL::SG_LONGITUDE, COL::SG_LONGITUDE),
    ]
    .into_iter()
    .map(|(source, target)| Ok((target, string_values(canonical, CANONICAL, source)?)))
    .collect::<DdfResult<Vec<_>>>()?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in canonical_names.iter().enumerate() {
        if let Some(name) = name {
            index.entry(name.as_str()).or_insert(idx);
        }
    }

    let mut matched: HashSet<usize> = HashSet::new();
    let rows = names
        .iter()
        .map(|name| {
            let row = name.as_deref().and_then(|n| index.get(n).copied());
            match (name, row) {
                (Some(_), Some(row)) => {
                    matched.insert(row);
                }
                (Some(name), None) => gaps.unmatched_countries.push(name.clone()),
                (None, _) => {}
            }
            row
        })
        .collect_vec();
    gaps.unused_canonical = canonical_names
        .iter()
        .enumerate()
        .filter(|(idx, _)| !matched.contains(idx))
        .filter_map(|(_, name)| name.clone())
        .collect();

    Ok(fields
        .into_iter()
        .map(|(target, values)| {
            let joined = rows
                .iter()
                .map(|row| row.and_then(|row| values[row].clone()))
                .collect_vec();
            Series::new(target, joined)
        })
        .collect())
}
