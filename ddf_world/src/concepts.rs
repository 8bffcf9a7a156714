//! The concept catalogue: structural concepts, measures from the indicator spreadsheet and the
//! supplementary measures described only by the indicator document.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::{debug, info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::entities::synonyms_concepts;
use crate::error::{DdfError, DdfResult};
use crate::metadata::IndicatorMetadata;
use crate::regions::GroupingLevels;
use crate::slug::to_concept_id;
use crate::table::{optional_string_values, string_values};
use crate::COL;

/// Placeholder row of the indicator spreadsheet separating menu sections.
pub const PLACEHOLDER: &str = "———————————————————————";

/// Measures that are not in the indicator spreadsheet. Their metadata key is the id without
/// `SUPPLEMENTARY_PREFIX`.
pub const SUPPLEMENTARY_MEASURES: [&str; 3] = [
    "sg_gini",
    "sg_population",
    "sg_gdp_p_cap_const_ppp2011_dollar",
];
pub const SUPPLEMENTARY_PREFIX: &str = "sg_";

/// Column order of the concept catalogue.
pub const CATALOGUE_COLUMNS: [&str; 11] = [
    COL::CONCEPT,
    COL::NAME,
    COL::CONCEPT_TYPE,
    COL::CONCEPT_DESCRIPTION,
    COL::CONCEPT_INDICATOR_URL,
    COL::CONCEPT_SCALE,
    COL::CONCEPT_UNIT,
    COL::CONCEPT_INTERPOLATION,
    COL::CONCEPT_DRILL_UP,
    COL::CONCEPT_DOMAIN,
    COL::CONCEPT_SCALES,
];

/// Indicator spreadsheet headers and the columns they become.
const MEASURE_COLUMNS: [(&str, &str); 10] = [
    (COL::GS_DDF_ID, COL::CONCEPT),
    (COL::GS_NAME, COL::CONCEPT_FULL_NAME),
    (COL::GS_TOOLTIP, COL::CONCEPT_DESCRIPTION),
    (COL::GS_MENU_LEVEL1, COL::CONCEPT_MENU_LEVEL1),
    (COL::GS_MENU_LEVEL2, COL::CONCEPT_MENU_LEVEL2),
    (COL::GS_INDICATOR_URL, COL::CONCEPT_INDICATOR_URL),
    (COL::GS_SCALE, COL::CONCEPT_SCALE),
    (COL::GS_DDF_NAME, COL::NAME),
    (COL::GS_DDF_UNIT, COL::CONCEPT_UNIT),
    (COL::GS_INTERPOLATION, COL::CONCEPT_INTERPOLATION),
];

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    #[default]
    String,
    Measure,
    Time,
    EntityDomain,
    EntitySet,
}

/// One row of the concept catalogue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Concept {
    pub concept: String,
    pub name: Option<String>,
    pub concept_type: ConceptType,
    pub description: Option<String>,
    pub indicator_url: Option<String>,
    pub scale: Option<String>,
    pub unit: Option<String>,
    pub interpolation: Option<String>,
    pub drill_up: Option<Vec<String>>,
    pub domain: Option<String>,
    pub scales: Option<Vec<String>>,
}

impl Concept {
    pub fn new(concept: &str, name: &str, concept_type: ConceptType) -> Self {
        Self {
            concept: concept.to_string(),
            name: Some(name.to_string()),
            concept_type,
            ..Default::default()
        }
    }
}

/// Scale preference list: the recorded scale hint first.
pub fn preferred_scales(scale: Option<&str>) -> Vec<String> {
    match scale {
        Some("log") => vec!["log".into(), "linear".into()],
        _ => vec!["linear".into(), "log".into()],
    }
}

/// Fields a structural concept gets beyond the default `string` type.
struct StructuralRule {
    concept: &'static str,
    concept_type: ConceptType,
    domain: Option<&'static str>,
    unit: Option<&'static str>,
    scale: Option<&'static str>,
}

const fn rule(
    concept: &'static str,
    concept_type: ConceptType,
    domain: Option<&'static str>,
) -> StructuralRule {
    StructuralRule {
        concept,
        concept_type,
        domain,
        unit: None,
        scale: None,
    }
}

const STRUCTURAL_RULES: [StructuralRule; 8] = [
    rule("geo", ConceptType::EntityDomain, None),
    rule("country", ConceptType::EntitySet, Some("geo")),
    rule("time", ConceptType::Time, Some("year")),
    rule(COL::SG_CONTINENT, ConceptType::EntitySet, Some("geo")),
    StructuralRule {
        concept: "latitude",
        concept_type: ConceptType::Measure,
        domain: None,
        unit: Some("degrees"),
        scale: Some("lat"),
    },
    StructuralRule {
        concept: "longitude",
        concept_type: ConceptType::Measure,
        domain: None,
        unit: Some("degrees"),
        scale: Some("long"),
    },
    rule("year", ConceptType::Time, Some("time")),
    rule("global", ConceptType::EntitySet, Some("geo")),
];

/// Structural concepts: grouping levels, the geo domain and its entity sets, time, the
/// spreadsheet's descriptive columns and coordinates.
pub fn structural_concepts(
    synonyms: &DataFrame,
    levels: &GroupingLevels,
    discrete: &DataFrame,
) -> DdfResult<Vec<Concept>> {
    let continent_name = continent_name(discrete)?;
    let fixed_head = [
        ("geo", "Geo"),
        ("country", "Country"),
        ("time", "Time"),
        ("name", "Name"),
        ("gwid", "Gwid"),
        ("name_short", "Name Short"),
        ("name_long", "Name Long"),
        ("description", "Description"),
    ];
    let fixed_tail = [
        ("indicator_url", "Indicator Url"),
        ("scales", "Scales"),
        ("unit", "Unit"),
        ("interpolation", "Interpolation"),
        (COL::SG_CONTINENT, continent_name.as_str()),
        ("latitude", "Latitude"),
        ("longitude", "Longitude"),
        ("year", "Year"),
        ("global", "World"),
    ];
    let spreadsheet = synonyms_concepts(synonyms);

    let mut seen = HashSet::new();
    let mut concepts = vec![];
    let entries = levels
        .iter()
        .map(|level| (level.id.as_str(), level.name.as_str()))
        .chain(fixed_head)
        .chain(spreadsheet.iter().map(|(id, name)| (id.as_str(), name.as_str())))
        .chain(fixed_tail);
    for (id, name) in entries {
        if !seen.insert(id.to_string()) {
            debug!("Structural concept '{id}' ('{name}') already listed");
            continue;
        }
        let mut concept = Concept::new(id, name, ConceptType::String);
        if let Some(rule) = STRUCTURAL_RULES.iter().find(|r| r.concept == id) {
            concept.concept_type = rule.concept_type;
            concept.domain = rule.domain.map(str::to_string);
            concept.unit = rule.unit.map(str::to_string);
            concept.scale = rule.scale.map(str::to_string);
        }
        concepts.push(concept);
    }

    // Grouping levels are entity sets of geo, and the country set drills up into all of them
    let level_ids = levels.ids();
    for concept in concepts.iter_mut() {
        if level_ids.contains(&concept.concept) {
            concept.concept_type = ConceptType::EntitySet;
            concept.domain = Some("geo".into());
        } else if concept.concept == "country" {
            concept.drill_up = Some(level_ids.clone());
        }
    }
    Ok(concepts)
}

fn continent_name(discrete: &DataFrame) -> DdfResult<String> {
    let ids = string_values(discrete, "discrete concepts", COL::SG_CONCEPT)?;
    let names = string_values(discrete, "discrete concepts", COL::NAME)?;
    ids.into_iter()
        .zip(names)
        .find_map(|(id, name)| (id.as_deref() == Some(COL::SG_CONTINENT)).then_some(name))
        .flatten()
        .ok_or_else(|| {
            DdfError::InvalidSource(format!(
                "discrete concepts have no name for '{}'",
                COL::SG_CONTINENT
            ))
        })
}

/// Normalise the indicator spreadsheet into the measure concept table, optionally dropping the
/// placeholder row.
///
/// Headers are matched after slugifying, so e.g. `Menu level1` and `menu_level1` both work. The
/// `ddf_id` and `Name` columns are required; other missing columns are null.
pub fn cleanup_concepts(graph_settings: &DataFrame, drop_placeholder: bool) -> DdfResult<DataFrame> {
    let headers: HashMap<String, &str> = graph_settings
        .get_column_names()
        .into_iter()
        .map(|c| (to_concept_id(c), c))
        .collect();
    let mut columns = vec![];
    for (source, target) in MEASURE_COLUMNS {
        let values = match headers.get(&to_concept_id(source)) {
            Some(header) => string_values(graph_settings, "indicator settings", header)?,
            None if source == COL::GS_DDF_ID || source == COL::GS_NAME => {
                return Err(DdfError::MissingColumn {
                    table: "indicator settings".into(),
                    column: source.into(),
                })
            }
            None => vec![None; graph_settings.height()],
        };
        columns.push(Series::new(target, values));
    }
    columns.push(Series::new(
        COL::CONCEPT_TYPE,
        vec![ConceptType::Measure.as_ref(); graph_settings.height()],
    ));
    let df = DataFrame::new(columns)?;
    if !drop_placeholder {
        return Ok(df);
    }

    let ids = string_values(&df, "indicator settings", COL::CONCEPT)?;
    let full_names = string_values(&df, "indicator settings", COL::CONCEPT_FULL_NAME)?;
    let keep = ids
        .iter()
        .zip(full_names.iter())
        .map(|(id, name)| id.as_deref() != Some(PLACEHOLDER) && name.as_deref() != Some(PLACEHOLDER))
        .collect_vec();
    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped == 0 {
        debug!("No placeholder row in indicator settings");
        return Ok(df);
    }
    debug!("Dropping {dropped} placeholder row(s)");
    Ok(df.filter(&BooleanChunked::from_slice("keep", &keep))?)
}

/// Measure concepts from a cleaned indicator table. Rows without an id are skipped.
pub fn measure_concepts(cleaned: &DataFrame) -> DdfResult<Vec<Concept>> {
    let table = "measure concepts";
    let ids = string_values(cleaned, table, COL::CONCEPT)?;
    let names = optional_string_values(cleaned, COL::NAME)?;
    let descriptions = optional_string_values(cleaned, COL::CONCEPT_DESCRIPTION)?;
    let urls = optional_string_values(cleaned, COL::CONCEPT_INDICATOR_URL)?;
    let scales = optional_string_values(cleaned, COL::CONCEPT_SCALE)?;
    let units = optional_string_values(cleaned, COL::CONCEPT_UNIT)?;
    let interpolations = optional_string_values(cleaned, COL::CONCEPT_INTERPOLATION)?;

    let mut concepts = vec![];
    for (idx, id) in ids.into_iter().enumerate() {
        let Some(id) = id else {
            warn!("Skipping indicator row {idx} without a concept id");
            continue;
        };
        concepts.push(Concept {
            concept: id,
            name: names[idx].clone(),
            concept_type: ConceptType::Measure,
            description: descriptions[idx].clone(),
            indicator_url: urls[idx].clone(),
            scale: scales[idx].clone(),
            unit: units[idx].clone(),
            interpolation: interpolations[idx].clone(),
            drill_up: None,
            domain: None,
            scales: Some(preferred_scales(scales[idx].as_deref())),
        });
    }
    Ok(concepts)
}

/// Measures sourced outside the indicator spreadsheet. A missing metadata entry is fatal.
pub fn supplementary_concepts(metadata: &IndicatorMetadata) -> DdfResult<Vec<Concept>> {
    SUPPLEMENTARY_MEASURES
        .iter()
        .copied()
        .map(|id| {
            let key = id.strip_prefix(SUPPLEMENTARY_PREFIX).unwrap_or(id);
            let info = metadata.get(key)?;
            Ok(Concept {
                indicator_url: info.source_link.clone(),
                scales: Some(info.scales.clone()),
                ..Concept::new(id, id, ConceptType::Measure)
            })
        })
        .collect()
}

/// Build the full concept catalogue from the raw indicator spreadsheet.
///
/// Concept ids must be unique across the three segments; a collision is an error.
pub fn extract_concepts(
    graph_settings: &DataFrame,
    synonyms: &DataFrame,
    levels: &GroupingLevels,
    discrete: &DataFrame,
    metadata: &IndicatorMetadata,
) -> DdfResult<DataFrame> {
    let structural = structural_concepts(synonyms, levels, discrete)?;
    let measures = measure_concepts(&cleanup_concepts(graph_settings, true)?)?;
    let supplementary = supplementary_concepts(metadata)?;
    debug!(
        "Concepts: {} structural, {} measures, {} supplementary",
        structural.len(),
        measures.len(),
        supplementary.len()
    );

    let all = structural
        .into_iter()
        .chain(measures)
        .chain(supplementary)
        .collect_vec();
    let mut seen = HashSet::new();
    for concept in all.iter() {
        if !seen.insert(concept.concept.as_str()) {
            return Err(DdfError::DuplicateConcept(concept.concept.clone()));
        }
    }
    let df = concepts_to_df(&all)?;
    info!("Concept catalogue with shape: {:?}", df.shape());
    Ok(df)
}

fn list_to_json(list: &Option<Vec<String>>) -> DdfResult<Option<String>> {
    Ok(match list {
        Some(list) => Some(serde_json::to_string(list)?),
        None => None,
    })
}

fn text_column<'a>(
    concepts: &'a [Concept],
    name: &str,
    field: impl Fn(&'a Concept) -> Option<&'a str>,
) -> Series {
    Series::new(name, concepts.iter().map(field).collect_vec())
}

/// Lay out concepts as the catalogue table. List fields are written as JSON arrays.
pub fn concepts_to_df(concepts: &[Concept]) -> DdfResult<DataFrame> {
    let drill_up = concepts
        .iter()
        .map(|c| list_to_json(&c.drill_up))
        .collect::<DdfResult<Vec<_>>>()?;
    let scales = concepts
        .iter()
        .map(|c| list_to_json(&c.scales))
        .collect::<DdfResult<Vec<_>>>()?;
    Ok(DataFrame::new(vec![
        text_column(concepts, COL::CONCEPT, |c| Some(c.concept.as_str())),
        text_column(concepts, COL::NAME, |c| c.name.as_deref()),
        text_column(concepts, COL::CONCEPT_TYPE, |c| Some(c.concept_type.as_ref())),
        text_column(concepts, COL::CONCEPT_DESCRIPTION, |c| c.description.as_deref()),
        text_column(concepts, COL::CONCEPT_INDICATOR_URL, |c| c.indicator_url.as_deref()),
        text_column(concepts, COL::CONCEPT_SCALE, |c| c.scale.as_deref()),
        text_column(concepts, COL::CONCEPT_UNIT, |c| c.unit.as_deref()),
        text_column(concepts, COL::CONCEPT_INTERPOLATION, |c| c.interpolation.as_deref()),
        Series::new(COL::CONCEPT_DRILL_UP, drill_up),
        text_column(concepts, COL::CONCEPT_DOMAIN, |c| c.domain.as_deref()),
        Series::new(COL::CONCEPT_SCALES, scales),
    ])?)
}

/// Indicator display name → concept id, for resolving datapoint files.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConceptIndex(HashMap<String, String>);

impl ConceptIndex {
    /// Build from any concept table, matching on `name_column` (exact, case sensitive).
    pub fn from_df(df: &DataFrame, name_column: &str) -> DdfResult<Self> {
        let ids = string_values(df, "concepts", COL::CONCEPT)?;
        let names = string_values(df, "concepts", name_column)?;
        let mut index = HashMap::new();
        for (id, name) in ids.into_iter().zip(names) {
            if let (Some(id), Some(name)) = (id, name) {
                index.entry(name).or_insert(id);
            }
        }
        Ok(Self(index))
    }

    pub fn concept(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::tests::test_synonyms;
    use crate::metadata::IndicatorInfo;
    use crate::regions::tests::test_groupings;

    pub(crate) fn test_graph_settings() -> DataFrame {
        df!(
            COL::GS_NAME => &["Total population", PLACEHOLDER, "Income per person"],
            COL::GS_TOOLTIP => &[Some("People"), None, Some("GDP per capita")],
            COL::GS_MENU_LEVEL1 => &["Population", "", "Economy"],
            COL::GS_MENU_LEVEL2 => &["", "", "Incomes"],
            "Indicator url" => &["https://example.org/pop", "", "https://example.org/gdp"],
            COL::GS_SCALE => &[Some("log"), None, Some("linear")],
            COL::GS_DDF_ID => &["population_total", PLACEHOLDER, "income_per_person"],
            COL::GS_DDF_NAME => &["Population", "", "Income"],
            COL::GS_DDF_UNIT => &["people", "", "dollars"],
            COL::GS_INTERPOLATION => &["linear", "", "exp"],
            "Download" => &["yes", "", "yes"]
        )
        .unwrap()
    }

    pub(crate) fn test_discrete() -> DataFrame {
        df!(
            COL::SG_CONCEPT => &["world_6region", "world_4region"],
            COL::NAME => &["World 6 regions", "World 4 regions"]
        )
        .unwrap()
    }

    pub(crate) fn test_metadata() -> IndicatorMetadata {
        let info = |link: &str, scales: [&str; 2]| IndicatorInfo {
            source_link: Some(link.into()),
            scales: scales.iter().map(|s| s.to_string()).collect(),
        };
        IndicatorMetadata {
            indicators: HashMap::from([
                ("gini".to_string(), info("https://example.org/gini", ["linear", "log"])),
                ("population".to_string(), info("https://example.org/sg_pop", ["log", "linear"])),
                (
                    "gdp_p_cap_const_ppp2011_dollar".to_string(),
                    info("https://example.org/sg_gdp", ["log", "linear"]),
                ),
            ]),
        }
    }

    fn by_id<'a>(concepts: &'a [Concept], id: &str) -> &'a Concept {
        concepts.iter().find(|c| c.concept == id).unwrap()
    }

    #[test]
    fn test_preferred_scales() {
        assert_eq!(preferred_scales(Some("log")), vec!["log", "linear"]);
        assert_eq!(preferred_scales(Some("linear")), vec!["linear", "log"]);
        assert_eq!(preferred_scales(None), vec!["linear", "log"]);
    }

    #[test]
    fn test_cleanup_concepts() -> anyhow::Result<()> {
        let cleaned = cleanup_concepts(&test_graph_settings(), false)?;
        assert_eq!(
            cleaned.get_column_names(),
            vec![
                "concept",
                "full_name",
                "description",
                "menu_level1",
                "menu_level_2",
                "indicator_url",
                "scale",
                "name",
                "unit",
                "interpolation",
                "concept_type"
            ]
        );
        assert_eq!(cleaned.height(), 3);
        let cleaned = cleanup_concepts(&test_graph_settings(), true)?;
        assert_eq!(cleaned.height(), 2);
        Ok(())
    }

    #[test]
    fn test_cleanup_without_placeholder_is_noop() -> anyhow::Result<()> {
        let settings = test_graph_settings().slice(0, 1);
        assert_eq!(cleanup_concepts(&settings, true)?.height(), 1);
        Ok(())
    }

    #[test]
    fn test_cleanup_requires_id() {
        let settings = test_graph_settings().drop(COL::GS_DDF_ID).unwrap();
        assert!(matches!(
            cleanup_concepts(&settings, true),
            Err(DdfError::MissingColumn { column, .. }) if column == COL::GS_DDF_ID
        ));
    }

    #[test]
    fn test_measure_concepts() -> anyhow::Result<()> {
        let measures = measure_concepts(&cleanup_concepts(&test_graph_settings(), true)?)?;
        assert_eq!(measures.len(), 2);
        let population = by_id(&measures, "population_total");
        assert_eq!(population.name.as_deref(), Some("Population"));
        assert_eq!(population.concept_type, ConceptType::Measure);
        assert_eq!(population.scales, Some(vec!["log".into(), "linear".into()]));
        let income = by_id(&measures, "income_per_person");
        assert_eq!(income.scales, Some(vec!["linear".into(), "log".into()]));
        assert_eq!(income.unit.as_deref(), Some("dollars"));
        Ok(())
    }

    #[test]
    fn test_structural_concepts() -> anyhow::Result<()> {
        let levels = test_groupings(None);
        let concepts = structural_concepts(&test_synonyms(), &levels, &test_discrete())?;
        let ids = concepts.iter().map(|c| c.concept.as_str()).collect_vec();
        assert_eq!(
            ids,
            vec![
                "region",
                "income_group",
                "geo",
                "country",
                "time",
                "name",
                "gwid",
                "name_short",
                "name_long",
                "description",
                "upper_case_name",
                "indicator_url",
                "scales",
                "unit",
                "interpolation",
                "world_4region",
                "latitude",
                "longitude",
                "year",
                "global"
            ]
        );
        let region = by_id(&concepts, "region");
        assert_eq!(region.concept_type, ConceptType::EntitySet);
        assert_eq!(region.domain.as_deref(), Some("geo"));
        let country = by_id(&concepts, "country");
        assert_eq!(
            country.drill_up,
            Some(vec!["region".to_string(), "income_group".to_string()])
        );
        assert_eq!(by_id(&concepts, "geo").concept_type, ConceptType::EntityDomain);
        assert_eq!(by_id(&concepts, "time").domain.as_deref(), Some("year"));
        assert_eq!(by_id(&concepts, "year").domain.as_deref(), Some("time"));
        let continent = by_id(&concepts, "world_4region");
        assert_eq!(continent.name.as_deref(), Some("World 4 regions"));
        assert_eq!(continent.concept_type, ConceptType::EntitySet);
        let latitude = by_id(&concepts, "latitude");
        assert_eq!(latitude.concept_type, ConceptType::Measure);
        assert_eq!(latitude.unit.as_deref(), Some("degrees"));
        assert_eq!(latitude.scale.as_deref(), Some("lat"));
        assert_eq!(by_id(&concepts, "longitude").scale.as_deref(), Some("long"));
        assert_eq!(by_id(&concepts, "global").name.as_deref(), Some("World"));
        assert_eq!(by_id(&concepts, "name_short").concept_type, ConceptType::String);
        // Only the country concept drills up, only nested concepts have a domain
        for concept in concepts.iter() {
            if concept.concept != "country" {
                assert_eq!(concept.drill_up, None);
            }
            if concept.concept_type == ConceptType::String {
                assert_eq!(concept.domain, None);
            }
        }
        Ok(())
    }

    #[test]
    fn test_missing_continent_name_is_fatal() {
        let discrete = df!(COL::SG_CONCEPT => &["world_6region"], COL::NAME => &["x"]).unwrap();
        let res = structural_concepts(&test_synonyms(), &test_groupings(None), &discrete);
        assert!(matches!(res, Err(DdfError::InvalidSource(_))));
    }

    #[test]
    fn test_supplementary_concepts() -> anyhow::Result<()> {
        let concepts = supplementary_concepts(&test_metadata())?;
        assert_eq!(concepts.len(), 3);
        let gini = by_id(&concepts, "sg_gini");
        assert_eq!(gini.name.as_deref(), Some("sg_gini"));
        assert_eq!(gini.indicator_url.as_deref(), Some("https://example.org/gini"));
        assert_eq!(gini.scales, Some(vec!["linear".into(), "log".into()]));
        let mut metadata = test_metadata();
        metadata.indicators.remove("population");
        assert!(matches!(
            supplementary_concepts(&metadata),
            Err(DdfError::MetadataNotFound(key)) if key == "population"
        ));
        Ok(())
    }

    #[test]
    fn test_extract_concepts() -> anyhow::Result<()> {
        let df = extract_concepts(
            &test_graph_settings(),
            &test_synonyms(),
            &test_groupings(None),
            &test_discrete(),
            &test_metadata(),
        )?;
        assert_eq!(df.get_column_names(), CATALOGUE_COLUMNS.to_vec());
        assert_eq!(df.height(), 20 + 2 + 3);
        let ids = string_values(&df, "concepts", COL::CONCEPT)?;
        assert_eq!(ids.iter().unique().count(), ids.len());
        assert!(!ids.contains(&Some(PLACEHOLDER.to_string())));

        let index = ConceptIndex::from_df(&df, COL::CONCEPT)?;
        assert_eq!(index.len(), df.height());
        let country = df
            .clone()
            .lazy()
            .filter(col(COL::CONCEPT).eq(lit("country")))
            .collect()?;
        assert_eq!(
            string_values(&country, "concepts", COL::CONCEPT_DRILL_UP)?,
            vec![Some(r#"["region","income_group"]"#.to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_concepts_are_fatal() {
        let settings = test_graph_settings()
            .lazy()
            .with_column(
                when(col(COL::GS_DDF_ID).eq(lit("income_per_person")))
                    .then(lit("latitude"))
                    .otherwise(col(COL::GS_DDF_ID))
                    .alias(COL::GS_DDF_ID),
            )
            .collect()
            .unwrap();
        let res = extract_concepts(
            &settings,
            &test_synonyms(),
            &test_groupings(None),
            &test_discrete(),
            &test_metadata(),
        );
        assert!(matches!(res, Err(DdfError::DuplicateConcept(id)) if id == "latitude"));
    }

    #[test]
    fn test_concept_index_resolves_full_names() -> anyhow::Result<()> {
        let cleaned = cleanup_concepts(&test_graph_settings(), true)?;
        let index = ConceptIndex::from_df(&cleaned, COL::CONCEPT_FULL_NAME)?;
        assert_eq!(index.concept("Total population"), Some("population_total"));
        assert_eq!(index.concept("total population"), None);
        Ok(())
    }
}
