//! Region names and country grouping definitions, the two lookup structures shared by the entity
//! and concept extractors.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{DdfError, DdfResult};
use crate::slug::{to_concept_id, to_concept_id_with, SlugRule};

/// A legacy code as found in the JSON sources, which mix string and integer codes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Text(String),
    Number(i64),
}

impl Code {
    pub fn as_string(&self) -> String {
        match self {
            Code::Text(s) => s.clone(),
            Code::Number(n) => n.to_string(),
        }
    }
}

/// One record of the region list: a single display name mapped to its legacy code.
pub type RegionRecord = BTreeMap<String, Code>;

/// Immutable legacy code → display name table, built by inverting the region list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionNames(HashMap<String, String>);

impl RegionNames {
    pub fn from_records(records: &[RegionRecord]) -> Self {
        let names: HashMap<String, String> = records
            .iter()
            .flat_map(|record| {
                record
                    .iter()
                    .map(|(name, code)| (code.as_string(), name.clone()))
            })
            .collect();
        debug!("Region names table built with {} codes", names.len());
        Self(names)
    }

    /// Display name for a legacy code. An unknown code is a fatal lookup failure.
    pub fn name(&self, code: &str) -> DdfResult<&str> {
        self.0
            .get(code)
            .map(|s| s.as_str())
            .ok_or_else(|| DdfError::RegionNotFound(code.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A grouping definition as supplied: a display name and group code → member codes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    #[serde(alias = "n")]
    pub name: String,
    pub groupings: BTreeMap<String, Vec<Option<Code>>>,
}

/// A grouping level with its concept id and the slug rule its group ids are built with.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupingLevel {
    pub id: String,
    pub name: String,
    pub rule: SlugRule,
    pub groups: BTreeMap<String, Vec<String>>,
}

/// Membership of countries in the groups of one level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Membership {
    /// Member code → group id.
    pub groups: HashMap<String, String>,
    /// Member codes listed under more than one group of the level; the first group is kept.
    pub conflicts: Vec<String>,
}

impl GroupingLevel {
    /// Group id for a group code of this level.
    pub fn group_id(&self, code: &str, regions: &RegionNames) -> DdfResult<String> {
        Ok(to_concept_id_with(regions.name(code)?, self.rule))
    }

    /// Expand the member lists into member code → group id.
    pub fn membership(&self, regions: &RegionNames) -> DdfResult<Membership> {
        let mut membership = Membership::default();
        for (code, members) in self.groups.iter() {
            let group_id = self.group_id(code, regions)?;
            for member in members {
                if let Some(previous) = membership.groups.get(member) {
                    if previous != &group_id {
                        warn!(
                            "'{member}' is in both '{previous}' and '{group_id}' of '{}', keeping '{previous}'",
                            self.id
                        );
                        membership.conflicts.push(member.clone());
                    }
                    continue;
                }
                membership.groups.insert(member.clone(), group_id.clone());
            }
        }
        Ok(membership)
    }
}

/// All grouping levels, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupingLevels(Vec<GroupingLevel>);

impl GroupingLevels {
    /// Build the levels, giving the level at `strict_index` the strict slug rule.
    pub fn new(definitions: Vec<Grouping>, strict_index: Option<usize>) -> Self {
        let levels = definitions
            .into_iter()
            .enumerate()
            .map(|(idx, def)| {
                let rule = if Some(idx) == strict_index {
                    SlugRule::Strict
                } else {
                    SlugRule::Loose
                };
                let groups = def
                    .groupings
                    .into_iter()
                    .map(|(code, members)| {
                        let members = members
                            .iter()
                            .flatten()
                            .map(Code::as_string)
                            .filter(|m| !m.is_empty())
                            .collect();
                        (code, members)
                    })
                    .collect();
                GroupingLevel {
                    id: to_concept_id(&def.name),
                    name: def.name,
                    rule,
                    groups,
                }
            })
            .collect();
        Self(levels)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupingLevel> {
        self.0.iter()
    }

    /// Concept ids of all levels, in input order.
    pub fn ids(&self) -> Vec<String> {
        self.0.iter().map(|level| level.id.clone()).collect()
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

    pub(crate) fn test_regions() -> RegionNames {
        let records: Vec<RegionRecord> = serde_json::from_str(
            r#"[
                {"Asia": "10"}, {"Africa": "11"}, {"Sub-Saharan Africa": 12},
                {"Afghanistan": "i1"}, {"Angola": "i7"}, {"Benin": "i22"}
            ]"#,
        )
        .unwrap();
        RegionNames::from_records(&records)
    }

    pub(crate) fn test_groupings(strict_index: Option<usize>) -> GroupingLevels {
        let definitions: Vec<Grouping> = serde_json::from_str(
            r#"[
                {"n": "Region", "groupings": {"10": ["i1"], "11": ["i7", "i22", ""]}},
                {"n": "Income group", "groupings": {"12": ["i7", "i22", null]}}
            ]"#,
        )
        .unwrap();
        GroupingLevels::new(definitions, strict_index)
    }

    #[test]
    fn test_region_names_are_inverted() {
        let regions = test_regions();
        assert_eq!(regions.len(), 6);
        assert_eq!(regions.name("10").unwrap(), "Asia");
        assert_eq!(regions.name("12").unwrap(), "Sub-Saharan Africa");
    }

    #[test]
    fn test_unknown_region_is_fatal() {
        let regions = test_regions();
        assert!(matches!(
            regions.name("99"),
            Err(DdfError::RegionNotFound(code)) if code == "99"
        ));
    }

    #[test]
    fn test_levels_pick_slug_rules() {
        let levels = test_groupings(Some(1));
        let rules = levels.iter().map(|l| l.rule).collect::<Vec<_>>();
        assert_eq!(rules, vec![SlugRule::Loose, SlugRule::Strict]);
        assert_eq!(levels.ids(), vec!["region", "income_group"]);
    }

    #[test]
    fn test_membership_skips_empty_members() -> anyhow::Result<()> {
        let regions = test_regions();
        let levels = test_groupings(None);
        let region = levels.iter().next().unwrap();
        let membership = region.membership(&regions)?;
        assert_eq!(membership.groups.len(), 3);
        assert_eq!(membership.groups["i1"], "asia");
        assert_eq!(membership.groups["i22"], "africa");
        assert!(membership.conflicts.is_empty());
        Ok(())
    }

    #[test]
    fn test_membership_conflicts_keep_first_group() -> anyhow::Result<()> {
        let regions = test_regions();
        let definitions = vec![Grouping {
            name: "Region".into(),
            groupings: BTreeMap::from([
                ("10".to_string(), vec![Some(Code::Text("i1".into()))]),
                ("11".to_string(), vec![Some(Code::Text("i1".into()))]),
            ]),
        }];
        let levels = GroupingLevels::new(definitions, None);
        let membership = levels.iter().next().unwrap().membership(&regions)?;
        assert_eq!(membership.groups["i1"], "asia");
        assert_eq!(membership.conflicts, vec!["i1"]);
        Ok(())
    }
}
