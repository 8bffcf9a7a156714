use std::path::PathBuf;

use comfy_table::{presets::NOTHING, *};
use ddf_world::entities::JoinGaps;
use itertools::Itertools;

/// A DDF file written by a command, with its table shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    pub shape: (usize, usize),
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .into_iter()
                .map(|name| Cell::new(name).add_attribute(Attribute::Bold)),
        )
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

pub fn summary_table(written: &[Written]) -> Table {
    let mut table = new_table(vec!["File", "Rows", "Columns"]);
    for Written { path, shape } in written {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        table.add_row(vec![file_name, shape.0.to_string(), shape.1.to_string()]);
    }
    table
}

pub fn gaps_table(gaps: &JoinGaps) -> Table {
    let mut table = new_table(vec!["Gap", "Count", "Values"]);
    let conflicts = gaps
        .membership_conflicts
        .iter()
        .map(|(level, code)| format!("{level}:{code}"))
        .collect_vec();
    for (gap, values) in [
        ("No canonical country", &gaps.unmatched_countries),
        ("Unused canonical country", &gaps.unused_canonical),
        ("Listed in two groups", &conflicts),
    ] {
        if values.is_empty() {
            continue;
        }
        table.add_row(vec![
            gap.to_string(),
            values.len().to_string(),
            values.iter().join(", "),
        ]);
    }
    table
}

pub fn display_summary(written: &[Written]) {
    println!("\nWrote {} files:", written.len());
    println!("{}", summary_table(written));
}

pub fn display_gaps(gaps: &JoinGaps) {
    if gaps.is_empty() {
        return;
    }
    println!("\nThe country join left the following gaps:");
    println!("{}", gaps_table(gaps));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_shows_file_names() {
        let written = vec![Written {
            path: PathBuf::from("/tmp/out/ddf--concepts.csv"),
            shape: (25, 11),
        }];
        let rendered = summary_table(&written).to_string();
        assert!(rendered.contains("ddf--concepts.csv"));
        assert!(!rendered.contains("/tmp/out"));
        assert!(rendered.contains("25"));
    }

    #[test]
    fn test_gaps_only_lists_non_empty_kinds() {
        let gaps = JoinGaps {
            unmatched_countries: vec!["Benin".to_string()],
            unused_canonical: vec![],
            membership_conflicts: vec![("region".to_string(), "i7".to_string())],
        };
        let rendered = gaps_table(&gaps).to_string();
        assert!(rendered.contains("Benin"));
        assert!(rendered.contains("region:i7"));
        assert!(!rendered.contains("Unused canonical country"));
    }
}
