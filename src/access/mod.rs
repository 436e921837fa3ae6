//! Role-based visibility over the extracted structures.
//!
//! Department names are not spelled consistently between the evaluation
//! sheets and the org chart ("制作1部" vs "東京本社 制作1部"), so manager
//! grants match by exact text, substring containment in either direction,
//! and finally by the last whitespace-delimited token of each side.

use crate::evaluation::EmployeeEvaluation;
use crate::pipeline::SalesData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Department marker granting company-wide evaluation visibility.
pub const UNIVERSAL_DEPARTMENT: &str = "全社";
/// Region-tab key granting visibility into every sales tab.
pub const UNIVERSAL_TAB: &str = "all";

/// What one viewer is allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Grant {
    Admin,
    President,
    Manager {
        #[serde(default)]
        department_patterns: Vec<String>,
        region_tab: String,
        #[serde(default)]
        department_key_filter: Option<String>,
    },
}

impl Grant {
    /// Admin and president see everything, as does a manager grant carrying
    /// either universal marker.
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Grant::Admin | Grant::President => true,
            Grant::Manager {
                department_patterns,
                region_tab,
                ..
            } => {
                region_tab == UNIVERSAL_TAB
                    || department_patterns
                        .iter()
                        .any(|pattern| pattern == UNIVERSAL_DEPARTMENT)
            }
        }
    }

    /// The subset of `all_departments` this grant may view.
    pub fn visible_departments(&self, all_departments: &[String]) -> Vec<String> {
        if self.is_unrestricted() {
            return all_departments.to_vec();
        }
        let Grant::Manager {
            department_patterns,
            ..
        } = self
        else {
            return all_departments.to_vec();
        };

        all_departments
            .iter()
            .filter(|candidate| {
                department_patterns
                    .iter()
                    .any(|pattern| department_matches(pattern, candidate))
            })
            .cloned()
            .collect()
    }
}

/// Lookup table from access key to grant, built once at startup from
/// configuration external to this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrantTable(BTreeMap<String, Grant>);

impl GrantTable {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_path(path: &Path) -> Result<Self, crate::error::AppError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&json)?)
    }

    pub fn get(&self, key: &str) -> Option<&Grant> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pattern/candidate matching rules, tried in order: exact, containment in
/// either direction, then bidirectional containment of the last
/// whitespace-delimited tokens.
fn department_matches(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.trim();
    let candidate = candidate.trim();
    if pattern.is_empty() || candidate.is_empty() {
        return false;
    }
    if pattern == candidate || candidate.contains(pattern) || pattern.contains(candidate) {
        return true;
    }

    let pattern_tail = last_token(pattern);
    let candidate_tail = last_token(candidate);
    candidate_tail.contains(pattern_tail) || pattern_tail.contains(candidate_tail)
}

fn last_token(text: &str) -> &str {
    text.split_whitespace().last().unwrap_or(text)
}

/// Filters the merged evaluation map down to employees in departments the
/// grant may view.
pub fn visible_evaluations(
    grant: &Grant,
    evaluations: &BTreeMap<String, EmployeeEvaluation>,
) -> BTreeMap<String, EmployeeEvaluation> {
    if grant.is_unrestricted() {
        return evaluations.clone();
    }
    let Grant::Manager {
        department_patterns,
        ..
    } = grant
    else {
        return evaluations.clone();
    };

    evaluations
        .iter()
        .filter(|(_, evaluation)| {
            department_patterns
                .iter()
                .any(|pattern| department_matches(pattern, &evaluation.department))
        })
        .map(|(name, evaluation)| (name.clone(), evaluation.clone()))
        .collect()
}

/// Narrows the sales structures to what the grant may view. A manager sees
/// their region tab only; when the grant names a department key, the
/// region's lists narrow to entries matching it in either direction,
/// falling back to the unfiltered lists when nothing matches rather than
/// rendering an empty screen.
pub fn visible_sales_view(grant: &Grant, sales: &SalesData) -> SalesData {
    if grant.is_unrestricted() {
        return sales.clone();
    }
    let Grant::Manager {
        region_tab,
        department_key_filter,
        ..
    } = grant
    else {
        return sales.clone();
    };

    let mut visible = SalesData::default();
    let Some(region) = sales.regions.get(region_tab) else {
        return visible;
    };

    let mut region = region.clone();
    if let Some(key) = department_key_filter.as_deref().filter(|key| !key.is_empty()) {
        let teams: Vec<_> = region
            .team_summary
            .iter()
            .filter(|summary| key_matches(key, &summary.team))
            .cloned()
            .collect();
        if !teams.is_empty() {
            region.team_summary = teams;
        }

        let departments: Vec<_> = region
            .departments
            .iter()
            .filter(|department| key_matches(key, &department.name))
            .cloned()
            .collect();
        if !departments.is_empty() {
            region.departments = departments;
        }
    }

    visible.regions.insert(region_tab.clone(), region);
    visible
}

fn key_matches(key: &str, name: &str) -> bool {
    name.contains(key) || key.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(patterns: &[&str]) -> Grant {
        Grant::Manager {
            department_patterns: patterns.iter().map(|s| s.to_string()).collect(),
            region_tab: "tokyo".to_string(),
            department_key_filter: None,
        }
    }

    #[test]
    fn substring_containment_matches_inconsistent_naming() {
        let grant = manager(&["制作1部"]);
        let all = vec![
            "東京本社 制作1部".to_string(),
            "東京本社 制作2部".to_string(),
        ];
        assert_eq!(grant.visible_departments(&all), vec!["東京本社 制作1部"]);
    }

    #[test]
    fn last_token_matching_bridges_org_chart_prefixes() {
        let grant = manager(&["営業本部 マネジメント部"]);
        let all = vec!["大阪支社 マネジメント部".to_string()];
        assert_eq!(grant.visible_departments(&all).len(), 1);
    }

    #[test]
    fn universal_markers_grant_everything() {
        let all = vec!["制作1部".to_string(), "経理部".to_string()];
        assert_eq!(Grant::President.visible_departments(&all).len(), 2);

        let accounting = Grant::Manager {
            department_patterns: vec![UNIVERSAL_DEPARTMENT.to_string()],
            region_tab: "tokyo".to_string(),
            department_key_filter: None,
        };
        assert!(accounting.is_unrestricted());
    }

    #[test]
    fn grant_table_deserializes_tagged_roles() {
        let table = GrantTable::from_json_str(
            r#"{
                "manager1": {
                    "role": "manager",
                    "department_patterns": ["東京本社 制作1部"],
                    "region_tab": "tokyo",
                    "department_key_filter": "制作1"
                },
                "president2025": { "role": "president" }
            }"#,
        )
        .expect("grants parse");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("president2025"), Some(&Grant::President));
        assert!(table.get("intruder").is_none());
    }
}
