//! Model-to-scheme association records

use crate::error::{ManagerError, ManagerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

/// Optional tuning attached to an association
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssociationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Join record linking one model to one scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub model_id: String,
    pub scheme_id: String,
    /// 1 (lowest) to 10 (highest)
    pub priority: u8,
    pub is_enabled: bool,
    pub associated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AssociationConfig>,
}

impl Association {
    fn matches(&self, scheme_id: &str, model_id: &str) -> bool {
        self.scheme_id == scheme_id && self.model_id == model_id
    }
}

/// Check a requested priority against the 1..=10 range
pub fn check_priority(priority: i64) -> ManagerResult<u8> {
    u8::try_from(priority)
        .ok()
        .filter(|p| (MIN_PRIORITY..=MAX_PRIORITY).contains(p))
        .ok_or(ManagerError::InvalidPriority { priority })
}

/// Insert associations for `model_ids`, replacing any existing row per pair
///
/// At most one row exists per (model, scheme) afterwards. Returns the rows
/// written, in `model_ids` order.
pub fn replace_associations(
    rows: &mut Vec<Association>,
    scheme_id: &str,
    model_ids: &[String],
    priority: u8,
    config: Option<&AssociationConfig>,
    now: DateTime<Utc>,
) -> Vec<Association> {
    let mut written = Vec::with_capacity(model_ids.len());

    for model_id in model_ids {
        rows.retain(|a| !a.matches(scheme_id, model_id));
        written.retain(|a: &Association| a.model_id != *model_id);

        let association = Association {
            model_id: model_id.clone(),
            scheme_id: scheme_id.to_string(),
            priority,
            is_enabled: true,
            associated_at: now,
            config: config.cloned(),
        };
        rows.push(association.clone());
        written.push(association);
    }

    written
}

/// Remove rows of `scheme_id` for `model_ids`; returns how many were removed
pub fn remove_associations(rows: &mut Vec<Association>, scheme_id: &str, model_ids: &[String]) -> usize {
    let before = rows.len();
    rows.retain(|a| !(a.scheme_id == scheme_id && model_ids.contains(&a.model_id)));
    before - rows.len()
}

/// Find the row for a (scheme, model) pair
pub fn find_association_mut<'a>(
    rows: &'a mut [Association],
    scheme_id: &str,
    model_id: &str,
) -> Option<&'a mut Association> {
    rows.iter_mut().find(|a| a.matches(scheme_id, model_id))
}

/// Enabled model ids of a scheme, highest priority first
pub fn associated_model_ids(rows: &[Association], scheme_id: &str) -> Vec<String> {
    let mut enabled: Vec<&Association> = rows
        .iter()
        .filter(|a| a.scheme_id == scheme_id && a.is_enabled)
        .collect();
    enabled.sort_by(|a, b| b.priority.cmp(&a.priority));
    enabled.into_iter().map(|a| a.model_id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_check_priority() {
        assert_eq!(check_priority(1).unwrap(), 1);
        assert_eq!(check_priority(10).unwrap(), 10);
        assert!(matches!(
            check_priority(0),
            Err(ManagerError::InvalidPriority { priority: 0 })
        ));
        assert!(check_priority(11).is_err());
        assert!(check_priority(-3).is_err());
        assert!(check_priority(300).is_err());
    }

    #[test]
    fn test_replace_on_write_keeps_one_row_per_pair() {
        let mut rows = Vec::new();
        let now = Utc::now();

        replace_associations(&mut rows, "scheme-1", &ids(&["model-1"]), 3, None, now);
        replace_associations(&mut rows, "scheme-1", &ids(&["model-1"]), 7, None, now);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].priority, 7);
        assert!(rows[0].is_enabled);
    }

    #[test]
    fn test_replace_only_touches_matching_pair() {
        let mut rows = Vec::new();
        let now = Utc::now();

        replace_associations(&mut rows, "scheme-1", &ids(&["model-1", "model-2"]), 5, None, now);
        replace_associations(&mut rows, "scheme-2", &ids(&["model-1"]), 2, None, now);
        replace_associations(&mut rows, "scheme-1", &ids(&["model-1"]), 9, None, now);

        assert_eq!(rows.len(), 3);
        let scheme_two: Vec<_> = rows.iter().filter(|a| a.scheme_id == "scheme-2").collect();
        assert_eq!(scheme_two.len(), 1);
        assert_eq!(scheme_two[0].priority, 2);
    }

    #[test]
    fn test_replace_dedupes_batch() {
        let mut rows = Vec::new();
        let written = replace_associations(
            &mut rows,
            "scheme-1",
            &ids(&["model-1", "model-1"]),
            4,
            None,
            Utc::now(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_replace_re_enables_disabled_row() {
        let mut rows = Vec::new();
        let now = Utc::now();
        replace_associations(&mut rows, "scheme-1", &ids(&["model-6"]), 6, None, now);
        rows[0].is_enabled = false;

        replace_associations(&mut rows, "scheme-1", &ids(&["model-6"]), 6, None, now);
        assert!(rows[0].is_enabled);
    }

    #[test]
    fn test_remove_associations() {
        let mut rows = Vec::new();
        let now = Utc::now();
        replace_associations(&mut rows, "scheme-1", &ids(&["a", "b", "c"]), 5, None, now);
        replace_associations(&mut rows, "scheme-2", &ids(&["a"]), 5, None, now);

        let removed = remove_associations(&mut rows, "scheme-1", &ids(&["a", "c", "zzz"]));

        assert_eq!(removed, 2);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_associated_model_ids_enabled_by_priority() {
        let rows = crate::seed::mock_associations();
        assert_eq!(
            associated_model_ids(&rows, "scheme-1"),
            vec!["model-1".to_string(), "model-3".to_string()]
        );
        assert!(associated_model_ids(&rows, "scheme-2").is_empty());
    }
}
