//! Typed shallow merge for the JSON preference objects stored per user.
//!
//! Partial updates to nested preference objects merge field-by-field into
//! the stored value over a closed set of known keys; unknown keys are
//! rejected at deserialization rather than silently accepted.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collection view configuration
// ---------------------------------------------------------------------------

/// How the collection browser renders entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionViewMode {
    Grid,
    Table,
    List,
    Binder,
}

/// Sort direction shared by view configs and list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Stored collection view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionViewConfig {
    pub view_mode: CollectionViewMode,
    pub visible_columns: Vec<String>,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    pub binder_cards_per_page: i32,
}

impl Default for CollectionViewConfig {
    fn default() -> Self {
        Self {
            view_mode: CollectionViewMode::Grid,
            visible_columns: Vec::new(),
            sort_by: None,
            sort_direction: SortDirection::Asc,
            binder_cards_per_page: 9,
        }
    }
}

/// Partial update for [`CollectionViewConfig`]. Absent fields leave the
/// stored value untouched; unknown keys fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CollectionViewConfigPatch {
    pub view_mode: Option<CollectionViewMode>,
    pub visible_columns: Option<Vec<String>>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub binder_cards_per_page: Option<i32>,
}

impl CollectionViewConfig {
    /// Shallow-merge a partial update into this config.
    pub fn merge(&mut self, patch: CollectionViewConfigPatch) {
        if let Some(view_mode) = patch.view_mode {
            self.view_mode = view_mode;
        }
        if let Some(visible_columns) = patch.visible_columns {
            self.visible_columns = visible_columns;
        }
        if let Some(sort_by) = patch.sort_by {
            self.sort_by = Some(sort_by);
        }
        if let Some(sort_direction) = patch.sort_direction {
            self.sort_direction = sort_direction;
        }
        if let Some(per_page) = patch.binder_cards_per_page {
            self.binder_cards_per_page = per_page;
        }
    }
}

// ---------------------------------------------------------------------------
// Notification preferences
// ---------------------------------------------------------------------------

/// Stored notification preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub email_on_pdf_ready: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_on_pdf_ready: true,
        }
    }
}

/// Partial update for [`NotificationPreferences`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct NotificationPreferencesPatch {
    pub email_on_pdf_ready: Option<bool>,
}

impl NotificationPreferences {
    /// Shallow-merge a partial update into these preferences.
    pub fn merge(&mut self, patch: NotificationPreferencesPatch) {
        if let Some(flag) = patch.email_on_pdf_ready {
            self.email_on_pdf_ready = flag;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_applies_only_supplied_fields() {
        let mut config = CollectionViewConfig::default();
        config.merge(CollectionViewConfigPatch {
            view_mode: Some(CollectionViewMode::Table),
            binder_cards_per_page: Some(12),
            ..Default::default()
        });
        assert_eq!(config.view_mode, CollectionViewMode::Table);
        assert_eq!(config.binder_cards_per_page, 12);
        // Untouched fields keep their stored values.
        assert_eq!(config.sort_direction, SortDirection::Asc);
        assert!(config.visible_columns.is_empty());
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut config = CollectionViewConfig::default();
        let before = config.clone();
        config.merge(CollectionViewConfigPatch::default());
        assert_eq!(config, before);
    }

    #[test]
    fn merge_is_idempotent() {
        let patch = CollectionViewConfigPatch {
            view_mode: Some(CollectionViewMode::Binder),
            ..Default::default()
        };
        let mut once = CollectionViewConfig::default();
        once.merge(patch.clone());
        let mut twice = once.clone();
        twice.merge(patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<CollectionViewConfigPatch, _> =
            serde_json::from_value(json!({"viewMode": "grid", "bogus": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn patch_deserializes_camel_case() {
        let patch: CollectionViewConfigPatch =
            serde_json::from_value(json!({"binderCardsPerPage": 12, "sortDirection": "desc"}))
                .unwrap();
        assert_eq!(patch.binder_cards_per_page, Some(12));
        assert_eq!(patch.sort_direction, Some(SortDirection::Desc));
    }

    #[test]
    fn notification_merge_flips_flag() {
        let mut prefs = NotificationPreferences::default();
        prefs.merge(NotificationPreferencesPatch {
            email_on_pdf_ready: Some(false),
        });
        assert!(!prefs.email_on_pdf_ready);
    }

    #[test]
    fn stored_config_round_trips() {
        let config = CollectionViewConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["viewMode"], "grid");
        let parsed: CollectionViewConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, config);
    }
}
