use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Where intersection entries come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntersectionSource {
    /// Derive entries from the page snapshot and the scroll position.
    #[default]
    Geometry,
    /// The host runs a native observer and forwards its entries.
    Host,
}

/// Inset of the observation region from the viewport edges, in pixels.
/// Positive values shrink the region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: 50.0,
            bottom: 50.0,
        }
    }
}

/// Tunables for the section coordinator.
///
/// Every field has a default, so hosts only send what they override:
///
/// ```json
/// { "debounce_ms": 200, "item_roles": ["card"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Classes marking a node as a section container.
    pub section_classes: Vec<String>,
    /// Content-role classes whose nodes get a one-shot entrance animation.
    pub item_roles: Vec<String>,
    /// Visibility ratios at which intersection entries are reported.
    pub thresholds: Vec<f64>,
    pub root_margin: RootMargin,
    pub intersection_source: IntersectionSource,
    /// Delay added per item index within a section.
    pub stagger_step_ms: f64,
    /// Quiet period after the last scroll event before `scrollEnd`.
    pub debounce_ms: f64,
    /// Navigation animation rate; duration = distance × rate.
    pub scroll_ms_per_px: f64,
    /// Navbar height assumed when the page does not report one.
    pub default_navbar_height: f64,
    /// Extra clearance kept between the navbar and a navigation target.
    pub navbar_gap: f64,
    pub swipe_min_distance: f64,
    pub swipe_max_duration_ms: f64,
    pub keyboard: bool,
    pub touch: bool,
    pub progress_indicator: bool,
    pub effect_min_opacity: f64,
    pub effect_max_offset: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            section_classes: vec!["portfolio-section".into(), "home-section".into()],
            item_roles: [
                "section-header",
                "timeline-item",
                "skill-category",
                "project-card",
                "contact-method",
                "about-text",
                "stats-recap-content",
                "form-group",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            thresholds: vec![0.0, 0.1, 0.5, 1.0],
            root_margin: RootMargin::default(),
            intersection_source: IntersectionSource::Geometry,
            stagger_step_ms: 100.0,
            debounce_ms: 150.0,
            scroll_ms_per_px: 0.5,
            default_navbar_height: 80.0,
            navbar_gap: 20.0,
            swipe_min_distance: 50.0,
            swipe_max_duration_ms: 500.0,
            keyboard: true,
            touch: true,
            progress_indicator: true,
            effect_min_opacity: 0.3,
            effect_max_offset: 50.0,
        }
    }
}

impl FlowConfig {
    /// Parse a JSON override document and validate the result.
    pub fn from_json(data: &str) -> Result<Self, FlowError> {
        let config: Self = serde_json::from_str(data).map_err(FlowError::Config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if self.section_classes.is_empty() {
            return Err(invalid("section_classes", "must name at least one class"));
        }
        if self
            .thresholds
            .iter()
            .any(|t| !t.is_finite() || !(0.0..=1.0).contains(t))
        {
            return Err(invalid("thresholds", "values must lie in [0, 1]"));
        }
        let non_negative = [
            ("stagger_step_ms", self.stagger_step_ms),
            ("debounce_ms", self.debounce_ms),
            ("scroll_ms_per_px", self.scroll_ms_per_px),
            ("default_navbar_height", self.default_navbar_height),
            ("navbar_gap", self.navbar_gap),
            ("swipe_min_distance", self.swipe_min_distance),
            ("swipe_max_duration_ms", self.swipe_max_duration_ms),
            ("effect_max_offset", self.effect_max_offset),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite, non-negative number"));
            }
        }
        if !(0.0..=1.0).contains(&self.effect_min_opacity) {
            return Err(invalid("effect_min_opacity", "must lie in [0, 1]"));
        }
        Ok(())
    }

    /// Thresholds sorted ascending with duplicates removed.
    pub(crate) fn sorted_thresholds(&self) -> Vec<f64> {
        let mut thresholds = self.thresholds.clone();
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }
        thresholds
    }
}

fn invalid(field: &'static str, reason: &'static str) -> FlowError {
    FlowError::InvalidConfig { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = FlowConfig::from_json(r#"{"debounce_ms": 300}"#).unwrap();
        assert_eq!(config.debounce_ms, 300.0);
        assert_eq!(config.thresholds, vec![0.0, 0.1, 0.5, 1.0]);
        assert_eq!(config.root_margin.top, 50.0);
        assert_eq!(config.intersection_source, IntersectionSource::Geometry);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = FlowConfig::from_json(r#"{"thresholds": [0.0, 1.5]}"#).unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidConfig {
                field: "thresholds",
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_debounce() {
        let config = FlowConfig {
            debounce_ms: -1.0,
            ..FlowConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = FlowConfig::from_json("{").unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
    }

    #[test]
    fn sorted_thresholds_are_deduplicated() {
        let config = FlowConfig {
            thresholds: vec![1.0, 0.5, 0.5, 0.0],
            ..FlowConfig::default()
        };
        assert_eq!(config.sorted_thresholds(), vec![0.0, 0.5, 1.0]);
    }
}
