use std::collections::HashMap;

use folio_flow_protocol::{Extent, IntersectionEntry};

use crate::config::{FlowConfig, RootMargin};
use crate::model::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observed {
    intersecting: bool,
    /// Number of thresholds the current ratio has reached.
    bucket: usize,
}

/// Computes intersection entries from section geometry.
///
/// Follows `IntersectionObserver` delivery rules: the first pass reports
/// every section, later passes only report sections whose intersecting
/// state changed or whose ratio crossed a threshold.
#[derive(Debug, Clone)]
pub struct GeometryObserver {
    thresholds: Vec<f64>,
    margin: RootMargin,
    last: HashMap<String, Observed>,
}

impl GeometryObserver {
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            thresholds: config.sorted_thresholds(),
            margin: config.root_margin,
            last: HashMap::new(),
        }
    }

    /// The observation region for a scroll position: the viewport shrunk by
    /// the root margin.
    pub fn region(&self, scroll_y: f64, viewport_height: f64) -> Extent {
        let height = (viewport_height - self.margin.top - self.margin.bottom).max(0.0);
        Extent::new(scroll_y + self.margin.top, height)
    }

    pub fn observe(
        &mut self,
        sections: &[Section],
        scroll_y: f64,
        viewport_height: f64,
    ) -> Vec<IntersectionEntry> {
        let region = self.region(scroll_y, viewport_height);
        let mut entries = Vec::new();

        for section in sections {
            let ratio = section.extent.coverage_by(&region);
            let intersecting = ratio > 0.0;
            let observed = Observed {
                intersecting,
                bucket: self.bucket(ratio, intersecting),
            };
            if self.last.get(&section.id) == Some(&observed) {
                continue;
            }
            self.last.insert(section.id.clone(), observed);
            entries.push(IntersectionEntry {
                section_id: section.id.clone(),
                is_intersecting: intersecting,
                intersection_ratio: ratio,
            });
        }
        entries
    }

    /// Forget everything observed so the next pass reports all sections.
    pub fn reset(&mut self) {
        self.last.clear();
    }

    fn bucket(&self, ratio: f64, intersecting: bool) -> usize {
        self.thresholds
            .iter()
            .filter(|&&t| if t == 0.0 { intersecting } else { ratio >= t })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section::new("home", 0, Extent::new(0.0, 1000.0)),
            Section::new("about", 1, Extent::new(1000.0, 1000.0)),
        ]
    }

    #[test]
    fn first_pass_reports_every_section() {
        let mut observer = GeometryObserver::new(&FlowConfig::default());
        let entries = observer.observe(&sections(), 0.0, 800.0);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_intersecting);
        assert!(!entries[1].is_intersecting);
        // Region is [50, 750]: 700 of home's 1000 px.
        assert!((entries[0].intersection_ratio - 0.7).abs() < 1e-9);
    }

    #[test]
    fn root_margin_delays_entry() {
        let mut observer = GeometryObserver::new(&FlowConfig::default());
        observer.observe(&sections(), 0.0, 800.0);
        // Viewport bottom at 1040 reaches about, but the margin keeps it out.
        let entries = observer.observe(&sections(), 240.0, 800.0);
        assert!(entries.iter().all(|e| e.section_id != "about"));
        let entries = observer.observe(&sections(), 260.0, 800.0);
        assert!(entries.iter().any(|e| e.section_id == "about" && e.is_intersecting));
    }

    #[test]
    fn small_moves_within_a_bucket_are_silent() {
        let mut observer = GeometryObserver::new(&FlowConfig::default());
        observer.observe(&sections(), 0.0, 800.0);
        assert!(observer.observe(&sections(), 5.0, 800.0).is_empty());
    }

    #[test]
    fn reset_reports_again() {
        let mut observer = GeometryObserver::new(&FlowConfig::default());
        observer.observe(&sections(), 0.0, 800.0);
        observer.reset();
        assert_eq!(observer.observe(&sections(), 0.0, 800.0).len(), 2);
    }
}
