use serde::{Deserialize, Serialize};

/// Absolute page scroll progress in percent, clamped to [0, 100].
pub fn scroll_percent(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

/// State of the progress bar and its per-section markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressIndicator {
    pub markers: Vec<String>,
    pub active: Option<String>,
    pub percent: f64,
    /// Mounted by the coordinator rather than found on the page, so it must
    /// be removed on teardown.
    pub owned: bool,
}

impl ProgressIndicator {
    pub fn new(markers: Vec<String>, owned: bool) -> Self {
        Self {
            markers,
            active: None,
            percent: 0.0,
            owned,
        }
    }

    /// Returns `true` when the active marker changed.
    pub fn set_active(&mut self, section_id: &str) -> bool {
        if self.active.as_deref() == Some(section_id) {
            return false;
        }
        self.active = Some(section_id.to_owned());
        true
    }

    pub fn is_active(&self, section_id: &str) -> bool {
        self.active.as_deref() == Some(section_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_scrollable_range() {
        assert_eq!(scroll_percent(0.0, 3000.0, 1000.0), 0.0);
        assert_eq!(scroll_percent(1000.0, 3000.0, 1000.0), 50.0);
        assert_eq!(scroll_percent(2500.0, 3000.0, 1000.0), 100.0);
    }

    #[test]
    fn short_page_has_zero_progress() {
        assert_eq!(scroll_percent(0.0, 500.0, 800.0), 0.0);
    }

    #[test]
    fn active_marker_changes_once() {
        let mut progress = ProgressIndicator::new(vec!["home".into(), "about".into()], true);
        assert!(progress.set_active("about"));
        assert!(!progress.set_active("about"));
        assert!(progress.is_active("about"));
        assert!(!progress.is_active("home"));
    }
}
