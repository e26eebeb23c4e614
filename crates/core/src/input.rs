use folio_flow_protocol::NavKey;

use crate::navigation::NavIntent;

pub fn intent_for_key(key: NavKey) -> NavIntent {
    match key {
        NavKey::ArrowDown | NavKey::PageDown | NavKey::Space => NavIntent::Next,
        NavKey::ArrowUp | NavKey::PageUp => NavIntent::Previous,
        NavKey::Home => NavIntent::First,
        NavKey::End => NavIntent::Last,
    }
}

/// Turns a touch start/end pair into a swipe.
#[derive(Debug, Clone, Copy)]
pub struct SwipeTracker {
    min_distance: f64,
    max_duration_ms: f64,
    start: Option<(f64, f64)>,
}

impl SwipeTracker {
    pub fn new(min_distance: f64, max_duration_ms: f64) -> Self {
        Self {
            min_distance,
            max_duration_ms,
            start: None,
        }
    }

    pub fn begin(&mut self, y: f64, now: f64) {
        self.start = Some((y, now));
    }

    /// A fast vertical drag past the distance threshold is a swipe. Dragging
    /// the finger up moves to the next section, down to the previous one.
    pub fn end(&mut self, y: f64, now: f64) -> Option<NavIntent> {
        let (start_y, started_at) = self.start.take()?;
        let distance = (y - start_y).abs();
        if now - started_at >= self.max_duration_ms || distance <= self.min_distance {
            return None;
        }
        Some(if y < start_y {
            NavIntent::Next
        } else {
            NavIntent::Previous
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_intents() {
        assert_eq!(intent_for_key(NavKey::Space), NavIntent::Next);
        assert_eq!(intent_for_key(NavKey::PageUp), NavIntent::Previous);
        assert_eq!(intent_for_key(NavKey::End), NavIntent::Last);
    }

    #[test]
    fn fast_upward_drag_is_next() {
        let mut swipe = SwipeTracker::new(50.0, 500.0);
        swipe.begin(400.0, 0.0);
        assert_eq!(swipe.end(300.0, 200.0), Some(NavIntent::Next));
        swipe.begin(300.0, 1000.0);
        assert_eq!(swipe.end(400.0, 1100.0), Some(NavIntent::Previous));
    }

    #[test]
    fn slow_or_short_drags_are_ignored() {
        let mut swipe = SwipeTracker::new(50.0, 500.0);
        swipe.begin(400.0, 0.0);
        assert_eq!(swipe.end(300.0, 600.0), None);
        swipe.begin(400.0, 0.0);
        assert_eq!(swipe.end(370.0, 100.0), None);
        assert_eq!(swipe.end(0.0, 100.0), None);
    }
}
