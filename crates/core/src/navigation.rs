/// Ease-in-out cubic on `t` in [0, 1].
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Which neighbour to move to, relative to the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Previous,
    First,
    Last,
}

/// Resolve an intent to a section index among `len` sections, wrapping at
/// both ends. `current` is `None` when the current section is unknown, in
/// which case `Next` lands on the first and `Previous` on the last.
pub fn resolve_intent(intent: NavIntent, current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match intent {
        NavIntent::Next => current.map_or(0, |i| (i + 1) % len),
        NavIntent::Previous => match current {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        },
        NavIntent::First => 0,
        NavIntent::Last => len - 1,
    })
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Started,
    /// Another navigation is in flight; the request was dropped.
    Busy,
    UnknownSection,
    /// The coordinator has been destroyed.
    Inactive,
}

/// An in-flight programmatic scroll towards a section.
///
/// The coordinator holds at most one of these; its presence is the
/// navigation lock, so dropping it on any path releases the lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimation {
    pub section_id: String,
    pub from: f64,
    pub to: f64,
    pub started_at: f64,
    pub duration_ms: f64,
}

impl ScrollAnimation {
    /// Duration grows linearly with distance at `ms_per_px`.
    pub fn new(section_id: impl Into<String>, from: f64, to: f64, now: f64, ms_per_px: f64) -> Self {
        Self {
            section_id: section_id.into(),
            from,
            to,
            started_at: now,
            duration_ms: (to - from).abs() * ms_per_px,
        }
    }

    /// Scroll position at `now` and whether the animation has finished.
    pub fn sample(&self, now: f64) -> (f64, bool) {
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now - self.started_at) / self.duration_ms).clamp(0.0, 1.0)
        };
        let y = self.from + (self.to - self.from) * ease_in_out_cubic(progress);
        (y, progress >= 1.0)
    }
}
