use serde::{Deserialize, Serialize};

/// A vertical band of the page in document coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub top: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Length of the overlap between two bands, zero when disjoint.
    pub fn overlap(&self, other: &Extent) -> f64 {
        (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0)
    }

    /// Fraction of `self` covered by `other`, in [0, 1].
    ///
    /// A zero-height band counts as fully covered when its top lies inside
    /// `other`, mirroring how browsers report empty targets.
    pub fn coverage_by(&self, other: &Extent) -> f64 {
        if self.height <= 0.0 {
            return if self.top >= other.top && self.top <= other.bottom() {
                1.0
            } else {
                0.0
            };
        }
        (self.overlap(other) / self.height).clamp(0.0, 1.0)
    }
}

/// Vertical scroll direction derived from consecutive scroll positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

impl ScrollDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_of_disjoint_bands_is_zero() {
        let a = Extent::new(0.0, 100.0);
        let b = Extent::new(200.0, 50.0);
        assert_eq!(a.overlap(&b), 0.0);
        assert_eq!(b.coverage_by(&a), 0.0);
    }

    #[test]
    fn partial_coverage() {
        let section = Extent::new(100.0, 200.0);
        let region = Extent::new(0.0, 150.0);
        assert!((section.coverage_by(&region) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_band_inside_region_is_covered() {
        let empty = Extent::new(10.0, 0.0);
        assert_eq!(empty.coverage_by(&Extent::new(0.0, 20.0)), 1.0);
        assert_eq!(empty.coverage_by(&Extent::new(50.0, 20.0)), 0.0);
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&ScrollDirection::Up).unwrap();
        assert_eq!(json, "\"up\"");
    }
}
