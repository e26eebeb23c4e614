use serde::{Deserialize, Serialize};

/// Keys the coordinator binds to section navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    PageDown,
    PageUp,
    Space,
    Home,
    End,
}

impl NavKey {
    /// Map a DOM `KeyboardEvent.key` value. Unbound keys yield `None`.
    pub fn from_dom_key(key: &str) -> Option<Self> {
        Some(match key {
            "ArrowDown" => Self::ArrowDown,
            "ArrowUp" => Self::ArrowUp,
            "PageDown" => Self::PageDown,
            "PageUp" => Self::PageUp,
            " " | "Spacebar" => Self::Space,
            "Home" => Self::Home,
            "End" => Self::End,
            _ => return None,
        })
    }
}

/// One intersection report for a section, as delivered by a native
/// `IntersectionObserver` when the host observes on the coordinator's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionEntry {
    pub section_id: String,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_dom_keys() {
        assert_eq!(NavKey::from_dom_key(" "), Some(NavKey::Space));
        assert_eq!(NavKey::from_dom_key("End"), Some(NavKey::End));
        assert_eq!(NavKey::from_dom_key("a"), None);
        assert_eq!(NavKey::from_dom_key("Escape"), None);
    }
}
