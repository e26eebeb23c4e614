use serde::{Deserialize, Serialize};

use crate::types::Extent;

/// One element of the host document, reduced to what the coordinator needs.
///
/// Hosts serialize their DOM into this tree once at startup and again on
/// refresh. `top` is the absolute document offset, not the viewport offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNode {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub top: f64,
    pub height: f64,
    pub children: Vec<PageNode>,
}

impl PageNode {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            height,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_child(mut self, child: PageNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.top, self.height)
    }

    /// Pre-order walk of the descendants of this node (excluding itself).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a PageNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a PageNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Everything the host reports about its document at init or refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub root: PageNode,
    pub viewport_height: f64,
    pub document_height: f64,
    /// Window scroll offset when the snapshot was taken. Absent on a refresh
    /// means the coordinator keeps the position it already tracks.
    pub scroll_y: Option<f64>,
    /// Height of the fixed navigation bar, when the page has one.
    pub navbar_height: Option<f64>,
    /// The page already contains a progress indicator the coordinator can
    /// reuse instead of mounting its own.
    pub has_progress_indicator: bool,
}

impl PageSnapshot {
    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

/// Host capabilities and user preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// `prefers-reduced-motion: reduce` is active.
    pub reduced_motion: bool,
    pub touch_capable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descendants_walk_in_document_order() {
        let root = PageNode::default()
            .with_child(
                PageNode::new(0.0, 10.0)
                    .with_id("a")
                    .with_child(PageNode::new(0.0, 5.0).with_id("a1")),
            )
            .with_child(PageNode::new(10.0, 10.0).with_id("b"));
        let ids: Vec<_> = root
            .descendants()
            .filter_map(|n| n.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "a1", "b"]);
    }

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let json = r#"{"viewport_height": 800, "document_height": 2400}"#;
        let snapshot: PageSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.max_scroll(), 1600.0);
        assert!(snapshot.root.children.is_empty());
        assert_eq!(snapshot.navbar_height, None);
        assert_eq!(snapshot.scroll_y, None);
    }

    #[test]
    fn explicit_zero_scroll_is_kept() {
        let snapshot: PageSnapshot = serde_json::from_str(r#"{"scroll_y": 0}"#).unwrap();
        assert_eq!(snapshot.scroll_y, Some(0.0));
    }
}
