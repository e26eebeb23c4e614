use serde::{Deserialize, Serialize};

use crate::types::ScrollDirection;

/// What happened. Serialized in the camelCase form page scripts expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    SectionEnter,
    SectionLeave,
    ScrollEnd,
    NavigationComplete,
    NavigationCancelled,
}

/// A notification published by the coordinator to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// The section the event is about.
    pub section_id: String,
    /// The coordinator's current section at the time of emission.
    pub current_section: String,
    pub scroll_direction: ScrollDirection,
}
