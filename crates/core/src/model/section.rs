use folio_flow_protocol::Extent;
use serde::{Deserialize, Serialize};

/// Lifecycle of an item's one-shot entrance animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ItemState {
    #[default]
    Pending,
    /// Reveal is due at the given host timestamp (ms).
    Scheduled { at: f64 },
    Played,
}

/// A nested element that animates in once when its section is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatableItem {
    /// Stable reference: the node id, or `{section}#{index}` for anonymous nodes.
    pub key: String,
    /// Content-role class that matched the node.
    pub role: String,
    pub stagger_delay_ms: f64,
    state: ItemState,
}

impl AnimatableItem {
    pub fn new(key: impl Into<String>, role: impl Into<String>, stagger_delay_ms: f64) -> Self {
        Self {
            key: key.into(),
            role: role.into(),
            stagger_delay_ms,
            state: ItemState::Pending,
        }
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn has_played(&self) -> bool {
        self.state == ItemState::Played
    }

    /// Arm the reveal timer. Only a pending item can be scheduled, so an
    /// item is never revealed twice.
    pub(crate) fn schedule(&mut self, now: f64) -> bool {
        if self.state != ItemState::Pending {
            return false;
        }
        self.state = ItemState::Scheduled {
            at: now + self.stagger_delay_ms,
        };
        true
    }

    /// Flip to `Played` when the timer has elapsed. Returns whether it fired.
    pub(crate) fn fire_if_due(&mut self, now: f64) -> bool {
        match self.state {
            ItemState::Scheduled { at } if at <= now => {
                self.state = ItemState::Played;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn deadline(&self) -> Option<f64> {
        match self.state {
            ItemState::Scheduled { at } => Some(at),
            _ => None,
        }
    }

    pub(crate) fn inherit_state(&mut self, previous: &AnimatableItem) {
        self.state = previous.state;
    }
}

/// A uniquely identified region of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    /// Position in document order, starting at zero.
    pub order: usize,
    pub extent: Extent,
    pub(crate) visibility: f64,
    pub(crate) is_visible: bool,
    /// The host is showing a scroll effect on this section.
    #[serde(skip)]
    pub(crate) has_effect: bool,
    pub items: Vec<AnimatableItem>,
}

impl Section {
    pub fn new(id: impl Into<String>, order: usize, extent: Extent) -> Self {
        Self {
            id: id.into(),
            order,
            extent,
            visibility: 0.0,
            is_visible: false,
            has_effect: false,
            items: Vec::new(),
        }
    }

    /// Fraction of the section inside the observation region, in [0, 1].
    pub fn visibility(&self) -> f64 {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn item(&self, key: &str) -> Option<&AnimatableItem> {
        self.items.iter().find(|item| item.key == key)
    }
}
