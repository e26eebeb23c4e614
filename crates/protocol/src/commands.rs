use serde::{Deserialize, Serialize};

/// A single, stateless instruction for the host.
///
/// The coordinator queues commands as it processes input; hosts drain and
/// apply them in order. Each command carries all the data it needs, so a
/// host may drop commands it has no surface for (a page without a nav bar
/// simply ignores `HighlightNav`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FlowCommand {
    /// Set the window scroll position.
    ScrollTo { y: f64 },

    /// Play the one-shot entrance animation of an item.
    RevealItem { section_id: String, item: String },

    /// Mark a section container as visible or not.
    SetSectionVisible { section_id: String, visible: bool },

    /// Per-frame cosmetic effect for a partially visible section.
    SectionEffect {
        section_id: String,
        opacity: f64,
        translate_y: f64,
    },

    /// Width of the progress bar fill, in percent.
    SetProgress { percent: f64 },

    /// Activate the progress marker for `section_id` and deactivate the rest.
    SetActiveMarker { section_id: String },

    /// Highlight navigation links whose target equals `href`.
    HighlightNav { href: String },

    /// Create a progress indicator with one marker per section id.
    MountProgress { markers: Vec<String> },

    /// Remove the progress indicator created by `MountProgress`.
    UnmountProgress,

    /// Stop delivering intersection, scroll, key and touch input.
    Detach,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_tagged_by_op() {
        let cmd = FlowCommand::SetProgress { percent: 50.0 };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "setProgress");
        assert_eq!(json["percent"], 50.0);

        let reveal = FlowCommand::RevealItem {
            section_id: "about".into(),
            item: "about#0".into(),
        };
        let json = serde_json::to_value(&reveal).unwrap();
        assert_eq!(json["sectionId"], "about");

        let back: FlowCommand =
            serde_json::from_str(r##"{"op":"highlightNav","href":"#about"}"##).unwrap();
        assert_eq!(
            back,
            FlowCommand::HighlightNav {
                href: "#about".into()
            }
        );
    }
}
