use folio_flow_protocol::{Extent, FlowCommand};

use crate::config::FlowConfig;
use crate::model::Section;

/// Fraction of a section's height inside the true viewport.
pub fn visible_fraction(extent: &Extent, scroll_y: f64, viewport_height: f64) -> f64 {
    extent.coverage_by(&Extent::new(scroll_y, viewport_height))
}

/// Fade and lift partially visible sections. A section that leaves the
/// partial band gets one neutral effect so the host never keeps a stale
/// fade; after that, fully visible and fully hidden sections are left alone.
pub fn scroll_effects(
    sections: &mut [Section],
    scroll_y: f64,
    viewport_height: f64,
    config: &FlowConfig,
) -> Vec<FlowCommand> {
    sections
        .iter_mut()
        .filter(|section| section.extent.height > 0.0)
        .filter_map(|section| {
            let fraction = visible_fraction(&section.extent, scroll_y, viewport_height);
            if fraction > 0.0 && fraction < 1.0 {
                section.has_effect = true;
                Some(FlowCommand::SectionEffect {
                    section_id: section.id.clone(),
                    opacity: fraction.max(config.effect_min_opacity),
                    translate_y: (1.0 - fraction) * config.effect_max_offset,
                })
            } else if std::mem::take(&mut section.has_effect) {
                Some(FlowCommand::SectionEffect {
                    section_id: section.id.clone(),
                    opacity: 1.0,
                    translate_y: 0.0,
                })
            } else {
                None
            }
        })
        .collect()
}
