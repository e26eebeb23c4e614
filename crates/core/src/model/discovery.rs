use std::collections::HashSet;

use folio_flow_protocol::{PageNode, PageSnapshot};

use crate::config::FlowConfig;
use crate::model::{AnimatableItem, Section};

/// Scan the page for section containers and their animatable items.
///
/// Sections are returned in document order with `order` set to their index.
/// Nodes without an id, or repeating an id already seen, are skipped so ids
/// stay unique. When `previous` holds sections from an earlier scan, the
/// visibility and item playback state of surviving sections carry over.
pub fn discover_sections(
    snapshot: &PageSnapshot,
    config: &FlowConfig,
    previous: &[Section],
) -> Vec<Section> {
    let mut seen = HashSet::new();
    let mut sections = Vec::new();

    for node in snapshot.root.descendants() {
        if !is_section(node, config) {
            continue;
        }
        let Some(id) = node.id.as_deref().filter(|id| !id.is_empty()) else {
            tracing::warn!(top = node.top, "section container without an id skipped");
            continue;
        };
        if !seen.insert(id.to_owned()) {
            tracing::warn!(section = id, "duplicate section id skipped");
            continue;
        }

        let mut section = Section::new(id, sections.len(), node.extent());
        section.items = discover_items(node, id, config);
        if let Some(old) = previous.iter().find(|s| s.id == id) {
            carry_over(&mut section, old);
        }
        sections.push(section);
    }

    tracing::debug!(count = sections.len(), "sections discovered");
    sections
}

fn is_section(node: &PageNode, config: &FlowConfig) -> bool {
    config.section_classes.iter().any(|c| node.has_class(c))
}

/// Items keep their node id as key. Anonymous items, and repeats of an id
/// already used in the section, get a generated `{section}#{index}` key that
/// never collides with a real id.
fn discover_items(section: &PageNode, section_id: &str, config: &FlowConfig) -> Vec<AnimatableItem> {
    let matches: Vec<(&PageNode, &String)> = section
        .descendants()
        .filter_map(|node| {
            let role = config.item_roles.iter().find(|role| node.has_class(role))?;
            Some((node, role))
        })
        .collect();
    let reserved: HashSet<&str> = matches
        .iter()
        .filter_map(|(node, _)| node.id.as_deref())
        .filter(|id| !id.is_empty())
        .collect();

    let mut used = HashSet::new();
    let mut items = Vec::with_capacity(matches.len());
    for (index, (node, role)) in matches.iter().enumerate() {
        let key = match node.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) if !used.contains(id) => id.to_owned(),
            explicit => {
                if let Some(id) = explicit {
                    tracing::warn!(section = section_id, item = id, "duplicate item id");
                }
                generated_key(section_id, index, &reserved, &used)
            }
        };
        used.insert(key.clone());
        items.push(AnimatableItem::new(
            key,
            role.as_str(),
            index as f64 * config.stagger_step_ms,
        ));
    }
    items
}

fn generated_key(
    section_id: &str,
    index: usize,
    reserved: &HashSet<&str>,
    used: &HashSet<String>,
) -> String {
    let taken = |key: &str| reserved.contains(key) || used.contains(key);
    let base = format!("{section_id}#{index}");
    if !taken(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let key = format!("{base}.{suffix}");
        if !taken(&key) {
            return key;
        }
        suffix += 1;
    }
}

fn carry_over(section: &mut Section, old: &Section) {
    section.visibility = old.visibility;
    section.is_visible = old.is_visible;
    section.has_effect = old.has_effect;
    for item in &mut section.items {
        if let Some(prev) = old.item(&item.key) {
            item.inherit_state(prev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemState;
    use pretty_assertions::assert_eq;

    fn section(id: &str, top: f64) -> PageNode {
        PageNode::new(top, 500.0)
            .with_id(id)
            .with_class("portfolio-section")
    }

    fn snapshot(children: Vec<PageNode>) -> PageSnapshot {
        PageSnapshot {
            root: PageNode {
                children,
                ..PageNode::default()
            },
            viewport_height: 800.0,
            document_height: 3000.0,
            ..PageSnapshot::default()
        }
    }

    #[test]
    fn sections_in_document_order() {
        let page = snapshot(vec![
            PageNode::new(0.0, 600.0)
                .with_id("home")
                .with_class("home-section"),
            PageNode::new(600.0, 10.0).with_id("divider"),
            section("about", 610.0),
            PageNode::default().with_child(section("projects", 1110.0)),
        ]);
        let sections = discover_sections(&page, &FlowConfig::default(), &[]);
        let ids: Vec<_> = sections.iter().map(|s| (s.id.as_str(), s.order)).collect();
        assert_eq!(ids, vec![("home", 0), ("about", 1), ("projects", 2)]);
    }

    #[test]
    fn duplicate_and_anonymous_sections_are_skipped() {
        let page = snapshot(vec![
            section("about", 0.0),
            PageNode::new(500.0, 500.0).with_class("portfolio-section"),
            section("about", 1000.0),
            section("contact", 1500.0),
        ]);
        let sections = discover_sections(&page, &FlowConfig::default(), &[]);
        let ids: Vec<_> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["about", "contact"]);
        assert_eq!(sections[1].order, 1);
    }

    #[test]
    fn items_get_stagger_by_index_within_section() {
        let page = snapshot(vec![
            section("projects", 0.0)
                .with_child(PageNode::new(0.0, 50.0).with_class("section-header"))
                .with_child(PageNode::new(60.0, 10.0).with_class("decoration"))
                .with_child(
                    PageNode::new(80.0, 200.0)
                        .with_id("card-a")
                        .with_class("project-card"),
                )
                .with_child(PageNode::new(300.0, 200.0).with_class("project-card")),
        ]);
        let sections = discover_sections(&page, &FlowConfig::default(), &[]);
        let items: Vec<_> = sections[0]
            .items
            .iter()
            .map(|i| (i.key.as_str(), i.role.as_str(), i.stagger_delay_ms))
            .collect();
        assert_eq!(
            items,
            vec![
                ("projects#0", "section-header", 0.0),
                ("card-a", "project-card", 100.0),
                ("projects#2", "project-card", 200.0),
            ]
        );
    }

    #[test]
    fn generated_item_keys_never_collide_with_real_ids() {
        let page = snapshot(vec![
            section("projects", 0.0)
                .with_child(PageNode::new(0.0, 50.0).with_class("section-header"))
                .with_child(
                    PageNode::new(80.0, 200.0)
                        .with_id("projects#2")
                        .with_class("project-card"),
                )
                .with_child(PageNode::new(300.0, 200.0).with_class("project-card"))
                .with_child(
                    PageNode::new(520.0, 200.0)
                        .with_id("projects#2")
                        .with_class("project-card"),
                ),
        ]);
        let sections = discover_sections(&page, &FlowConfig::default(), &[]);
        let keys: Vec<_> = sections[0].items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["projects#0", "projects#2", "projects#2.1", "projects#3"]
        );
    }

    #[test]
    fn rescan_keeps_played_items() {
        let page = snapshot(vec![
            section("about", 0.0).with_child(PageNode::new(0.0, 10.0).with_class("about-text")),
        ]);
        let config = FlowConfig::default();
        let mut first = discover_sections(&page, &config, &[]);
        first[0].is_visible = true;
        first[0].items[0].schedule(0.0);
        first[0].items[0].fire_if_due(0.0);

        let second = discover_sections(&page, &config, &first);
        assert!(second[0].is_visible());
        assert_eq!(second[0].items[0].state(), ItemState::Played);
    }
}
