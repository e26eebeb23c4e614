use folio_flow_protocol::{
    Environment, EventKind, FlowCommand, FlowEvent, IntersectionEntry, NavKey, PageSnapshot,
    ScrollDirection,
};

use crate::config::{FlowConfig, IntersectionSource};
use crate::effects::scroll_effects;
use crate::error::FlowError;
use crate::input::{SwipeTracker, intent_for_key};
use crate::model::{Section, discover_sections};
use crate::navigation::{NavIntent, NavigationOutcome, ScrollAnimation, resolve_intent};
use crate::notify::{SubscriptionId, Subscribers};
use crate::observer::GeometryObserver;
use crate::progress::{ProgressIndicator, scroll_percent};
use crate::schedule::{Debounce, FrameThrottle};

/// Tracks which section of a single-page layout is in view and drives
/// navigation between sections.
///
/// The coordinator is host-driven. The host forwards scroll positions,
/// animation frames, key and touch input (each stamped with a millisecond
/// timestamp) and applies the [`FlowCommand`]s drained with
/// [`Coordinator::take_commands`]. Collaborators observe section changes
/// through [`Coordinator::subscribe`].
#[derive(Debug)]
pub struct Coordinator {
    config: FlowConfig,
    env: Environment,
    snapshot: PageSnapshot,
    sections: Vec<Section>,
    current: Option<String>,
    direction: ScrollDirection,
    scroll_y: f64,
    /// In-flight navigation. `Some` is the navigation lock.
    navigation: Option<ScrollAnimation>,
    throttle: FrameThrottle,
    debounce: Debounce,
    swipe: SwipeTracker,
    observer: GeometryObserver,
    progress: Option<ProgressIndicator>,
    subscribers: Subscribers,
    commands: Vec<FlowCommand>,
    destroyed: bool,
}

impl Coordinator {
    /// Discover sections and prepare observation. The first intersection
    /// pass runs on the first [`Coordinator::on_frame`], so subscribers
    /// registered right after construction still see the initial entries.
    pub fn new(
        config: FlowConfig,
        env: Environment,
        snapshot: PageSnapshot,
    ) -> Result<Self, FlowError> {
        config.validate()?;
        let sections = discover_sections(&snapshot, &config, &[]);
        let current = sections.first().map(|s| s.id.clone());

        let mut coordinator = Self {
            observer: GeometryObserver::new(&config),
            debounce: Debounce::new(config.debounce_ms),
            swipe: SwipeTracker::new(config.swipe_min_distance, config.swipe_max_duration_ms),
            scroll_y: snapshot.scroll_y.unwrap_or(0.0),
            config,
            env,
            snapshot,
            sections,
            current,
            direction: ScrollDirection::Down,
            navigation: None,
            throttle: FrameThrottle::default(),
            progress: None,
            subscribers: Subscribers::default(),
            commands: Vec::new(),
            destroyed: false,
        };
        coordinator.mount_progress();
        coordinator.throttle.request();

        tracing::debug!(
            sections = coordinator.sections.len(),
            reduced_motion = env.reduced_motion,
            touch = env.touch_capable,
            "coordinator initialized"
        );
        Ok(coordinator)
    }

    /// Parse JSON config overrides and a JSON page snapshot, then construct.
    pub fn from_json(config: &str, env: Environment, page: &str) -> Result<Self, FlowError> {
        let config = FlowConfig::from_json(config)?;
        let snapshot: PageSnapshot = serde_json::from_str(page).map_err(FlowError::Page)?;
        Self::new(config, env, snapshot)
    }

    // --- queries ---

    pub fn current_section(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Visible ratio of a section within the observation region; 0 when the
    /// id is unknown.
    pub fn section_progress(&self, id: &str) -> f64 {
        self.section(id).map_or(0.0, Section::visibility)
    }

    pub fn is_section_visible(&self, id: &str) -> bool {
        self.section(id).is_some_and(Section::is_visible)
    }

    pub fn is_transitioning(&self) -> bool {
        self.navigation.is_some()
    }

    pub fn navigation(&self) -> Option<&ScrollAnimation> {
        self.navigation.as_ref()
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn progress(&self) -> Option<&ProgressIndicator> {
        self.progress.as_ref()
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    pub fn snapshot(&self) -> &PageSnapshot {
        &self.snapshot
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the host should keep scheduling animation frames: a scroll
    /// recomputation, a navigation or a timer is pending.
    pub fn wants_frame(&self) -> bool {
        !self.destroyed
            && (self.throttle.is_pending()
                || self.navigation.is_some()
                || self.next_deadline().is_some())
    }

    /// Earliest pending timer (debounce or stagger reveal), for hosts that
    /// sleep between frames.
    pub fn next_deadline(&self) -> Option<f64> {
        if self.destroyed {
            return None;
        }
        self.sections
            .iter()
            .flat_map(|s| s.items.iter().filter_map(|item| item.deadline()))
            .chain(self.debounce.deadline())
            .min_by(f64::total_cmp)
    }

    // --- notifications and host commands ---

    pub fn subscribe(&mut self, listener: impl FnMut(&FlowEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Drain the commands queued since the last call.
    pub fn take_commands(&mut self) -> Vec<FlowCommand> {
        std::mem::take(&mut self.commands)
    }

    // --- host input ---

    /// Record a scroll position. Recomputation is deferred to the next
    /// frame; any number of scroll events per frame coalesce.
    pub fn on_scroll(&mut self, y: f64, now: f64) {
        if self.destroyed {
            return;
        }
        if y > self.scroll_y {
            self.direction = ScrollDirection::Down;
        } else if y < self.scroll_y {
            self.direction = ScrollDirection::Up;
        }
        self.scroll_y = y;
        self.throttle.request();
        self.debounce.trigger(now);
    }

    /// Advance one animation frame.
    pub fn on_frame(&mut self, now: f64) {
        if self.destroyed {
            return;
        }
        self.step_navigation(now);
        if self.throttle.take() {
            self.handle_scroll(now);
        }
        self.reveal_due_items(now);
        if self.debounce.fire_if_due(now) {
            let current = self.current.clone().unwrap_or_default();
            self.emit(EventKind::ScrollEnd, &current);
        }
    }

    /// Apply intersection entries, either computed internally or forwarded
    /// from a native observer when the host observes on our behalf.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry], now: f64) {
        if self.destroyed {
            return;
        }
        for entry in entries {
            let Some(index) = self.index_of(&entry.section_id) else {
                continue;
            };
            let section = &mut self.sections[index];
            section.visibility = entry.intersection_ratio.clamp(0.0, 1.0);
            match (entry.is_intersecting, section.is_visible) {
                (true, false) => self.enter(index, now),
                (false, true) => self.leave(index),
                _ => {}
            }
        }
    }

    /// Handle a navigation key. Returns `true` when the key is bound, so the
    /// host can suppress its default action. Keys typed into editable
    /// fields are ignored.
    pub fn on_key(&mut self, key: NavKey, editing: bool, now: f64) -> bool {
        if self.destroyed || !self.config.keyboard || editing {
            return false;
        }
        self.navigate(intent_for_key(key), now);
        true
    }

    pub fn on_touch_start(&mut self, y: f64, now: f64) {
        if self.touch_enabled() {
            self.swipe.begin(y, now);
        }
    }

    pub fn on_touch_end(&mut self, y: f64, now: f64) -> Option<NavigationOutcome> {
        if !self.touch_enabled() {
            return None;
        }
        let intent = self.swipe.end(y, now)?;
        Some(self.navigate(intent, now))
    }

    /// A progress marker was clicked.
    pub fn on_marker_click(&mut self, section_id: &str, now: f64) -> NavigationOutcome {
        self.navigate_to_section(section_id, now)
    }

    // --- navigation ---

    /// Start a smooth scroll to a section. Dropped while another navigation
    /// is in flight; unknown ids are ignored.
    pub fn navigate_to_section(&mut self, id: &str, now: f64) -> NavigationOutcome {
        if self.destroyed {
            return NavigationOutcome::Inactive;
        }
        if let Some(active) = &self.navigation {
            tracing::debug!(
                requested = id,
                in_flight = %active.section_id,
                "navigation dropped while another is in flight"
            );
            return NavigationOutcome::Busy;
        }
        let Some(section) = self.section(id) else {
            tracing::debug!(section = id, "navigation to unknown section ignored");
            return NavigationOutcome::UnknownSection;
        };

        let navbar = self
            .snapshot
            .navbar_height
            .unwrap_or(self.config.default_navbar_height);
        let target = (section.extent.top - navbar - self.config.navbar_gap)
            .clamp(0.0, self.snapshot.max_scroll());
        let rate = if self.env.reduced_motion {
            0.0
        } else {
            self.config.scroll_ms_per_px
        };
        let animation = ScrollAnimation::new(id, self.scroll_y, target, now, rate);
        tracing::debug!(
            section = id,
            from = animation.from,
            to = animation.to,
            duration_ms = animation.duration_ms,
            "navigation started"
        );
        self.navigation = Some(animation);
        NavigationOutcome::Started
    }

    pub fn navigate_to_next(&mut self, now: f64) -> NavigationOutcome {
        self.navigate(NavIntent::Next, now)
    }

    pub fn navigate_to_previous(&mut self, now: f64) -> NavigationOutcome {
        self.navigate(NavIntent::Previous, now)
    }

    pub fn navigate_to_first(&mut self, now: f64) -> NavigationOutcome {
        self.navigate(NavIntent::First, now)
    }

    pub fn navigate_to_last(&mut self, now: f64) -> NavigationOutcome {
        self.navigate(NavIntent::Last, now)
    }

    /// Abort the in-flight navigation, leaving the scroll position where the
    /// last frame put it. Returns whether a navigation was cancelled.
    pub fn cancel_navigation(&mut self) -> bool {
        let Some(animation) = self.navigation.take() else {
            return false;
        };
        tracing::debug!(section = %animation.section_id, "navigation cancelled");
        self.emit(EventKind::NavigationCancelled, &animation.section_id);
        true
    }

    // --- lifecycle ---

    /// Re-scan the page. Played items and visibility of surviving sections
    /// are kept, and an in-flight navigation continues untouched. The scroll
    /// position is only replaced when the snapshot reports one.
    pub fn refresh(&mut self, snapshot: PageSnapshot) {
        if self.destroyed {
            return;
        }
        self.sections = discover_sections(&snapshot, &self.config, &self.sections);
        if let Some(y) = snapshot.scroll_y {
            self.scroll_y = y;
        }
        self.snapshot = snapshot;

        let current_survives = self
            .current
            .as_deref()
            .is_some_and(|id| self.sections.iter().any(|s| s.id == id));
        if !current_survives {
            self.current = self.sections.first().map(|s| s.id.clone());
        }

        self.observer.reset();
        self.mount_progress();
        self.throttle.request();
        tracing::debug!(sections = self.sections.len(), "coordinator refreshed");
    }

    /// Detach from the host and release every resource. Safe to call more
    /// than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.cancel_navigation();
        self.destroyed = true;
        self.throttle.take();
        self.debounce.cancel();
        self.subscribers.clear();
        self.commands.push(FlowCommand::Detach);
        if let Some(progress) = self.progress.take()
            && progress.owned
        {
            self.commands.push(FlowCommand::UnmountProgress);
        }
        tracing::debug!("coordinator destroyed");
    }

    // --- internals ---

    fn touch_enabled(&self) -> bool {
        !self.destroyed && self.config.touch && self.env.touch_capable
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    fn navigate(&mut self, intent: NavIntent, now: f64) -> NavigationOutcome {
        let current = self.current.as_deref().and_then(|id| self.index_of(id));
        let Some(index) = resolve_intent(intent, current, self.sections.len()) else {
            return NavigationOutcome::UnknownSection;
        };
        let id = self.sections[index].id.clone();
        self.navigate_to_section(&id, now)
    }

    fn step_navigation(&mut self, now: f64) {
        let Some((y, done)) = self.navigation.as_ref().map(|anim| anim.sample(now)) else {
            return;
        };
        self.commands.push(FlowCommand::ScrollTo { y });
        self.on_scroll(y, now);
        if !done {
            return;
        }
        // Observe the final position first so sections entering on this
        // frame cannot take the current slot away from the target.
        if self.throttle.take() {
            self.handle_scroll(now);
        }
        let Some(animation) = self.navigation.take() else {
            return;
        };
        let landed = self.current.as_deref() == Some(animation.section_id.as_str());
        if !landed && self.index_of(&animation.section_id).is_some() {
            self.mark_current(&animation.section_id);
        }
        tracing::debug!(section = %animation.section_id, "navigation complete");
        self.emit(EventKind::NavigationComplete, &animation.section_id);
    }

    fn handle_scroll(&mut self, now: f64) {
        if self.config.intersection_source == IntersectionSource::Geometry {
            let entries = self.observer.observe(
                &self.sections,
                self.scroll_y,
                self.snapshot.viewport_height,
            );
            self.on_intersection(&entries, now);
        }

        if let Some(progress) = &mut self.progress {
            let percent = scroll_percent(
                self.scroll_y,
                self.snapshot.document_height,
                self.snapshot.viewport_height,
            );
            if percent != progress.percent {
                progress.percent = percent;
                self.commands.push(FlowCommand::SetProgress { percent });
            }
        }

        if !self.env.reduced_motion {
            self.commands.extend(scroll_effects(
                &mut self.sections,
                self.scroll_y,
                self.snapshot.viewport_height,
                &self.config,
            ));
        }
    }

    fn enter(&mut self, index: usize, now: f64) {
        let reduced_motion = self.env.reduced_motion;
        let section = &mut self.sections[index];
        section.is_visible = true;
        let id = section.id.clone();
        if !reduced_motion {
            for item in &mut section.items {
                item.schedule(now);
            }
        }

        self.commands.push(FlowCommand::SetSectionVisible {
            section_id: id.clone(),
            visible: true,
        });
        self.mark_current(&id);
        self.emit(EventKind::SectionEnter, &id);
    }

    /// Make `id` the current section and point the marker and nav link at it.
    fn mark_current(&mut self, id: &str) {
        self.current = Some(id.to_owned());
        if let Some(progress) = &mut self.progress
            && progress.set_active(id)
        {
            self.commands.push(FlowCommand::SetActiveMarker {
                section_id: id.to_owned(),
            });
        }
        self.commands.push(FlowCommand::HighlightNav {
            href: format!("#{id}"),
        });
    }

    fn leave(&mut self, index: usize) {
        let section = &mut self.sections[index];
        section.is_visible = false;
        let id = section.id.clone();
        self.commands.push(FlowCommand::SetSectionVisible {
            section_id: id.clone(),
            visible: false,
        });
        self.emit(EventKind::SectionLeave, &id);
    }

    fn reveal_due_items(&mut self, now: f64) {
        for section in &mut self.sections {
            for item in &mut section.items {
                if item.fire_if_due(now) {
                    self.commands.push(FlowCommand::RevealItem {
                        section_id: section.id.clone(),
                        item: item.key.clone(),
                    });
                }
            }
        }
    }

    fn mount_progress(&mut self) {
        if !self.config.progress_indicator {
            return;
        }
        let markers: Vec<String> = self.sections.iter().map(|s| s.id.clone()).collect();
        let owned = match &self.progress {
            Some(existing) => existing.owned,
            None => !self.snapshot.has_progress_indicator,
        };
        if owned {
            self.commands.push(FlowCommand::MountProgress {
                markers: markers.clone(),
            });
        }
        let previous = self.progress.replace(ProgressIndicator::new(markers, owned));
        if let Some(progress) = &mut self.progress {
            progress.percent = previous.map_or(0.0, |p| p.percent);
            if let Some(current) = &self.current {
                progress.set_active(current);
                self.commands.push(FlowCommand::SetActiveMarker {
                    section_id: current.clone(),
                });
            }
        }
    }

    fn emit(&mut self, kind: EventKind, section_id: &str) {
        let event = FlowEvent {
            kind,
            section_id: section_id.to_owned(),
            current_section: self.current.clone().unwrap_or_default(),
            scroll_direction: self.direction,
        };
        tracing::debug!(
            kind = ?event.kind,
            section = %event.section_id,
            current = %event.current_section,
            direction = event.scroll_direction.as_str(),
            "flow event"
        );
        self.subscribers.publish(&event);
    }
}

#[cfg(test)]
mod tests {
    use folio_flow_protocol::{PageNode, PageSnapshot};

    use super::*;

    fn page() -> PageSnapshot {
        let section = |id: &str, top: f64| {
            PageNode::new(top, 1000.0)
                .with_id(id)
                .with_class("portfolio-section")
                .with_child(PageNode::new(top, 100.0).with_class("section-header"))
                .with_child(PageNode::new(top + 100.0, 100.0).with_class("project-card"))
        };
        PageSnapshot {
            root: PageNode::default()
                .with_child(section("home", 0.0))
                .with_child(section("work", 1000.0)),
            viewport_height: 800.0,
            document_height: 2000.0,
            ..PageSnapshot::default()
        }
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(FlowConfig::default(), Environment::default(), page()).unwrap()
    }

    #[test]
    fn equal_scroll_positions_keep_direction() {
        let mut flow = coordinator();
        flow.on_scroll(300.0, 0.0);
        assert_eq!(flow.scroll_direction(), ScrollDirection::Down);
        flow.on_scroll(300.0, 1.0);
        assert_eq!(flow.scroll_direction(), ScrollDirection::Down);
        flow.on_scroll(100.0, 2.0);
        assert_eq!(flow.scroll_direction(), ScrollDirection::Up);
    }

    #[test]
    fn next_deadline_follows_stagger_and_debounce() {
        let mut flow = coordinator();
        assert_eq!(flow.next_deadline(), None);
        flow.on_frame(0.0);
        // Header revealed at once; the card waits one stagger step.
        assert_eq!(flow.next_deadline(), Some(100.0));
        flow.on_scroll(10.0, 20.0);
        assert_eq!(flow.next_deadline(), Some(100.0));
        flow.on_frame(100.0);
        assert_eq!(flow.next_deadline(), Some(170.0));
        flow.on_frame(170.0);
        assert_eq!(flow.next_deadline(), None);
        assert!(!flow.wants_frame());
    }

    #[test]
    fn navigation_target_is_clamped_to_scroll_range() {
        let mut flow = coordinator();
        flow.navigate_to_section("home", 0.0);
        assert_eq!(flow.navigation().map(|n| n.to), Some(0.0));
        flow.cancel_navigation();
        flow.navigate_to_section("work", 0.0);
        assert_eq!(flow.navigation().map(|n| n.to), Some(900.0));
    }

    #[test]
    fn cancel_releases_the_lock() {
        let mut flow = coordinator();
        assert!(!flow.cancel_navigation());
        flow.navigate_to_section("work", 0.0);
        assert!(flow.cancel_navigation());
        assert!(!flow.is_transitioning());
        assert_eq!(flow.navigate_to_section("work", 0.0), NavigationOutcome::Started);
    }

    #[test]
    fn empty_page_has_no_current_section() {
        let mut flow = Coordinator::new(
            FlowConfig::default(),
            Environment::default(),
            PageSnapshot::default(),
        )
        .unwrap();
        assert_eq!(flow.current_section(), None);
        assert_eq!(flow.navigate_to_next(0.0), NavigationOutcome::UnknownSection);
        flow.on_frame(0.0);
        flow.destroy();
        flow.destroy();
        assert!(flow.is_destroyed());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FlowConfig {
            section_classes: Vec::new(),
            ..FlowConfig::default()
        };
        assert!(Coordinator::new(config, Environment::default(), page()).is_err());
    }
}
