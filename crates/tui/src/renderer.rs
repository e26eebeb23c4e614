use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::stdout;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio_flow_core::Coordinator;
use folio_flow_protocol::{FlowCommand, NavKey, PageSnapshot};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

const FRAME: Duration = Duration::from_millis(16);
const IDLE: Duration = Duration::from_millis(250);
const WHEEL_STEP: f64 = 40.0;
const LOG_LINES: usize = 12;

/// What the page would look like after applying every command so far.
#[derive(Default)]
struct PageView {
    revealed: HashSet<(String, String)>,
    visible: HashSet<String>,
    effects: HashMap<String, f64>,
    percent: f64,
    markers: Vec<String>,
    active_marker: Option<String>,
    nav_href: Option<String>,
}

impl PageView {
    fn apply(&mut self, command: FlowCommand) {
        match command {
            // The coordinator already tracks its own scroll position; the
            // preview reads it back instead of keeping a second copy.
            FlowCommand::ScrollTo { .. } | FlowCommand::Detach => {}
            FlowCommand::RevealItem { section_id, item } => {
                self.revealed.insert((section_id, item));
            }
            FlowCommand::SetSectionVisible {
                section_id,
                visible,
            } => {
                if visible {
                    self.visible.insert(section_id);
                } else {
                    self.visible.remove(&section_id);
                }
            }
            FlowCommand::SectionEffect {
                section_id,
                opacity,
                ..
            } => {
                self.effects.insert(section_id, opacity);
            }
            FlowCommand::SetProgress { percent } => self.percent = percent,
            FlowCommand::SetActiveMarker { section_id } => self.active_marker = Some(section_id),
            FlowCommand::HighlightNav { href } => self.nav_href = Some(href),
            FlowCommand::MountProgress { markers } => self.markers = markers,
            FlowCommand::UnmountProgress => {
                self.markers.clear();
                self.active_marker = None;
            }
        }
    }
}

fn nav_key(code: KeyCode) -> Option<NavKey> {
    Some(match code {
        KeyCode::Down => NavKey::ArrowDown,
        KeyCode::Up => NavKey::ArrowUp,
        KeyCode::PageDown => NavKey::PageDown,
        KeyCode::PageUp => NavKey::PageUp,
        KeyCode::Char(' ') => NavKey::Space,
        KeyCode::Home => NavKey::Home,
        KeyCode::End => NavKey::End,
        _ => return None,
    })
}

pub fn run_preview(mut flow: Coordinator, snapshot: PageSnapshot) -> Result<()> {
    let log: Rc<RefCell<VecDeque<String>>> = Rc::new(RefCell::new(VecDeque::new()));
    let sink = Rc::clone(&log);
    flow.subscribe(move |event| {
        let mut log = sink.borrow_mut();
        log.push_back(format!(
            "{:?} {} ({})",
            event.kind,
            event.section_id,
            event.scroll_direction.as_str()
        ));
        while log.len() > LOG_LINES {
            log.pop_front();
        }
    });

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let started = Instant::now();
    let now = || started.elapsed().as_secs_f64() * 1000.0;
    let mut view = PageView::default();
    let max_scroll = snapshot.max_scroll();

    loop {
        flow.on_frame(now());
        for command in flow.take_commands() {
            view.apply(command);
        }

        terminal.draw(|frame| draw(frame, &flow, &view, &log.borrow()))?;

        let timeout = if flow.wants_frame() { FRAME } else { IDLE };
        if !event::poll(timeout)? {
            continue;
        }
        let scroll_by = |flow: &mut Coordinator, delta: f64| {
            let y = (flow.scroll_y() + delta).clamp(0.0, max_scroll);
            flow.on_scroll(y, now());
        };
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('j') => scroll_by(&mut flow, WHEEL_STEP),
                KeyCode::Char('k') => scroll_by(&mut flow, -WHEEL_STEP),
                KeyCode::Char('c') => {
                    flow.cancel_navigation();
                }
                KeyCode::Char('r') => {
                    let mut fresh = snapshot.clone();
                    fresh.scroll_y = Some(flow.scroll_y());
                    flow.refresh(fresh);
                }
                code => {
                    if let Some(key) = nav_key(code) {
                        flow.on_key(key, false, now());
                    }
                }
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => scroll_by(&mut flow, WHEEL_STEP),
                MouseEventKind::ScrollUp => scroll_by(&mut flow, -WHEEL_STEP),
                _ => {}
            },
            _ => {}
        }
    }

    flow.destroy();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn draw(frame: &mut Frame, flow: &Coordinator, view: &PageView, log: &VecDeque<String>) {
    let area = frame.area();

    let header_area = Rect::new(0, 0, area.width, 1);
    let header = Block::default()
        .title(format!(
            " folio-flow | {} | {} | {}| ↑↓ PgUp PgDn Home End navigate | j/k scroll | r refresh | q quit ",
            flow.current_section().unwrap_or("-"),
            flow.scroll_direction().as_str(),
            if flow.is_transitioning() { "navigating " } else { "" },
        ))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, header_area);

    let body = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(34)])
        .split(body);

    draw_page(frame, columns[0], flow, view);
    draw_sidebar(frame, columns[1], view, log);
}

/// Sections as stacked blocks, scaled so the page viewport fills the pane.
fn draw_page(frame: &mut Frame, area: Rect, flow: &Coordinator, view: &PageView) {
    let viewport = flow.snapshot().viewport_height.max(1.0);
    let scale = f64::from(area.height) / viewport;

    for section in flow.sections() {
        let top = ((section.extent.top - flow.scroll_y()) * scale).round() as i64;
        let height = (section.extent.height * scale).round().max(1.0) as i64;
        let bottom = top + height;
        if bottom <= 0 || top >= i64::from(area.height) {
            continue;
        }
        let clipped_top = top.max(0);
        let clipped_bottom = bottom.min(i64::from(area.height));
        let rect = Rect::new(
            area.x,
            area.y + clipped_top as u16,
            area.width,
            (clipped_bottom - clipped_top) as u16,
        );

        let visible = view.visible.contains(&section.id);
        let faded = view.effects.get(&section.id).is_some_and(|&o| o < 0.6);
        let mut style = Style::default().fg(if visible { Color::Green } else { Color::Gray });
        if faded {
            style = style.add_modifier(Modifier::DIM);
        }

        let lines: Vec<Line> = section
            .items
            .iter()
            .map(|item| {
                if view.revealed.contains(&(section.id.clone(), item.key.clone())) {
                    Line::from(format!("▸ {} ({})", item.key, item.role))
                } else {
                    Line::from("·").style(Style::default().fg(Color::DarkGray))
                }
            })
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(
                " {} · {:.0}% ",
                section.id,
                section.visibility() * 100.0
            ))
            .border_style(style);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll(((clipped_top - top) as u16, 0));
        frame.render_widget(paragraph, rect);
    }
}

fn draw_sidebar(frame: &mut Frame, area: Rect, view: &PageView, log: &VecDeque<String>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(view.markers.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((view.percent / 100.0).clamp(0.0, 1.0));
    frame.render_widget(gauge, rows[0]);

    let markers: Vec<ListItem> = view
        .markers
        .iter()
        .map(|id| {
            let active = view.active_marker.as_deref() == Some(id.as_str());
            let highlighted = view.nav_href.as_deref() == Some(format!("#{id}").as_str());
            let style = match (active, highlighted) {
                (true, _) => Style::default().fg(Color::Black).bg(Color::Green),
                (false, true) => Style::default().fg(Color::Green),
                _ => Style::default().fg(Color::Gray),
            };
            ListItem::new(format!("{} {id}", if active { "●" } else { "○" })).style(style)
        })
        .collect();
    frame.render_widget(
        List::new(markers).block(Block::default().borders(Borders::ALL).title(" sections ")),
        rows[1],
    );

    let events: Vec<ListItem> = log.iter().map(|line| ListItem::new(line.as_str())).collect();
    frame.render_widget(
        List::new(events).block(Block::default().borders(Borders::ALL).title(" events ")),
        rows[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_view_tracks_visibility_and_markers() {
        let mut view = PageView::default();
        view.apply(FlowCommand::MountProgress {
            markers: vec!["home".into(), "about".into()],
        });
        view.apply(FlowCommand::SetSectionVisible {
            section_id: "about".into(),
            visible: true,
        });
        view.apply(FlowCommand::SetActiveMarker {
            section_id: "about".into(),
        });
        view.apply(FlowCommand::SetSectionVisible {
            section_id: "about".into(),
            visible: false,
        });
        assert!(view.visible.is_empty());
        assert_eq!(view.active_marker.as_deref(), Some("about"));

        view.apply(FlowCommand::UnmountProgress);
        assert!(view.markers.is_empty());
        assert_eq!(view.active_marker, None);
    }

    #[test]
    fn terminal_keys_map_to_navigation() {
        assert_eq!(nav_key(KeyCode::Char(' ')), Some(NavKey::Space));
        assert_eq!(nav_key(KeyCode::End), Some(NavKey::End));
        assert_eq!(nav_key(KeyCode::Char('x')), None);
    }
}
