use folio_core::models::ViewId;
use folio_core::offline::CacheStatus;
use folio_core::orchestrator::{RecoveryAction, Surface, TransitionFrame};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::time::Instant;

use crate::app::{App, AppState};

use super::styles;
use super::views::{self, skeleton};

/// Terminals at least this wide always show the sidebar.
const SIDEBAR_MIN_TERMINAL_WIDTH: u16 = 80;

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 22;

struct Areas {
    title: Rect,
    tabs: Rect,
    sidebar: Option<Rect>,
    content: Rect,
    status: Rect,
}

fn layout(area: Rect, menu_open: bool) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let (sidebar, content) = if area.width >= SIDEBAR_MIN_TERMINAL_WIDTH || menu_open {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
            .split(rows[2]);
        (Some(cols[0]), cols[1])
    } else {
        (None, rows[2])
    };

    Areas {
        title: rows[0],
        tabs: rows[1],
        sidebar,
        content,
        status: rows[3],
    }
}

/// Interior of the content block.
fn content_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Tell the orchestrator how tall the displayed view is and where the home
/// sections sit, for the current terminal size.
pub fn sync_layout(app: &mut App, area: Rect) {
    let inner = content_inner(layout(area, app.orchestrator.menu_open()).content);
    let view = app.orchestrator.displayed_view();
    let (height, sections) = match app.orchestrator.content(view) {
        Some(content) => {
            let built = views::build(app, content, inner.width);
            (built.len(), built.sections)
        }
        None => (0, Vec::new()),
    };
    app.orchestrator
        .set_layout(height, inner.height as usize, sections);
}

pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area(), app.orchestrator.menu_open());

    render_title_bar(frame, areas.title);
    render_tabs(frame, app, areas.tabs);
    if let Some(sidebar) = areas.sidebar {
        render_sidebar(frame, app, sidebar);
    }
    render_main_content(frame, app, areas.content);
    render_status_bar(frame, app, areas.status);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Folio";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4) as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.orchestrator.route().view;
    let mut spans = vec![Span::raw(" ")];
    for (i, view) in ViewId::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, view.title());
        spans.push(Span::styled(label, styles::tab_style(*view == current)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.orchestrator.route().view;
    let mut lines = Vec::new();

    for view in ViewId::ALL {
        let style = if view == current {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(Span::styled(format!(" {:<18}", view.title()), style)));
    }

    // Sections only exist while the home view is on screen.
    if let Some(active) = app.orchestrator.active_section() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Sections", styles::muted_style())));
        for section in folio_core::models::SectionId::ALL {
            let (marker, style) = if section == active {
                ("▸", styles::highlight_style())
            } else {
                (" ", styles::muted_style())
            };
            lines.push(Line::from(Span::styled(
                format!(" {} {}", marker, section.title()),
                style,
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.orchestrator.menu_open()))
        .title(" Menu ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let surface = app.orchestrator.surface();
    let focused = app.orchestrator.is_interactive();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match surface {
        Surface::Recovery { view, message } => render_recovery(frame, view, message, inner),
        Surface::LoadingIndicator(view) => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  Loading {}...", view.title()),
                    styles::muted_style(),
                )),
            ];
            frame.render_widget(Paragraph::new(text), inner);
        }
        Surface::Skeleton(_) | Surface::Ready(..) => {
            let view = app.orchestrator.displayed_view();
            let Some(content) = app.orchestrator.content(view) else {
                return;
            };
            let built = views::build(app, content, inner.width);
            let lines = if matches!(surface, Surface::Skeleton(_)) {
                skeleton::skeletonize(&built.lines, styles::skeleton_style(app.skeleton_pulse))
            } else {
                built.lines
            };
            let frame_state = app.orchestrator.transition_frame(Instant::now());
            render_sliding(frame, lines, app.orchestrator.scroll_offset(), frame_state, inner);
        }
    }
}

/// Draw `lines` shifted horizontally by the transition offset.
fn render_sliding(
    frame: &mut Frame,
    lines: Vec<Line<'static>>,
    scroll: usize,
    state: TransitionFrame,
    area: Rect,
) {
    let shift = ((state.offset.abs() * area.width as f32).round() as u16).min(area.width);
    let visible = Rect {
        x: if state.offset > 0.0 { area.x + shift } else { area.x },
        width: area.width - shift,
        ..area
    };
    // Sliding left hides the leading columns instead of the trailing ones.
    let column = if state.offset < 0.0 { shift } else { 0 };
    let row = scroll.min(u16::MAX as usize) as u16;

    let paragraph = Paragraph::new(lines)
        .style(styles::fade_style(state.opacity))
        .scroll((row, column));
    frame.render_widget(paragraph, visible);
}

fn render_recovery(frame: &mut Frame, view: ViewId, message: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Something went wrong", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("  The {} view could not be loaded:", view.title()),
            styles::muted_style(),
        )),
        Line::from(Span::styled(format!("  {}", message), styles::list_item_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [R] ", styles::help_key_style()),
            Span::styled(RecoveryAction::Reload.label(), styles::help_desc_style()),
            Span::styled("   [r] ", styles::help_key_style()),
            Span::styled(RecoveryAction::Retry.label(), styles::help_desc_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn cache_summary(app: &App) -> String {
    if !app.has_worker() {
        return "bundled content".to_string();
    }
    match &app.cache_status {
        Some(status) => describe_cache(status),
        None => "cache starting".to_string(),
    }
}

fn describe_cache(status: &CacheStatus) -> String {
    let state = format!("{:?}", status.state).to_lowercase();
    match status.caches.iter().find(|c| c.name == status.precache) {
        Some(precache) => {
            let updated = precache
                .age_display()
                .map(|age| format!(", {}", age))
                .unwrap_or_default();
            format!(
                "cache {}, {} entries ({}){}",
                state,
                precache.entries,
                precache.size_display(),
                updated
            )
        }
        None => format!("cache {}", state),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match &app.status_message {
        Some(msg) => format!(" {} ", msg),
        None => format!(" {} ", app.orchestrator.route().path),
    };
    let (connectivity, connectivity_style) = if app.connectivity.is_online() {
        ("Online", styles::success_style())
    } else {
        ("Offline", styles::error_style())
    };
    let right_text = format!(" {} | [o]nline | [q]uit ", cache_summary(app));

    let width = area.width as usize;
    let center_start = width.saturating_sub(connectivity.len()) / 2;
    let left_pad = center_start.saturating_sub(left_text.chars().count());
    let right_start = center_start + connectivity.len();
    let right_pad = width
        .saturating_sub(right_start)
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(left_pad)),
        Span::styled(connectivity, connectivity_style),
        Span::raw(" ".repeat(right_pad)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn logo() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("      ╔═╗╔═╗╦  ╦╔═╗", styles::title_style())),
        Line::from(Span::styled("      ╠╣ ║ ║║  ║║ ║", styles::title_style())),
        Line::from(Span::styled("      ╚  ╚═╝╩═╝╩╚═╝", styles::title_style())),
    ]
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let mut help_text = logo();
    help_text.extend([
        Line::from(Span::styled(
            format!("           version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-4", "Switch views"),
        help_line("←/→", "Previous/next view"),
        help_line("↑/↓", "Scroll"),
        help_line("PgUp/PgDn", "Scroll a page"),
        help_line("Tab", "Next section (home)"),
        help_line("m", "Toggle menu"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("e", "Write a message (contact)"),
        help_line("o", "Toggle online/offline"),
        help_line("r / R", "Try again / refresh page"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let outer = Rect::new(0, 0, 30, 10);
        assert_eq!(centered_rect_fixed(20, 4, outer), Rect::new(5, 3, 20, 4));
        assert_eq!(centered_rect_fixed(50, 20, outer), Rect::new(0, 0, 30, 10));
    }

    #[test]
    fn test_describe_cache() {
        use folio_core::offline::{CacheSummary, WorkerState};

        let mut status = CacheStatus {
            state: WorkerState::Installing,
            controlling: false,
            precache: "portfolio-cache-v1".to_string(),
            runtime: "portfolio-runtime-v1".to_string(),
            caches: Vec::new(),
        };
        assert_eq!(describe_cache(&status), "cache installing");

        status.state = WorkerState::Activated;
        status.caches.push(CacheSummary {
            name: "portfolio-cache-v1".to_string(),
            entries: 4,
            bytes: 2048,
            updated_at: None,
        });
        assert_eq!(describe_cache(&status), "cache activated, 4 entries (2.0 KiB)");
    }

    #[test]
    fn test_sidebar_hidden_on_narrow_terminals() {
        assert!(layout(Rect::new(0, 0, 100, 30), false).sidebar.is_some());
        assert!(layout(Rect::new(0, 0, 60, 30), false).sidebar.is_none());
        assert!(layout(Rect::new(0, 0, 60, 30), true).sidebar.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_loading_then_skeleton() {
        let mut app = App::new(Config::default(), None).expect("app");
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");

        terminal.draw(|f| render(f, &app)).expect("draw");
        assert!(buffer_text(&terminal).contains("Loading Home..."));

        for _ in 0..5 {
            tokio::task::yield_now().await;
            app.tick();
        }
        sync_layout(&mut app, Rect::new(0, 0, 100, 30));
        terminal.draw(|f| render(f, &app)).expect("draw");
        let text = buffer_text(&terminal);
        assert!(!text.contains("Loading Home..."));
        assert!(text.contains("▒"));
        assert!(text.contains("Sections"));
    }
}
