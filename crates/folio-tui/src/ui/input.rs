//! Keyboard and mouse input handling for the TUI.
//!
//! Translates terminal events into application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use folio_core::models::ViewId;
use folio_core::orchestrator::RecoveryAction;

use crate::app::{App, AppState, FormFocus, PAGE_SCROLL_SIZE, WHEEL_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if app.editing_form {
        handle_form_input(app, key);
        return Ok(false);
    }

    // Recovery panel keys take precedence while the boundary is tripped.
    if app.orchestrator.boundary().is_tripped() {
        match key.code {
            KeyCode::Char('r') => {
                app.recover(RecoveryAction::Retry);
                return Ok(false);
            }
            KeyCode::Char('R') => {
                app.recover(RecoveryAction::Reload);
                return Ok(false);
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('R') => app.recover(RecoveryAction::Reload),

        // View switching
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.navigate_to(ViewId::ALL[index]);
        }
        KeyCode::Left => app.prev_view(),
        KeyCode::Right => app.next_view(),

        // Scrolling
        KeyCode::Up | KeyCode::Char('k') => app.scroll(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll(1),
        KeyCode::PageUp => app.scroll(-PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.scroll(PAGE_SCROLL_SIZE),
        KeyCode::Tab => app.next_section(),

        KeyCode::Char('m') => app.toggle_menu(),
        KeyCode::Esc if app.orchestrator.menu_open() => app.toggle_menu(),
        KeyCode::Char('o') => app.toggle_connectivity(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_editing(),
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Tab | KeyCode::Down => app.form_focus = app.form_focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.form_focus = app.form_focus.prev(),
        KeyCode::Enter => match app.form_focus {
            FormFocus::Send => app.submit_form(),
            FormFocus::Field(_) => app.form_focus = app.form_focus.next(),
        },
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input(c),
        _ => {}
    }
}

/// Handle mouse input. Only the wheel does anything.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll(-WHEEL_SCROLL_SIZE),
        MouseEventKind::ScrollDown => app.scroll(WHEEL_SCROLL_SIZE),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use folio_core::config::Config;
    use folio_core::contact::ContactField;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(Config::default(), None).expect("app")
    }

    #[tokio::test(start_paused = true)]
    async fn test_number_keys_switch_views() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('3'))).expect("input");
        assert_eq!(app.orchestrator.route().view, ViewId::Poc);
        handle_input(&mut app, key(KeyCode::Right)).expect("input");
        assert_eq!(app.orchestrator.route().view, ViewId::Contact);
        handle_input(&mut app, key(KeyCode::Left)).expect("input");
        assert_eq!(app.orchestrator.route().view, ViewId::Poc);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_requires_confirmation() {
        let mut app = app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).expect("input"));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).expect("input"));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).expect("input");
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).expect("input"));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_overlay_swallows_keys() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('?'))).expect("input");
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, key(KeyCode::Char('2'))).expect("input");
        assert_eq!(app.orchestrator.route().view, ViewId::Home);
        handle_input(&mut app, key(KeyCode::Esc)).expect("input");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_and_connectivity_toggles() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('m'))).expect("input");
        assert!(app.orchestrator.menu_open());
        handle_input(&mut app, key(KeyCode::Esc)).expect("input");
        assert!(!app.orchestrator.menu_open());

        handle_input(&mut app, key(KeyCode::Char('o'))).expect("input");
        assert!(!app.connectivity.is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_form_keys_edit_focused_field() {
        let mut app = app();
        app.editing_form = true;
        handle_input(&mut app, key(KeyCode::Char('A'))).expect("input");
        handle_input(&mut app, key(KeyCode::Char('d'))).expect("input");
        handle_input(&mut app, key(KeyCode::Backspace)).expect("input");
        assert_eq!(app.form.name, "A");

        handle_input(&mut app, key(KeyCode::Tab)).expect("input");
        assert_eq!(app.form_focus, FormFocus::Field(ContactField::Email));
        // 'q' is text while editing, not quit
        handle_input(&mut app, key(KeyCode::Char('q'))).expect("input");
        assert_eq!(app.form.email, "q");
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Esc)).expect("input");
        assert!(!app.editing_form);
    }
}
