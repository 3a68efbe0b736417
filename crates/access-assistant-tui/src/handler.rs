use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use access_assistant_core::EnterAction;
use crate::app::App;
use crate::tui::AppEvent;

/// Rows moved per wheel notch or page key.
const SCROLL_STEP: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if key.code == KeyCode::Esc {
        app.controller.menu.escape();
        return;
    }

    if key.code == KeyCode::Char('n') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.controller.menu.toggle();
        return;
    }

    if app.controller.menu.is_open() {
        handle_menu_key(app, key);
    } else {
        handle_chat_key(app, key);
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    let controller = &mut app.controller;

    match key.code {
        // Dropdown triggers
        KeyCode::F(n @ 2..=9) => {
            controller.dropdowns.click_trigger(usize::from(n - 2));
        }

        KeyCode::PageUp => {
            controller.transcript.scroll_up(SCROLL_STEP);
        }
        KeyCode::PageDown => {
            controller.transcript.scroll_down(SCROLL_STEP);
        }
        KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
            controller.transcript.scroll_to_bottom();
        }

        KeyCode::Tab => controller.input.focus(),

        _ if !controller.input.is_focused() => {}

        KeyCode::Enter => {
            // Alt+Enter stands in for terminals that can't report Shift+Enter
            let newline = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
            match controller.enter_action(newline) {
                EnterAction::Submit => app.submit(),
                EnterAction::Newline => controller.input.insert_newline(),
                EnterAction::Ignore => {}
            }
        }
        KeyCode::Backspace => controller.input.backspace(),
        KeyCode::Delete => controller.input.delete(),
        KeyCode::Left => controller.input.move_left(),
        KeyCode::Right => controller.input.move_right(),
        KeyCode::Home => controller.input.move_home(),
        KeyCode::End => controller.input.move_end(),
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            controller.input.insert_char(c);
        }
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.controller.menu.is_open() || !app.controller.input.is_focused() {
        return;
    }
    let normalized = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ");
    app.controller.input.insert_str(&normalized);
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn hit(area: Option<Rect>, x: u16, y: u16) -> bool {
    area.map(|r| point_in_rect(x, y, r)).unwrap_or(false)
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_click(app, x, y),
        MouseEventKind::ScrollUp => {
            if !app.controller.menu.is_scroll_locked() && hit(app.areas.transcript, x, y) {
                app.controller.transcript.scroll_up(SCROLL_STEP);
            }
        }
        MouseEventKind::ScrollDown => {
            if !app.controller.menu.is_scroll_locked() && hit(app.areas.transcript, x, y) {
                app.controller.transcript.scroll_down(SCROLL_STEP);
            }
        }
        _ => {}
    }
}

fn handle_click(app: &mut App, x: u16, y: u16) {
    let controller = &mut app.controller;

    // The open menu covers the whole screen
    if controller.menu.is_open() {
        if hit(app.areas.menu_close, x, y) {
            controller.menu.close();
        } else {
            controller.menu.click_overlay(!hit(app.areas.menu_panel, x, y));
        }
        return;
    }

    if let Some(index) = app
        .areas
        .dropdown_triggers
        .iter()
        .position(|area| point_in_rect(x, y, *area))
    {
        controller.dropdowns.click_trigger(index);
        return;
    }
    if hit(app.areas.dropdown_content, x, y) {
        return;
    }
    controller.dropdowns.click_outside();

    if hit(app.areas.menu_toggle, x, y) {
        controller.menu.open();
    } else if hit(app.areas.send, x, y) {
        if controller.is_send_enabled() {
            app.submit();
        }
    } else if hit(app.areas.input, x, y) {
        controller.input.focus();
    } else if hit(app.areas.transcript, x, y) {
        controller.input.blur();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_assistant_core::{ChatClient, ChatError, Config};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::time::Duration;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn test_app(endpoint: &str) -> App {
        App::new(ChatClient::new(endpoint), &Config::new())
    }

    async fn wait_for_reply(app: &mut App) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while app.pending.is_some() {
                tokio::time::sleep(Duration::from_millis(10)).await;
                app.poll_pending().await;
            }
        })
        .await
        .expect("request did not settle");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        type_text(&mut app, "line one");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut app, "two");

        assert_eq!(app.controller.input.text(), "line one\ntwo");
        assert!(app.pending.is_none());
        assert!(app.controller.history.is_empty());
    }

    #[tokio::test]
    async fn test_enter_submits_and_renders_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"Hi there"}}]}"#)
            .create_async()
            .await;

        let mut app = test_app(&format!("{}/api/chat", server.url()));
        type_text(&mut app, "Hello");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));

        assert!(app.controller.is_loading());
        assert!(app.controller.input.is_empty());

        // typing and a second Enter are dropped while loading
        type_text(&mut app, "again");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.controller.history.len(), 1);

        wait_for_reply(&mut app).await;
        assert!(!app.controller.is_loading());
        let contents: Vec<&str> = app
            .controller
            .history
            .iter()
            .map(|m| m.content())
            .collect();
        assert_eq!(contents, vec!["Hello", "Hi there"]);
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_does_nothing() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.pending.is_none());
        assert!(app.controller.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_rolls_back_turn() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("{}")
            .create_async()
            .await;

        let mut app = test_app(&format!("{}/api/chat", server.url()));
        type_text(&mut app, "Test");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.controller.history.len(), 1);

        wait_for_reply(&mut app).await;

        assert!(app.controller.history.is_empty());
        assert_eq!(app.controller.transcript.len(), 1);
        assert_eq!(app.controller.transcript.entries()[0].content, "Test");
        let error = app.controller.error().expect("error shown");
        assert!(error.contains("Server error: 500"));
        assert!(!app.controller.is_loading());
        assert!(app.controller.input.is_focused());
    }

    #[tokio::test]
    async fn test_interrupted_request_rolls_back_turn() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        app.controller.input.insert_str("Hello");
        assert!(app.controller.begin_submit(std::time::Instant::now()).is_some());

        let task = tokio::spawn(std::future::pending::<Result<String, ChatError>>());
        task.abort();
        app.pending = Some(task);

        wait_for_reply(&mut app).await;

        assert!(app.controller.history.is_empty());
        let error = app.controller.error().expect("error shown");
        assert!(error.starts_with("Unable to send message: Request interrupted: "));
        assert!(!app.controller.is_loading());
    }

    #[test]
    fn test_ctrl_n_toggles_menu() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        handle_event(&mut app, key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert!(app.controller.menu.is_open());
        handle_event(&mut app, key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert!(!app.controller.menu.is_open());
    }

    #[test]
    fn test_escape_closes_menu() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        handle_event(&mut app, key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert!(app.controller.menu.is_open());
        assert!(app.controller.menu.is_scroll_locked());

        // keys other than Escape don't reach the input while the menu is open
        type_text(&mut app, "x");
        assert!(app.controller.input.is_empty());

        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.controller.menu.is_open());
    }

    #[test]
    fn test_menu_clicks() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        app.areas.menu_toggle = Some(Rect::new(0, 0, 3, 1));
        app.areas.menu_panel = Some(Rect::new(0, 0, 30, 20));
        app.areas.menu_close = Some(Rect::new(26, 0, 3, 1));

        handle_event(&mut app, click(1, 0));
        assert!(app.controller.menu.is_open());

        // inside the panel keeps it open
        handle_event(&mut app, click(10, 5));
        assert!(app.controller.menu.is_open());

        // backdrop closes it
        handle_event(&mut app, click(50, 5));
        assert!(!app.controller.menu.is_open());

        handle_event(&mut app, click(1, 0));
        handle_event(&mut app, click(27, 0));
        assert!(!app.controller.menu.is_open());
    }

    #[test]
    fn test_dropdown_clicks() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        app.areas.dropdown_triggers = vec![Rect::new(20, 0, 8, 1), Rect::new(30, 0, 8, 1)];

        handle_event(&mut app, click(21, 0));
        assert_eq!(app.controller.dropdowns.open_index(), Some(0));

        handle_event(&mut app, click(31, 0));
        assert_eq!(app.controller.dropdowns.open_index(), Some(1));

        app.areas.dropdown_content = Some(Rect::new(30, 1, 20, 4));
        handle_event(&mut app, click(35, 2));
        assert_eq!(app.controller.dropdowns.open_index(), Some(1));

        handle_event(&mut app, click(5, 10));
        assert_eq!(app.controller.dropdowns.open_index(), None);
    }

    #[test]
    fn test_dropdown_function_keys() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        handle_event(&mut app, key(KeyCode::F(3), KeyModifiers::NONE));
        assert_eq!(app.controller.dropdowns.open_index(), Some(1));
        handle_event(&mut app, key(KeyCode::F(3), KeyModifiers::NONE));
        assert_eq!(app.controller.dropdowns.open_index(), None);
    }

    #[test]
    fn test_wheel_ignored_while_scroll_locked() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        app.areas.transcript = Some(Rect::new(0, 1, 80, 20));
        let now = std::time::Instant::now();
        for _ in 0..20 {
            app.controller
                .transcript
                .append(access_assistant_core::ChatRole::User, "hi", now);
        }
        // 20 blocks of label, one content row and a blank line
        app.controller.transcript.layout(60, 20);
        let bottom = app.controller.transcript.scroll();

        app.controller.menu.open();
        handle_event(
            &mut app,
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 5,
                row: 5,
                modifiers: KeyModifiers::NONE,
            }),
        );
        assert_eq!(app.controller.transcript.scroll(), bottom);

        app.controller.menu.close();
        handle_event(
            &mut app,
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 5,
                row: 5,
                modifiers: KeyModifiers::NONE,
            }),
        );
        assert_eq!(app.controller.transcript.scroll(), bottom - SCROLL_STEP);
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut app = test_app("http://127.0.0.1:9/api/chat");
        handle_event(&mut app, AppEvent::Paste("a\r\nb\tc".to_string()));
        assert_eq!(app.controller.input.text(), "a\nb    c");
    }
}
