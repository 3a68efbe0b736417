use std::time::Instant;

use access_assistant_core::input::wrapped_rows;
use access_assistant_core::ChatRole;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, HitAreas};

const SEND_BUTTON_WIDTH: u16 = 14;
const MENU_WIDTH: u16 = 44;
const MAX_ERROR_ROWS: u16 = 3;

/// Make text safe to draw verbatim: tabs become spaces and other control
/// characters are shown as their Unicode control pictures.
fn literal(text: &str) -> String {
    text.chars()
        .flat_map(|c| {
            let shown = match c {
                '\t' => return vec![' '; 4],
                '\u{0}'..='\u{1f}' => char::from_u32(0x2400 + c as u32).unwrap_or('\u{fffd}'),
                '\u{7f}' => '\u{2421}',
                c if c.is_control() => '\u{fffd}',
                c => c,
            };
            vec![shown]
        })
        .collect()
}

/// Break input text into rows of at most `width` characters, honouring
/// newlines. Matches the field's row counting: a line that fills its last
/// row exactly is followed by an empty row for the cursor.
fn hard_wrap(text: &str, width: u16) -> Vec<String> {
    let width = width.max(1) as usize;
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
        if chars.len() % width == 0 {
            rows.push(String::new());
        }
    }
    rows
}

/// Terminal cells a character takes up.
fn cell_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    Span::raw(&*c.encode_utf8(&mut buf)).width()
}

/// Word-wrap one line of display text into rows no wider than `width` cells.
/// Words longer than a row are broken; spaces at a break are dropped.
fn word_wrap(text: &str, width: u16) -> Vec<String> {
    fn flush(rows: &mut Vec<String>, row: &mut String) {
        rows.push(row.trim_end_matches(' ').to_string());
        row.clear();
    }

    let width = width.max(1) as usize;
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;

    for word in text.split_inclusive(' ') {
        let word_width: usize = word.trim_end_matches(' ').chars().map(cell_width).sum();
        if used > 0 && used + word_width > width {
            flush(&mut rows, &mut row);
            used = 0;
        }
        for c in word.chars() {
            let w = cell_width(c);
            if used > 0 && used + w > width {
                if c == ' ' {
                    continue;
                }
                flush(&mut rows, &mut row);
                used = 0;
            }
            row.push(c);
            used += w;
        }
    }
    flush(&mut rows, &mut row);
    rows
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    app.areas = HitAreas::default();

    // The input measures its content before the layout is fixed
    let input_inner_width = area.width.saturating_sub(SEND_BUTTON_WIDTH + 2);
    app.controller.input.set_wrap_width(input_inner_width);
    let input_height = app.controller.input.rows() + 2;

    let error_height = app
        .controller
        .error()
        .map(|message| wrapped_rows(message, area.width.max(1)).min(MAX_ERROR_ROWS))
        .unwrap_or(0);

    // Main layout: header, transcript, error region, input
    let [header_area, body_area, error_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(error_height),
        Constraint::Length(input_height),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, body_area);
    render_error(app, frame, error_area);
    render_input(app, frame, input_area);

    // Popups (in order of priority)
    if app.controller.menu.is_open() {
        render_menu(app, frame, area);
    } else if app.controller.dropdowns.open_index().is_some() {
        render_dropdown(app, frame, area);
    }
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let bar = Style::default().bg(Color::DarkGray);

    let toggle = Span::styled(" ☰ ", Style::default().fg(Color::White).bg(Color::Blue).bold());
    let title = Span::styled(" Access Assistant ", Style::default().fg(Color::Cyan).bold());
    let version = Span::styled(
        format!("v{}  ", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    );

    let mut x = area.x;
    app.areas.menu_toggle = Some(Rect::new(x, area.y, toggle.width() as u16, 1));
    x += (toggle.width() + title.width() + version.width()) as u16;

    let mut spans = vec![toggle, title, version];
    for (i, dropdown) in app.dropdowns.iter().enumerate() {
        let open = app.controller.dropdowns.is_open(i);
        let style = if open {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        let trigger = Span::styled(format!(" {} ▾ ", dropdown.label), style);
        let width = trigger.width() as u16;
        if x + width > area.right() {
            break;
        }
        app.areas.dropdown_triggers.push(Rect::new(x, area.y, width, 1));
        x += width + 1;
        spans.push(trigger);
        spans.push(Span::raw(" "));
    }

    let header = Paragraph::new(Line::from(spans)).style(bar);
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    app.areas.transcript = Some(area);

    let loading = app.controller.is_loading();
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    // Every line below is exactly one row, so the line count is the height
    // the scroll offset is fitted to
    let transcript = &app.controller.transcript;
    let lines: Vec<Line<'static>> = if transcript.is_empty() && !loading {
        vec![Line::from(Span::styled(
            "Ask a question to get started.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let now = Instant::now();
        let mut lines: Vec<Line<'static>> = Vec::new();

        for entry in transcript.entries() {
            // New blocks start lower and dim, then settle
            for _ in 0..entry.offset_rows(now) {
                lines.push(Line::default());
            }
            let settled = entry.is_settled(now);

            let label_color = match entry.role {
                ChatRole::User => Color::Cyan,
                ChatRole::Assistant => Color::Yellow,
            };
            let mut label_style = Style::default().fg(label_color).add_modifier(Modifier::BOLD);
            let mut content_style = Style::default();
            if !settled {
                label_style = label_style.add_modifier(Modifier::DIM);
                content_style = content_style.add_modifier(Modifier::DIM);
            }

            lines.push(Line::from(Span::styled(entry.label(), label_style)));
            for line in entry.content.split('\n') {
                for row in word_wrap(&literal(line), inner_width) {
                    lines.push(Line::from(Span::styled(row, content_style)));
                }
            }
            lines.push(Line::default());
        }

        if loading {
            lines.push(Line::from(Span::styled(
                ChatRole::Assistant.label(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Sending{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    };

    let content_rows = lines.len().min(u16::MAX as usize) as u16;
    app.controller.transcript.layout(content_rows, inner_height);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.controller.transcript.scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn render_error(app: &App, frame: &mut Frame, area: Rect) {
    let Some(message) = app.controller.error() else {
        return;
    };
    if area.height == 0 {
        return;
    }

    let error = Paragraph::new(literal(message))
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    frame.render_widget(error, area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [field_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(area);

    app.areas.input = Some(field_area);
    app.areas.send = Some(send_area);

    let input = &app.controller.input;
    let disabled = input.is_disabled();
    let border_color = if disabled {
        Color::DarkGray
    } else if input.is_focused() {
        Color::Yellow
    } else {
        Color::Gray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message (Enter to send, Shift+Enter for new line) ");
    let inner = block.inner(field_area);

    let visible_rows = input.rows().min(inner.height.max(1));
    let (cursor_row, cursor_col) = input.cursor_position();
    let scroll = cursor_row.saturating_sub(visible_rows.saturating_sub(1));

    let field = if input.is_empty() {
        Paragraph::new(Span::styled(
            app.controller.placeholder().to_string(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let lines: Vec<Line> = hard_wrap(input.text(), inner.width)
            .into_iter()
            .map(|row| Line::from(literal(&row)))
            .collect();
        let style = if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Paragraph::new(lines).style(style).scroll((scroll, 0))
    };
    frame.render_widget(field.block(block), field_area);

    // Show cursor when the field can take input
    if input.is_focused() && !disabled && !app.controller.menu.is_open() {
        frame.set_cursor_position((
            inner.x + cursor_col.min(inner.width.saturating_sub(1)),
            inner.y + cursor_row - scroll,
        ));
    }

    let send_style = if app.controller.is_send_enabled() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let send = Paragraph::new(app.controller.send_label().to_string())
        .style(send_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(send_style),
        );
    frame.render_widget(send, send_area);
}

fn render_dropdown(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(index) = app.controller.dropdowns.open_index() else {
        return;
    };
    let (Some(trigger), Some(dropdown)) =
        (app.areas.dropdown_triggers.get(index), app.dropdowns.get(index))
    else {
        return;
    };

    let content_width = dropdown
        .items
        .iter()
        .map(|item| Span::raw(item.as_str()).width())
        .max()
        .unwrap_or(0) as u16;
    let popup_width = (content_width + 4).min(area.width);
    let popup_height = (dropdown.items.len() as u16 + 2).min(area.height.saturating_sub(1));
    let popup_x = trigger.x.min(area.right().saturating_sub(popup_width));
    let popup_area = Rect::new(popup_x, trigger.y + 1, popup_width, popup_height);
    app.areas.dropdown_content = Some(popup_area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = dropdown
        .items
        .iter()
        .map(|item| ListItem::new(format!(" {} ", literal(item))))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(list, popup_area);
}

fn render_menu(app: &mut App, frame: &mut Frame, area: Rect) {
    // Dim everything behind the panel
    frame.render_widget(
        Block::default().style(Style::default().fg(Color::DarkGray).bg(Color::Black)),
        area,
    );

    let panel = Rect::new(area.x, area.y, MENU_WIDTH.min(area.width), area.height);
    app.areas.menu_panel = Some(panel);

    frame.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Menu ");
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    if panel.width >= 6 {
        let close = Rect::new(panel.right() - 5, panel.y, 3, 1);
        app.areas.menu_close = Some(close);
        frame.render_widget(
            Paragraph::new(" ✕ ").style(Style::default().fg(Color::White).bg(Color::Red)),
            close,
        );
    }

    let key = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<14}", keys), Style::default().fg(Color::Yellow)),
            Span::raw(action),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Access Assistant", Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled("Endpoint", Style::default().bold())),
        Line::from(literal(app.client.endpoint())),
        Line::default(),
        Line::from(Span::styled("Keys", Style::default().bold())),
        key("Enter", "send message"),
        key("Shift+Enter", "new line (Alt+Enter)"),
        key("F2-F4", "open a header menu"),
        key("PgUp/PgDn", "scroll conversation"),
        key("Ctrl+N", "open this menu"),
        key("Esc", "close this menu"),
        key("q", "quit (from this menu)"),
        key("Ctrl+C", "quit"),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_assistant_core::{ChatClient, Config};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn test_app() -> App {
        App::new(ChatClient::new("http://localhost:5000/api/chat"), &Config::new())
    }

    #[test]
    fn test_literal_shows_control_characters() {
        assert_eq!(literal("a\tb"), "a    b");
        assert_eq!(literal("\u{1b}[31m"), "\u{241b}[31m");
        assert_eq!(literal("<b>bold</b>"), "<b>bold</b>");
    }

    #[test]
    fn test_hard_wrap() {
        assert_eq!(hard_wrap("abcdef\n\nxy", 4), vec!["abcd", "ef", "", "xy"]);
        assert_eq!(hard_wrap("abcd", 4), vec!["abcd", ""]);
    }

    #[test]
    fn test_word_wrap() {
        assert_eq!(word_wrap("one two three", 8), vec!["one two", "three"]);
        assert_eq!(word_wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(word_wrap("", 4), vec![""]);
        // wide characters take two cells each
        assert_eq!(word_wrap("日本語です", 4), vec!["日本", "語で", "す"]);
    }

    #[test]
    fn test_wrapped_reply_stays_fully_visible() {
        let mut app = test_app();
        let now = Instant::now();
        for _ in 0..3 {
            app.controller.transcript.append(ChatRole::User, "hi", now);
        }
        let reply = format!("{} ZZZZZZZZZZZZZZZ", vec!["aaaaaaaaaaaaaaa"; 5].join(" "));
        app.controller.transcript.append(ChatRole::Assistant, reply, now);

        let screen = draw(&mut app, 30, 12);
        assert!(screen.contains("ZZZZZZZZZZZZZZZ"), "newest line hidden:\n{}", screen);
    }

    #[test]
    fn test_tabbed_reply_stays_fully_visible() {
        let mut app = test_app();
        let now = Instant::now();
        for _ in 0..4 {
            app.controller.transcript.append(ChatRole::User, "hi", now);
        }
        app.controller
            .transcript
            .append(ChatRole::Assistant, "\tx\tx\tx\tx\tx\tx\tEND", now);

        let screen = draw(&mut app, 30, 12);
        assert!(screen.contains("END"), "newest line hidden:\n{}", screen);
    }

    #[test]
    fn test_full_row_of_input_stays_visible() {
        let mut app = test_app();
        // 80 columns leave 64 for text beside the send button
        app.controller.input.insert_str(&"Q".repeat(64));

        let screen = draw(&mut app, 80, 24);
        assert!(screen.contains(&"Q".repeat(64)), "input text hidden:\n{}", screen);
        assert_eq!(app.areas.input.map(|r| r.height), Some(4));
    }

    #[test]
    fn test_renders_conversation_with_labels() {
        let mut app = test_app();
        let now = Instant::now();
        app.controller.transcript.append(ChatRole::User, "Hello", now);
        app.controller.transcript.append(ChatRole::Assistant, "**Hi** there", now);

        let screen = draw(&mut app, 80, 24);
        assert!(screen.contains("You"));
        assert!(screen.contains("Hello"));
        assert!(screen.contains("Assistant"));
        // markup is shown as typed
        assert!(screen.contains("**Hi** there"));
    }

    #[test]
    fn test_renders_loading_affordances() {
        let mut app = test_app();
        app.controller.input.insert_str("Hello");
        app.controller.begin_submit(Instant::now());

        let screen = draw(&mut app, 100, 24);
        assert!(screen.contains("Sending..."));
        assert!(screen.contains("Sending message..."));
    }

    #[test]
    fn test_renders_placeholder_and_error() {
        let mut app = test_app();
        app.controller.show_error("Unable to send message: boom.", Instant::now());

        let screen = draw(&mut app, 100, 24);
        assert!(screen.contains("Unable to send message: boom."));
        assert!(screen.contains("Ask me about Informatica access"));
        assert!(screen.contains("Send"));
    }

    #[test]
    fn test_records_hit_areas() {
        let mut app = test_app();
        draw(&mut app, 100, 24);

        assert_eq!(app.areas.menu_toggle, Some(Rect::new(0, 0, 3, 1)));
        assert_eq!(app.areas.dropdown_triggers.len(), 3);
        assert!(app.areas.send.is_some());
        assert!(app.areas.menu_panel.is_none());

        app.controller.menu.open();
        let screen = draw(&mut app, 100, 24);
        assert!(app.areas.menu_panel.is_some());
        assert!(app.areas.menu_close.is_some());
        assert!(screen.contains("localhost:5000/api/chat"));
    }

    #[test]
    fn test_renders_open_dropdown() {
        let mut app = test_app();
        draw(&mut app, 100, 24);
        app.controller.dropdowns.click_trigger(1);

        let screen = draw(&mut app, 100, 24);
        assert!(screen.contains("Onboarding guide"));
        assert!(app.areas.dropdown_content.is_some());
    }

    #[test]
    fn test_input_grows_with_content() {
        let mut app = test_app();
        app.controller.input.insert_str("one\ntwo\nthree");
        draw(&mut app, 80, 24);
        let three_rows = app.areas.input.map(|r| r.height);
        assert_eq!(three_rows, Some(5));

        app.controller.input.insert_str(&"\nmore".repeat(10));
        draw(&mut app, 80, 24);
        assert_eq!(app.areas.input.map(|r| r.height), Some(8));
    }
}
