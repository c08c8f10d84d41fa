use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
};

use crate::app::{AppState, COLUMN_SPACING, InputMode, MAX_WRAPPED_LINES, TableLayout};
use crate::columns;
use crate::parser::ParseIssue;
use crate::theme::Theme;

const HEADER_HEIGHT: u16 = 1;

/// Draw the entire UI
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Filter bar
        ])
        .split(frame.area());

    draw_title(frame, state, chunks[0]);
    draw_table(frame, state, chunks[1]);
    draw_status_bar(frame, state, chunks[2]);
    draw_filter_bar(frame, state, chunks[3]);

    if state.mode == InputMode::Editing {
        draw_editor(frame, state);
    }

    // Draw help overlay if active
    if state.show_help {
        draw_help_overlay(frame, &state.theme);
    }
}

/// Split a cell value into lines of at most `width` characters
pub fn wrap_cell(text: &str, width: u16, max_lines: u16) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1) as usize)
        .take(max_lines.max(1) as usize)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Draw the title bar with the log's directives and display timezone
fn draw_title(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = &state.theme;
    let mut spans = vec![Span::styled(
        " iisview ",
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];
    if let Some(log) = &state.log {
        for name in ["Software", "Date"] {
            if let Some(value) = log.directive(name) {
                spans.push(Span::raw("| "));
                spans.push(Span::styled(
                    format!("{}: {} ", name, value),
                    Style::default().fg(theme.title_info),
                ));
            }
        }
    }
    spans.push(Span::raw("| "));
    spans.push(Span::styled(
        state.timezone.name(),
        Style::default().fg(theme.title_info),
    ));

    let title = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.title_bg));
    frame.render_widget(title, area);
}

/// Draw the virtualized log table
fn draw_table(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = state.theme.clone();

    if state.log.as_ref().is_none_or(|log| log.fields.is_empty()) {
        state.layout = TableLayout::default();
        let (msg, color) = match state.parse_issue {
            _ if state.parsing => ("Parsing...", theme.empty_state),
            Some(ParseIssue::MissingFieldsDirective) => (
                "No #Fields: directive found. Press e to edit the log text.",
                theme.warning_message,
            ),
            _ if state.log.is_some() => ("The #Fields: directive declares no fields", theme.warning_message),
            _ => ("Press e to paste an IIS log", theme.empty_state),
        };
        frame.render_widget(Paragraph::new(msg).style(Style::default().fg(color)), area);
        return;
    }

    let [table_area, scrollbar_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let body_height = table_area.height.saturating_sub(HEADER_HEIGHT);

    state.viewport_height = body_height;
    state.layout.width = table_area.width;
    state.first_column = state.first_column.min(state.columns.len() - 1);
    state.clamp_scroll();

    let slots = columns::layout_columns(
        &state.columns,
        state.first_column,
        table_area.width,
        COLUMN_SPACING,
    );
    let window = state.virtualizer.window(state.scroll_offset, body_height as u64);

    // Header with sort indicators
    let header_cells: Vec<Cell> = slots
        .iter()
        .map(|slot| {
            let column = &state.columns[slot.index];
            let mut spans = vec![Span::raw(column.label.clone())];
            if let Some(direction) = state.sort.direction_for(&column.field) {
                spans.push(Span::styled(
                    direction.indicator(),
                    Style::default().fg(theme.sort_indicator),
                ));
            }
            let mut style = Style::default().fg(theme.header_fg).add_modifier(Modifier::BOLD);
            if slot.index == state.focused_column {
                style = style.fg(theme.header_focused).add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(Line::from(spans)).style(style)
        })
        .collect();
    let header = Row::new(header_cells)
        .style(Style::default().bg(theme.header_bg))
        .height(HEADER_HEIGHT);

    // Only the rows inside the window are built
    let capacity = window.map_or(0, |w| w.len());
    let mut rows = Vec::with_capacity(capacity);
    let mut measured = Vec::with_capacity(capacity);
    if let Some(window) = window {
        for index in window.start..=window.end {
            let Some(record) = state.record_at(index) else {
                break;
            };
            let mut height: u16 = 1;
            let cells: Vec<Cell> = slots
                .iter()
                .map(|slot| {
                    let column = &state.columns[slot.index];
                    let value = column.render(record, state.timezone);
                    let lines = if state.wrap_cells {
                        wrap_cell(&value, slot.width, MAX_WRAPPED_LINES)
                    } else {
                        vec![value.into_owned()]
                    };
                    height = height.max(lines.len() as u16);
                    let cell = Cell::from(Text::from(
                        lines.into_iter().map(Line::from).collect::<Vec<_>>(),
                    ));
                    if slot.index == state.focused_column {
                        cell.style(Style::default().fg(theme.column_focused_fg))
                    } else {
                        cell
                    }
                })
                .collect();

            let mut row = Row::new(cells).height(height);
            if index % 2 == 1 {
                row = row.style(Style::default().bg(theme.row_alt_bg));
            }
            rows.push(row);
            measured.push((index, height));
        }
    }
    for (index, height) in measured {
        state.virtualizer.measure(index, height as u32);
    }

    let widths: Vec<Constraint> = slots.iter().map(|s| Constraint::Length(s.width)).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .row_highlight_style(
            Style::default()
                .bg(theme.row_selected_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut table_state = TableState::default();
    if let Some(window) = window {
        *table_state.offset_mut() = window.first_visible - window.start;
        if window.is_visible(state.selected) {
            table_state.select(Some(state.selected - window.start));
        }
    }
    frame.render_stateful_widget(table, table_area, &mut table_state);

    // Rows actually on screen, for mouse hit testing
    let mut row_hits = Vec::new();
    if let Some(window) = window {
        let mut y = table_area.y + HEADER_HEIGHT;
        for index in window.start + table_state.offset()..=window.end {
            if y >= table_area.bottom() {
                break;
            }
            let height = (state.virtualizer.row_height(index) as u16).min(table_area.bottom() - y);
            row_hits.push((index, y, height));
            y += height;
        }
    }

    // Resize handles between header cells
    let handle_style = Style::default().fg(theme.resize_handle).bg(theme.header_bg);
    let buf = frame.buffer_mut();
    for slot in &slots {
        let x = table_area.x + slot.edge();
        if x < table_area.right() {
            buf.set_string(x, table_area.y, "│", handle_style);
        }
    }

    state.layout = TableLayout {
        x: table_area.x,
        width: table_area.width,
        header_y: table_area.y,
        slots,
        rows: row_hits,
    };

    if state.row_order.is_empty() {
        let body = Rect {
            y: table_area.y + HEADER_HEIGHT,
            height: body_height,
            ..table_area
        };
        let msg = if state.active_filter.is_some() {
            Paragraph::new("No rows match the current filter")
                .style(Style::default().fg(theme.warning_message))
        } else {
            Paragraph::new("The log has no data lines").style(Style::default().fg(theme.empty_state))
        };
        frame.render_widget(msg, body);
    }

    // Draw scrollbar if there are more lines than visible
    let total_height = window.map_or(0, |w| w.total_height);
    if total_height > body_height as u64 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        let mut scrollbar_state =
            ScrollbarState::new(total_height.saturating_sub(body_height as u64) as usize)
                .position(state.scroll_offset as usize)
                .viewport_content_length(body_height as usize);

        let track = Rect {
            y: scrollbar_area.y + HEADER_HEIGHT,
            height: body_height,
            ..scrollbar_area
        };
        frame.render_stateful_widget(scrollbar, track, &mut scrollbar_state);
    }
}

/// Draw the status bar
fn draw_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = &state.theme;
    let (total, shown) = state.row_counts();

    let mode_str = match state.mode {
        InputMode::Normal => "NORMAL",
        InputMode::Editing => "EDIT",
        InputMode::FilterEditing => "FILTER",
    };

    let regex_indicator = if state.filter_is_regex { "[.*]" } else { "" };
    let wrap_indicator = if state.wrap_cells { "[W]" } else { "" };
    let parsing_indicator = if state.parsing { "[parsing]" } else { "" };

    // Combine indicators
    let indicators: Vec<&str> = [regex_indicator, wrap_indicator, parsing_indicator]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect();
    let indicators_str = if indicators.is_empty() {
        String::new()
    } else {
        format!(" {}", indicators.join(" "))
    };

    let sort_str = state
        .sort
        .column
        .as_ref()
        .and_then(|field| {
            let column = state.columns.iter().find(|c| &c.field == field)?;
            Some(format!(" | sort: {}{}", column.label, state.sort.direction.indicator()))
        })
        .unwrap_or_default();

    let filter_str = state
        .active_filter
        .as_ref()
        .map(|f| format!(" | filter: {}", f.pattern))
        .unwrap_or_default();

    let help_text = match state.mode {
        InputMode::FilterEditing => " Enter:apply  Esc:cancel  Ctrl+r:regex ",
        InputMode::Editing => " Esc:close  Ctrl+v:clipboard  Ctrl+l:clear ",
        InputMode::Normal => " ?:help  e:edit  s:sort  /:filter ",
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_str),
            Style::default().bg(theme.status_mode_bg).fg(theme.status_mode_fg),
        ),
        Span::raw(format!(
            " {}/{} rows{}{}{} ",
            shown, total, indicators_str, sort_str, filter_str
        )),
        Span::styled(help_text, Style::default().fg(theme.status_help)),
    ]);

    let paragraph = Paragraph::new(status).style(Style::default().bg(theme.status_bg));

    frame.render_widget(paragraph, area);
}

/// Draw the filter input bar
fn draw_filter_bar(frame: &mut Frame, state: &mut AppState, area: Rect) {
    match state.mode {
        InputMode::FilterEditing => {
            // Create a layout with "/" prefix and textarea
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(1), // "/" prefix
                    Constraint::Min(1),    // textarea
                ])
                .split(area);

            let prefix = Paragraph::new("/").style(Style::default().fg(state.theme.filter_prefix));
            frame.render_widget(prefix, chunks[0]);

            frame.render_widget(&state.filter_textarea, chunks[1]);
        }
        _ => {
            if let Some(msg) = &state.status_message {
                let content = Line::from(Span::styled(
                    msg.as_str(),
                    Style::default().fg(state.theme.warning_message),
                ));
                frame.render_widget(Paragraph::new(content), area);
            }
        }
    }
}

/// Centered rectangle taking the given percentages of `area`
fn centered(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Percentage(width_pct)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Percentage(height_pct)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Draw the paste overlay
fn draw_editor(frame: &mut Frame, state: &mut AppState) {
    let area = centered(frame.area(), 80, 70);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Paste IIS log ")
        .title_bottom(Line::from(" Esc: close  Ctrl+V: clipboard  Ctrl+L: clear ").right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(state.theme.editor_border));
    state.editor.set_block(block);

    frame.render_widget(&state.editor, area);
}

/// Draw the help overlay
fn draw_help_overlay(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    // Center the help box
    let width = 50.min(area.width.saturating_sub(4));
    let height = 26.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    // Clear background
    frame.render_widget(Clear, help_area);

    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Log text:"),
        Line::from("  e / i        Open the paste editor"),
        Line::from("  Ctrl+V       Paste from clipboard"),
        Line::from("  y            Copy selected row as JSON"),
        Line::from(""),
        Line::from("Rows:"),
        Line::from("  j/k, ↑/↓     Select next/previous"),
        Line::from("  g/G          Go to top/bottom"),
        Line::from("  PgUp/PgDn    Page up/down"),
        Line::from("  Mouse wheel  Scroll"),
        Line::from(""),
        Line::from("Columns:"),
        Line::from("  h/l, ←/→     Focus column"),
        Line::from("  s, Enter     Cycle sort (or click header)"),
        Line::from("  +/-          Resize (or drag header edge)"),
        Line::from("  w            Toggle cell wrapping"),
        Line::from(""),
        Line::from("Filtering:"),
        Line::from("  /            Start filter input"),
        Line::from("  r            Toggle regex mode"),
        Line::from("  Esc          Clear filter"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q            Quit"),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.help_border))
        .style(Style::default().bg(theme.help_bg));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::state_with;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(state: &mut AppState, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect()
            })
            .collect()
    }

    fn sample(rows: usize) -> String {
        let lines: Vec<String> = (0..rows)
            .map(|i| format!("2024-01-01 23:30:00 10.0.0.{} /very/long/path/{:04}", i % 250, i))
            .collect();
        format!(
            "#Software: Microsoft Internet Information Services 10.0\n\
             #Fields: date time c-ip cs-uri-stem\n{}",
            lines.join("\n")
        )
    }

    #[test]
    fn test_wrap_cell() {
        assert_eq!(wrap_cell("abcdefghij", 4, 4), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap_cell("abcdefghij", 2, 2), ["ab", "cd"]);
        assert_eq!(wrap_cell("", 4, 4), [""]);
    }

    #[test]
    fn test_empty_state_prompts_for_paste() {
        let mut state = state_with("");
        let screen = render(&mut state, 60, 10);
        assert!(screen[1].contains("Press e to paste an IIS log"));
    }

    #[test]
    fn test_missing_directive_message() {
        let mut state = state_with("no header here\njust text");
        let screen = render(&mut state, 80, 10);
        assert!(screen[1].contains("No #Fields: directive found"));
        assert!(state.layout.slots.is_empty());
    }

    #[test]
    fn test_table_renders_pinned_header_and_window() {
        let mut state = state_with(&sample(1000));
        let screen = render(&mut state, 60, 12);

        assert!(screen[0].contains("Software: Microsoft"));
        assert!(screen[1].contains("Date"));
        assert!(screen[1].contains("Client IP"));
        assert!(screen[2].contains("2024-01-02"));
        assert!(screen[2].contains("08:30:00"));
        assert!(screen[10].contains("1000/1000 rows"));

        assert_eq!(state.viewport_height, 8);
        assert_eq!(state.layout.rows.len(), 8);
        assert_eq!(state.layout.rows[0], (0, 2, 1));

        // Scroll far down: the header stays, the body shows the window
        state.select(500);
        let screen = render(&mut state, 60, 12);
        assert!(screen[1].contains("Client IP"));
        assert!(screen.iter().any(|line| line.contains("/very/lo")));
        assert_eq!(state.layout.rows.last().unwrap().0, 500);
        assert!(state.layout.rows.iter().all(|&(i, _, _)| (493..=500).contains(&i)));
    }

    #[test]
    fn test_sort_indicator_and_handles() {
        let mut state = state_with(&sample(3));
        state.toggle_sort(2);
        let screen = render(&mut state, 60, 10);
        assert!(screen[1].contains("Client IP ▲"));
        assert!(screen[1].contains('│'));
        assert!(screen[9].contains("Sorted by Client IP ▲"));
    }

    #[test]
    fn test_wrapped_rows_are_measured() {
        let mut state = state_with(&sample(20));
        state.toggle_wrap();
        render(&mut state, 60, 12);
        // The uri column is cut to 8 cells, so its 20 characters need 3 lines
        assert_eq!(state.layout.slots[3].width, 8);
        assert_eq!(state.virtualizer.row_height(0), 3);
        assert_eq!(state.layout.rows[0], (0, 2, 3));
        assert_eq!(state.layout.rows[1], (1, 5, 3));
    }

    #[test]
    fn test_editor_overlay_is_drawn() {
        let mut state = state_with("#Fields: a\n1");
        state.open_editor();
        let screen = render(&mut state, 60, 20);
        assert!(screen.iter().any(|line| line.contains("Paste IIS log")));
        assert!(screen.iter().any(|line| line.contains("#Fields: a")));
    }
}
