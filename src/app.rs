use std::time::Instant;

use chrono_tz::Tz;
use ratatui::style::Style;
use tui_textarea::TextArea;

use crate::clipboard::SystemClipboard;
use crate::columns::{self, Column, ColumnSlot, WidthLimits};
use crate::config::Config;
use crate::filter::ActiveFilter;
use crate::parse_job::{ParseOutcome, ParseWorker};
use crate::parser::{LogRecord, ParseIssue, ParsedLog};
use crate::sort::SortState;
use crate::theme::Theme;
use crate::virtual_list::Virtualizer;

/// Blank cells between adjacent columns; the one after a column is its resize handle
pub const COLUMN_SPACING: u16 = 1;

/// Tallest a row may grow when cell wrapping is on
pub const MAX_WRAPPED_LINES: u16 = 4;

const DEBOUNCE_MS: u128 = 150;

/// Input mode for the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Table navigation
    Normal,
    /// The paste overlay is open
    Editing,
    /// Editing the filter text
    FilterEditing,
}

/// Geometry of the last rendered table, used for mouse hit testing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableLayout {
    pub x: u16,
    pub width: u16,
    pub header_y: u16,
    pub slots: Vec<ColumnSlot>,
    /// `(display index, y, height)` of each row on screen
    pub rows: Vec<(usize, u16, u16)>,
}

impl TableLayout {
    /// Column whose resize handle is at screen column `x`
    pub fn edge_at(&self, x: u16) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| self.x + slot.edge() == x)
            .map(|slot| slot.index)
    }

    /// Column drawn at screen column `x`
    pub fn column_at(&self, x: u16) -> Option<usize> {
        let x = x.checked_sub(self.x)?;
        self.slots
            .iter()
            .find(|slot| x >= slot.x && x < slot.edge())
            .map(|slot| slot.index)
    }

    /// Display index of the row drawn at screen line `y`
    pub fn row_at(&self, y: u16) -> Option<usize> {
        self.rows
            .iter()
            .find(|&&(_, top, height)| y >= top && y < top + height)
            .map(|&(index, _, _)| index)
    }
}

/// A header edge being dragged with the mouse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ResizeDrag {
    column: usize,
    origin_x: u16,
    origin_width: u16,
}

/// Main application state
pub struct AppState<'a> {
    /// Paste overlay editor holding the raw log text
    pub editor: TextArea<'a>,
    /// Last successfully parsed log
    pub log: Option<ParsedLog>,
    /// Why the current text did not parse
    pub parse_issue: Option<ParseIssue>,
    /// Columns derived from the log's fields
    pub columns: Vec<Column>,
    /// Active sort
    pub sort: SortState,
    /// Indices into `log.rows` in display order (filtered, then sorted)
    pub row_order: Vec<usize>,
    /// Row height bookkeeping for the table body
    pub virtualizer: Virtualizer,
    /// Vertical scroll position of the table body, in lines
    pub scroll_offset: u64,
    /// Height of the table body in the last frame
    pub viewport_height: u16,
    /// Selected row (display index)
    pub selected: usize,
    /// Column receiving sort and resize keys
    pub focused_column: usize,
    /// Leftmost visible column
    pub first_column: usize,
    /// Whether long cell values wrap onto extra lines
    pub wrap_cells: bool,
    /// Geometry of the last rendered table
    pub layout: TableLayout,
    /// Timezone for the date and time columns
    pub timezone: Tz,
    pub width_limits: WidthLimits,
    pub default_column_width: u16,
    /// Current input mode
    pub mode: InputMode,
    /// Filter text input widget
    pub filter_textarea: TextArea<'a>,
    /// Currently active filter
    pub active_filter: Option<ActiveFilter>,
    /// Whether filter is regex mode
    pub filter_is_regex: bool,
    /// Last time the editor text changed (for debounce)
    pub text_last_change: Option<Instant>,
    /// Last time filter input changed (for debounce)
    pub filter_last_change: Option<Instant>,
    /// Whether a background parse is in flight
    pub parsing: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
    /// Whether to show help overlay
    pub show_help: bool,
    pub theme: Theme,
    /// Generation of the most recently submitted text
    generation: u64,
    /// Text of the most recent submission
    parsed_text: Option<String>,
    worker: ParseWorker,
    clipboard: SystemClipboard,
    resize_drag: Option<ResizeDrag>,
}

fn new_editor<'a>(theme: &Theme) -> TextArea<'a> {
    let mut editor = TextArea::default();
    editor.set_cursor_line_style(Style::default());
    editor.set_placeholder_text("paste IIS log text here (Ctrl+V reads the clipboard)");
    editor.set_placeholder_style(Style::default().fg(theme.editor_placeholder));
    editor
}

fn new_filter_textarea<'a>(text: String) -> TextArea<'a> {
    let mut textarea = TextArea::new(vec![text]);
    textarea.set_cursor_line_style(Style::default());
    textarea
}

impl<'a> AppState<'a> {
    pub fn new(config: &Config, worker: ParseWorker) -> Self {
        let theme = Theme::by_name(&config.theme);
        let mut filter_textarea = new_filter_textarea(String::new());
        filter_textarea.set_placeholder_text("type to filter...");
        filter_textarea.set_placeholder_style(Style::default().fg(theme.editor_placeholder));

        Self {
            editor: new_editor(&theme),
            log: None,
            parse_issue: None,
            columns: Vec::new(),
            sort: SortState::default(),
            row_order: Vec::new(),
            virtualizer: Virtualizer::new(config.row_height, config.overscan),
            scroll_offset: 0,
            viewport_height: 0,
            selected: 0,
            focused_column: 0,
            first_column: 0,
            wrap_cells: false,
            layout: TableLayout::default(),
            timezone: config.timezone(),
            width_limits: config.width_limits(),
            default_column_width: config.default_column_width,
            mode: InputMode::Normal,
            filter_textarea,
            active_filter: None,
            filter_is_regex: false,
            text_last_change: None,
            filter_last_change: None,
            parsing: false,
            should_quit: false,
            status_message: None,
            show_help: false,
            theme,
            generation: 0,
            parsed_text: None,
            worker,
            clipboard: SystemClipboard::new(),
            resize_drag: None,
        }
    }

    /// Raw text currently in the editor
    pub fn editor_text(&self) -> String {
        self.editor.lines().join("\n")
    }

    pub fn open_editor(&mut self) {
        self.mode = InputMode::Editing;
    }

    /// Close the overlay, parsing any pending edit right away
    pub fn close_editor(&mut self) {
        self.mode = InputMode::Normal;
        if self.text_last_change.take().is_some() {
            self.reparse();
        }
    }

    /// Insert pasted text at the cursor
    pub fn paste_text(&mut self, text: &str) {
        if self.editor.insert_str(text) {
            self.text_changed();
        }
    }

    pub fn paste_from_clipboard(&mut self) {
        match self.clipboard.get() {
            Ok(text) => self.paste_text(&text),
            Err(e) => {
                tracing::warn!(error = %e, "clipboard read failed");
                self.status_message = Some(format!("Error: {:#}", e));
            }
        }
    }

    /// Replace the editor contents with `text` and parse it
    pub fn load_text(&mut self, text: &str) {
        self.editor = new_editor(&self.theme);
        self.paste_text(text);
        self.text_last_change = None;
        self.reparse();
    }

    pub fn clear_editor(&mut self) {
        self.editor = new_editor(&self.theme);
        self.text_changed();
    }

    /// Mark that the editor text changed (for debounce)
    pub fn text_changed(&mut self) {
        self.text_last_change = Some(Instant::now());
    }

    /// Run debounced work whose quiet period has passed
    pub fn check_debounce(&mut self) {
        if let Some(last_change) = self.text_last_change {
            if last_change.elapsed().as_millis() >= DEBOUNCE_MS {
                self.text_last_change = None;
                self.reparse();
            }
        }

        if let Some(last_change) = self.filter_last_change {
            if last_change.elapsed().as_millis() >= DEBOUNCE_MS {
                // Apply filter without changing mode
                self.filter_last_change = None;
                self.set_filter_from_input();
            }
        }
    }

    /// Submit the editor text for parsing unless it is unchanged
    pub fn reparse(&mut self) {
        let text = self.editor_text();
        if self.parsed_text.as_deref() == Some(text.as_str()) {
            return;
        }
        self.generation += 1;
        self.parsed_text = Some(text.clone());

        let bytes = text.len();
        match self.worker.submit(self.generation, text) {
            Some(outcome) => self.apply_parse(outcome),
            None => {
                self.parsing = true;
                self.status_message = Some(format!("Parsing {} KiB...", bytes / 1024));
            }
        }
    }

    /// Install a parse result if it belongs to the latest text
    pub fn apply_parse(&mut self, outcome: ParseOutcome) {
        if outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                latest = self.generation,
                "discarding stale parse"
            );
            return;
        }
        self.parsing = false;

        match outcome.parsed {
            Some(log) => {
                tracing::info!(
                    rows = log.rows.len(),
                    fields = ?log.field_names(),
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "parsed log"
                );
                self.install_log(log);
                self.parse_issue = None;
            }
            None => {
                tracing::info!(issue = ?outcome.issue, "text is not a log");
                self.log = None;
                self.columns.clear();
                self.row_order.clear();
                self.virtualizer.set_count(0);
                self.parse_issue = outcome.issue;
                self.status_message = match outcome.issue {
                    Some(ParseIssue::MissingFieldsDirective) => outcome.issue.map(|i| i.to_string()),
                    _ => None,
                };
            }
        }
    }

    fn install_log(&mut self, log: ParsedLog) {
        let mut columns = columns::derive_columns(&log.fields, self.default_column_width);
        // Keep user-set widths for fields that survive the edit
        for column in &mut columns {
            if let Some(old) = self.columns.iter().find(|c| c.field == column.field) {
                column.width = old.width;
            }
        }
        if let Some(field) = &self.sort.column {
            if !columns.iter().any(|c| &c.field == field) {
                self.sort = SortState::default();
            }
        }

        self.status_message = Some(format!(
            "Parsed {} rows, {} fields",
            log.rows.len(),
            log.fields.len()
        ));
        self.columns = columns;
        self.log = Some(log);
        self.focused_column = self.focused_column.min(self.columns.len().saturating_sub(1));
        self.first_column = self.first_column.min(self.focused_column);
        self.selected = 0;
        self.scroll_offset = 0;
        self.recompute_rows();
    }

    /// Rebuild the display order from the filter and sort state
    pub fn recompute_rows(&mut self) {
        let Some(log) = &self.log else {
            self.row_order.clear();
            self.virtualizer.set_count(0);
            return;
        };

        let mut order: Vec<usize> = match &self.active_filter {
            None => (0..log.rows.len()).collect(),
            Some(filter) => log
                .rows
                .iter()
                .enumerate()
                .filter(|(_, record)| filter.matches_record(record))
                .map(|(i, _)| i)
                .collect(),
        };
        self.sort.apply(log, &mut order);
        self.row_order = order;

        self.virtualizer.set_count(self.row_order.len());
        // Measured heights belong to display positions, which just changed
        self.virtualizer.reset_measurements();
        self.selected = self.selected.min(self.row_order.len().saturating_sub(1));
        self.clamp_scroll();
    }

    /// Record shown at display position `index`
    pub fn record_at(&self, index: usize) -> Option<&LogRecord> {
        let log = self.log.as_ref()?;
        self.row_order.get(index).map(|&i| &log.rows[i])
    }

    pub fn selected_record(&self) -> Option<&LogRecord> {
        self.record_at(self.selected)
    }

    /// Get total and displayed row counts
    pub fn row_counts(&self) -> (usize, usize) {
        let total = self.log.as_ref().map_or(0, |log| log.rows.len());
        (total, self.virtualizer.count())
    }

    /// Toggle sorting on column `index`
    pub fn toggle_sort(&mut self, index: usize) {
        let Some(column) = self.columns.get(index) else {
            return;
        };
        self.sort = self.sort.toggle(&column.field);
        self.status_message = Some(match self.sort.direction_for(&column.field) {
            Some(direction) => format!("Sorted by {}{}", column.label, direction.indicator()),
            None => "Sort cleared".to_string(),
        });
        tracing::debug!(sort = ?self.sort, "sort changed");
        self.recompute_rows();
    }

    pub fn toggle_sort_focused(&mut self) {
        self.toggle_sort(self.focused_column);
    }

    pub fn clamp_scroll(&mut self) {
        let max = self.virtualizer.max_scroll(self.viewport_height as u64);
        self.scroll_offset = self.scroll_offset.min(max);
    }

    /// Scroll the body by `delta` lines, dragging the selection along
    /// only when it would leave the screen
    pub fn scroll_by(&mut self, delta: i64) {
        let max = self.virtualizer.max_scroll(self.viewport_height as u64);
        let target = self.scroll_offset as i64 + delta;
        self.scroll_offset = target.clamp(0, max as i64) as u64;

        let bottom_line = self.scroll_offset + (self.viewport_height.max(1) as u64 - 1);
        if let Some(top) = self.virtualizer.index_at(self.scroll_offset) {
            let bottom = self
                .virtualizer
                .index_at(bottom_line)
                .unwrap_or(self.row_order.len().saturating_sub(1));
            self.selected = self.selected.clamp(top, bottom.max(top));
        }
    }

    /// Select display row `index` and scroll it into view
    pub fn select(&mut self, index: usize) {
        if self.row_order.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = index.min(self.row_order.len() - 1);
        self.scroll_offset = self.virtualizer.scroll_to_index(
            self.selected,
            self.scroll_offset,
            self.viewport_height as u64,
        );
    }

    pub fn select_next(&mut self) {
        self.select(self.selected + 1);
    }

    pub fn select_prev(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn select_page_down(&mut self) {
        self.select(self.selected + self.page_rows());
    }

    pub fn select_page_up(&mut self) {
        self.select(self.selected.saturating_sub(self.page_rows()));
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(self.row_order.len().saturating_sub(1));
    }

    fn page_rows(&self) -> usize {
        (self.viewport_height as usize).max(1)
    }

    /// Focus column `index`, scrolling horizontally to show it
    pub fn focus_column(&mut self, index: usize) {
        if self.columns.is_empty() {
            return;
        }
        self.focused_column = index.min(self.columns.len() - 1);
        self.first_column = columns::scroll_to_column(
            &self.columns,
            self.focused_column,
            self.first_column,
            self.layout.width,
            COLUMN_SPACING,
        );
    }

    pub fn focus_next_column(&mut self) {
        self.focus_column(self.focused_column + 1);
    }

    pub fn focus_prev_column(&mut self) {
        self.focus_column(self.focused_column.saturating_sub(1));
    }

    /// Widen or narrow the focused column
    pub fn resize_focused(&mut self, delta: i32) {
        let limits = self.width_limits;
        if let Some(column) = self.columns.get_mut(self.focused_column) {
            column.resize(delta, limits);
            tracing::debug!(field = %column.field, width = column.width, "column resized");
        }
        if self.wrap_cells {
            self.virtualizer.reset_measurements();
        }
    }

    /// Handle a left click at screen position `(x, y)`
    pub fn click(&mut self, x: u16, y: u16) {
        if y == self.layout.header_y {
            if let Some((column, width)) = self
                .layout
                .edge_at(x)
                .and_then(|i| self.columns.get(i).map(|c| (i, c.width)))
            {
                self.resize_drag = Some(ResizeDrag {
                    column,
                    origin_x: x,
                    origin_width: width,
                });
            } else if let Some(column) = self.layout.column_at(x) {
                self.focused_column = column;
                self.toggle_sort(column);
            }
        } else if let Some(row) = self.layout.row_at(y) {
            self.select(row);
            if let Some(column) = self.layout.column_at(x) {
                self.focused_column = column;
            }
        }
    }

    /// Continue a header edge drag at screen column `x`
    pub fn drag(&mut self, x: u16) {
        let Some(drag) = self.resize_drag else {
            return;
        };
        let width = drag.origin_width as i32 + x as i32 - drag.origin_x as i32;
        let limits = self.width_limits;
        if let Some(column) = self.columns.get_mut(drag.column) {
            column.set_width(width, limits);
        }
        if self.wrap_cells {
            self.virtualizer.reset_measurements();
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(drag) = self.resize_drag.take() {
            if let Some(column) = self.columns.get(drag.column) {
                tracing::debug!(field = %column.field, width = column.width, "column resized");
            }
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.resize_drag.is_some()
    }

    /// Toggle wrapping of long cell values
    pub fn toggle_wrap(&mut self) {
        self.wrap_cells = !self.wrap_cells;
        self.virtualizer.reset_measurements();
        self.status_message = Some(format!(
            "Cell wrap: {}",
            if self.wrap_cells { "on" } else { "off" }
        ));
    }

    /// Copy the selected row to the clipboard as a JSON object
    pub fn yank_selected(&mut self) {
        let Some(json) = self.selected_record().map(|r| r.to_json().to_string()) else {
            return;
        };
        self.status_message = Some(match self.clipboard.set(&json) {
            Ok(()) => "Row copied as JSON".to_string(),
            Err(e) => format!("Error: {:#}", e),
        });
    }

    /// Get the current filter input text
    pub fn filter_input(&self) -> String {
        self.filter_textarea.lines().join("\n")
    }

    fn set_filter_from_input(&mut self) {
        let input = self.filter_input();
        if input.is_empty() {
            self.active_filter = None;
        } else {
            self.active_filter = Some(ActiveFilter::new(input, self.filter_is_regex));
        }
        self.recompute_rows();
    }

    pub fn start_filter(&mut self) {
        self.mode = InputMode::FilterEditing;
        // Clear textarea for new filter input
        self.filter_textarea.select_all();
        self.filter_textarea.cut();
    }

    /// Apply the current filter input as the active filter
    pub fn apply_filter(&mut self) {
        self.set_filter_from_input();
        self.mode = InputMode::Normal;
        self.filter_last_change = None;
        if self.active_filter.as_ref().is_some_and(|f| f.is_invalid_regex()) {
            self.status_message = Some("Invalid regex, matching as text".to_string());
        }
    }

    /// Cancel filter editing and revert to previous state
    pub fn cancel_filter(&mut self) {
        let prev = self
            .active_filter
            .as_ref()
            .map(|f| f.pattern.clone())
            .unwrap_or_default();
        self.filter_textarea = new_filter_textarea(prev);
        self.mode = InputMode::Normal;
        self.filter_last_change = None;
        self.set_filter_from_input();
    }

    pub fn clear_filter(&mut self) {
        if self.active_filter.is_some() {
            self.active_filter = None;
            self.filter_textarea = new_filter_textarea(String::new());
            self.recompute_rows();
            self.status_message = Some("Filter cleared".to_string());
        }
    }

    /// Mark that filter input changed (for debounce)
    pub fn filter_changed(&mut self) {
        self.filter_last_change = Some(Instant::now());
    }

    /// Toggle regex mode for filtering
    pub fn toggle_regex_mode(&mut self) {
        self.filter_is_regex = !self.filter_is_regex;
        if self.active_filter.is_some() {
            self.set_filter_from_input();
        }
        self.status_message = Some(format!(
            "Filter mode: {}",
            if self.filter_is_regex { "regex" } else { "substring" }
        ));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sort::SortDirection;

    pub(crate) fn state_with(raw: &str) -> AppState<'static> {
        let (worker, _rx) = ParseWorker::new(usize::MAX, 1);
        let mut state = AppState::new(&Config::default(), worker);
        state.viewport_height = 5;
        state.layout.width = 40;
        state.paste_text(raw);
        state.reparse();
        state
    }

    const SAMPLE: &str = "#Software: Microsoft Internet Information Services 10.0\n\
                          #Fields: date time c-ip sc-status\n\
                          2024-01-02 00:10:00 10.0.0.2 404\n\
                          2024-01-01 23:30:00 10.0.0.1 200\n\
                          2024-01-01 08:00:00 10.0.0.3 500";

    #[test]
    fn test_paste_then_parse() {
        let state = state_with(SAMPLE);
        assert_eq!(state.row_counts(), (3, 3));
        let labels: Vec<&str> = state.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Date", "Time", "Client IP", "Status"]);
        assert_eq!(state.parse_issue, None);
    }

    #[test]
    fn test_load_text_replaces_editor() {
        let mut state = state_with(SAMPLE);
        state.load_text("#Fields: a b\n1 2");
        assert_eq!(state.editor_text(), "#Fields: a b\n1 2");
        assert_eq!(state.text_last_change, None);
        assert_eq!(state.row_counts(), (1, 1));
    }

    #[test]
    fn test_unrecognized_text_shows_no_table() {
        let state = state_with("no header here\njust text");
        assert!(state.log.is_none());
        assert!(state.columns.is_empty());
        assert_eq!(state.parse_issue, Some(ParseIssue::MissingFieldsDirective));
    }

    #[test]
    fn test_stale_parse_is_discarded() {
        let mut state = state_with(SAMPLE);
        let (worker, _rx) = ParseWorker::new(usize::MAX, 1);
        let stale = worker.submit(0, "#Fields: x\n1".to_string()).unwrap();
        state.apply_parse(stale);
        assert_eq!(state.columns.len(), 4);
    }

    #[test]
    fn test_unchanged_text_is_not_reparsed() {
        let mut state = state_with(SAMPLE);
        state.toggle_sort(3);
        let generation = state.generation;
        state.reparse();
        assert_eq!(state.generation, generation);
        assert_eq!(state.sort, SortState::by("sc-status", SortDirection::Ascending));
    }

    #[test]
    fn test_sort_cycle_reorders_rows() {
        let mut state = state_with(SAMPLE);
        state.toggle_sort(1);
        assert_eq!(state.row_order, [2, 1, 0]);
        state.toggle_sort(1);
        assert_eq!(state.row_order, [0, 1, 2]);
        state.toggle_sort(1);
        assert_eq!(state.sort.column, None);
        assert_eq!(state.row_order, [0, 1, 2]);
        state.toggle_sort(3);
        assert_eq!(state.record_at(0).unwrap().get("sc-status"), Some("200"));
    }

    #[test]
    fn test_edit_keeps_widths_and_valid_sort() {
        let mut state = state_with(SAMPLE);
        state.focus_column(2);
        state.resize_focused(5);
        state.toggle_sort(2);
        state.paste_text("\n2024-01-03 01:00:00 10.0.0.0 302");
        state.reparse();
        assert_eq!(state.row_counts(), (4, 4));
        assert_eq!(state.columns[2].width, 21);
        assert_eq!(state.sort.column.as_deref(), Some("c-ip"));
        assert_eq!(state.record_at(0).unwrap().get("c-ip"), Some("10.0.0.0"));
    }

    #[test]
    fn test_filter_then_sort() {
        let mut state = state_with(SAMPLE);
        state.filter_textarea = new_filter_textarea("10.0.0.[13]".to_string());
        state.filter_is_regex = true;
        state.apply_filter();
        assert_eq!(state.row_counts(), (3, 2));
        state.toggle_sort(2);
        assert_eq!(state.row_order, [1, 2]);
        state.clear_filter();
        assert_eq!(state.row_order, [1, 0, 2]);
    }

    #[test]
    fn test_selection_scrolls_into_view() {
        let rows: Vec<String> = (0..50).map(|i| format!("r{:02}", i)).collect();
        let mut state = state_with(&format!("#Fields: id\n{}", rows.join("\n")));
        state.select(20);
        assert_eq!(state.scroll_offset, 16);
        state.select_first();
        assert_eq!(state.scroll_offset, 0);
        state.select_last();
        assert_eq!(state.selected, 49);
        assert_eq!(state.scroll_offset, 45);
        state.scroll_by(-100);
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.selected, 4);
        state.scroll_by(1_000);
        assert_eq!(state.scroll_offset, 45);
        assert_eq!(state.selected, 45);
    }

    #[test]
    fn test_header_click_sorts_and_edge_drag_resizes() {
        let mut state = state_with(SAMPLE);
        state.layout = TableLayout {
            x: 2,
            width: 40,
            header_y: 1,
            slots: columns::layout_columns(&state.columns, 0, 40, COLUMN_SPACING),
            rows: vec![(0, 2, 1), (1, 3, 1)],
        };

        // Inside the second column's label
        state.click(2 + 20, 1);
        assert_eq!(state.focused_column, 1);
        assert_eq!(state.sort, SortState::by("time", SortDirection::Ascending));

        // First column's edge sits right after its 16 cells
        state.click(2 + 16, 1);
        assert!(state.is_resizing());
        state.drag(2 + 26);
        state.end_drag();
        assert!(!state.is_resizing());
        assert_eq!(state.columns[0].width, 26);

        state.click(5, 3);
        assert_eq!(state.selected, 1);
        assert_eq!(state.focused_column, 0);
    }

    #[test]
    fn test_drag_respects_width_limits() {
        let mut state = state_with(SAMPLE);
        state.layout.x = 0;
        state.layout.header_y = 0;
        state.layout.slots = columns::layout_columns(&state.columns, 0, 40, COLUMN_SPACING);
        state.click(16, 0);
        state.drag(0);
        assert_eq!(state.columns[0].width, state.width_limits.min);
    }
}
