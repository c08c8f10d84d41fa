use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::parser::{FieldSet, LogRecord};

/// Display timezone used when the config does not name one
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// Human-readable labels for the standard IIS fields
const FIELD_LABELS: &[(&str, &str)] = &[
    ("date", "Date"),
    ("time", "Time"),
    ("s-ip", "Server IP"),
    ("cs-method", "Method"),
    ("cs-uri-stem", "URI Stem"),
    ("cs-uri-query", "URI Query"),
    ("s-port", "Port"),
    ("cs-username", "Username"),
    ("c-ip", "Client IP"),
    ("cs(User-Agent)", "User Agent"),
    ("cs(Referer)", "Referer"),
    ("sc-status", "Status"),
    ("sc-substatus", "Substatus"),
    ("sc-win32-status", "Win32 Status"),
    ("time-taken", "Time Taken (ms)"),
];

/// Label for a field, or the field name itself if it is not a known IIS field
pub fn label_for(field: &str) -> &str {
    FIELD_LABELS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, label)| *label)
        .unwrap_or(field)
}

/// How a column turns a record into cell text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellFormat {
    /// The raw value, unmodified
    Raw,
    /// Calendar date of the record's instant in the display timezone
    LocalDate,
    /// Clock time of the record's instant in the display timezone
    LocalTime,
}

impl CellFormat {
    pub fn for_field(field: &str) -> Self {
        match field {
            "date" => CellFormat::LocalDate,
            "time" => CellFormat::LocalTime,
            _ => CellFormat::Raw,
        }
    }

    /// Whether values order by the record's instant rather than by text
    pub fn is_chronological(&self) -> bool {
        !matches!(self, CellFormat::Raw)
    }
}

/// The UTC instant formed by a record's `date` and `time` fields.
///
/// IIS always logs in UTC. Returns `None` if either part is missing or
/// does not parse.
pub fn record_instant(record: &LogRecord) -> Option<DateTime<Utc>> {
    let date = record.get("date").filter(|s| !s.is_empty())?;
    let time = record.get("time").filter(|s| !s.is_empty())?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S%.f").ok()?;
    Some(date.and_time(time).and_utc())
}

/// Minimum and maximum width a column may be resized to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidthLimits {
    pub min: u16,
    pub max: u16,
}

impl WidthLimits {
    pub fn clamp(&self, width: i32) -> u16 {
        width.clamp(self.min as i32, self.max as i32) as u16
    }
}

/// A table column derived from a declared field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub label: String,
    pub format: CellFormat,
    pub width: u16,
}

impl Column {
    pub fn new(field: &str, width: u16) -> Self {
        Self {
            field: field.to_string(),
            label: label_for(field).to_string(),
            format: CellFormat::for_field(field),
            width,
        }
    }

    /// Cell text for `record`
    pub fn render<'r>(&self, record: &'r LogRecord, tz: Tz) -> Cow<'r, str> {
        match self.format {
            CellFormat::Raw => Cow::Borrowed(record.get(&self.field).unwrap_or_default()),
            CellFormat::LocalDate => record_instant(record)
                .map(|t| Cow::Owned(t.with_timezone(&tz).format("%Y-%m-%d").to_string()))
                .unwrap_or_default(),
            CellFormat::LocalTime => record_instant(record)
                .map(|t| Cow::Owned(t.with_timezone(&tz).format("%H:%M:%S").to_string()))
                .unwrap_or_default(),
        }
    }

    /// Resize by `delta` cells within `limits`
    pub fn resize(&mut self, delta: i32, limits: WidthLimits) {
        self.width = limits.clamp(self.width as i32 + delta);
    }

    pub fn set_width(&mut self, width: i32, limits: WidthLimits) {
        self.width = limits.clamp(width);
    }
}

/// One column per declared field, in declaration order
pub fn derive_columns(fields: &FieldSet, width: u16) -> Vec<Column> {
    fields
        .names()
        .iter()
        .map(|name| Column::new(name, width))
        .collect()
}

/// Horizontal placement of a visible column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSlot {
    pub index: usize,
    /// Offset from the left edge of the table area
    pub x: u16,
    pub width: u16,
}

impl ColumnSlot {
    /// Cell just right of the column, where its resize handle sits
    pub fn edge(&self) -> u16 {
        self.x + self.width
    }
}

/// Lay out columns from `first` onwards into `available` cells.
///
/// Columns keep their own widths; the last one that only partly fits is
/// truncated and everything after it is scrolled off to the right.
pub fn layout_columns(columns: &[Column], first: usize, available: u16, spacing: u16) -> Vec<ColumnSlot> {
    let mut slots = Vec::new();
    let mut x: u16 = 0;
    for (index, column) in columns.iter().enumerate().skip(first) {
        if x >= available {
            break;
        }
        let width = column.width.min(available - x);
        slots.push(ColumnSlot { index, x, width });
        x = x.saturating_add(width).saturating_add(spacing);
    }
    slots
}

/// Adjust the first visible column so that `focused` is fully in view
pub fn scroll_to_column(columns: &[Column], focused: usize, first: usize, available: u16, spacing: u16) -> usize {
    if focused < first {
        return focused;
    }
    let mut first = first;
    while first < focused {
        let used: u32 = columns[first..=focused]
            .iter()
            .map(|c| c.width as u32 + spacing as u32)
            .sum::<u32>()
            - spacing as u32;
        if used <= available as u32 {
            break;
        }
        first += 1;
    }
    first
}
