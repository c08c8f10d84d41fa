//! W3C extended log format parsing.
//!
//! IIS writes a `#Fields:` directive naming the columns, followed by
//! space-separated data lines. Parsing is a pure function of the raw text:
//! records are mapped positionally onto the declared fields, with missing
//! values defaulting to the empty string and extra values dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Directive that declares the field layout of the data lines
pub const FIELDS_DIRECTIVE: &str = "#Fields:";

/// Ordered field names declared by the `#Fields:` directive
#[derive(Debug, PartialEq, Eq)]
pub struct FieldSet {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FieldSet {
    pub fn new(names: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // Later declarations win, matching positional assignment in order
            positions.insert(name.clone(), i);
        }
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of the value for `name` within a record
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// One data line mapped onto the declared fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    fields: Arc<FieldSet>,
    values: Vec<String>,
}

impl LogRecord {
    fn from_line(fields: &Arc<FieldSet>, line: &str) -> Self {
        let mut tokens = tokens(line);
        let values = (0..fields.len())
            .map(|_| tokens.next().unwrap_or_default().to_string())
            .collect();
        Self {
            fields: Arc::clone(fields),
            values,
        }
    }

    /// Value for a declared field. `None` only if the field was never declared.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .position(name)
            .map(|i| self.values[i].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(field, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// JSON object keyed by field name, in declaration order
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.values.len());
        for (name, value) in self.iter() {
            map.insert(name.to_string(), Value::String(value.to_string()));
        }
        Value::Object(map)
    }
}

/// A non-`#Fields` directive such as `#Software` or `#Date`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

impl Directive {
    fn parse(line: &str) -> Option<Self> {
        let body = line.strip_prefix('#')?;
        let (name, value) = body.split_once(':')?;
        if name.is_empty() || name.contains(' ') {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLog {
    pub fields: Arc<FieldSet>,
    pub rows: Vec<LogRecord>,
    pub directives: Vec<Directive>,
}

impl ParsedLog {
    pub fn field_names(&self) -> &[String] {
        self.fields.names()
    }

    /// Value of the first directive called `name`
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// Why some text is not a recognizable log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseIssue {
    Empty,
    MissingFieldsDirective,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::Empty => write!(f, "No log text"),
            ParseIssue::MissingFieldsDirective => {
                write!(f, "No {} directive found", FIELDS_DIRECTIVE)
            }
        }
    }
}

/// Split on spaces, collapsing runs of them
fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(' ').filter(|t| !t.is_empty())
}

fn lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Parse raw IIS log text.
///
/// Returns `None` when no `#Fields:` directive is present.
pub fn parse(raw: &str) -> Option<ParsedLog> {
    let header = lines(raw).find(|line| line.starts_with(FIELDS_DIRECTIVE))?;
    let names = tokens(&header[FIELDS_DIRECTIVE.len()..])
        .map(str::to_string)
        .collect();
    let fields = Arc::new(FieldSet::new(names));

    let mut rows = Vec::new();
    let mut directives = Vec::new();
    for line in lines(raw) {
        if line.starts_with('#') {
            if !line.starts_with(FIELDS_DIRECTIVE) {
                directives.extend(Directive::parse(line));
            }
            continue;
        }
        if tokens(line).next().is_none() {
            continue;
        }
        rows.push(LogRecord::from_line(&fields, line));
    }

    Some(ParsedLog {
        fields,
        rows,
        directives,
    })
}

/// Explain why [`parse`] would return `None`, or `None` if it would succeed
pub fn diagnose(raw: &str) -> Option<ParseIssue> {
    if raw.trim().is_empty() {
        Some(ParseIssue::Empty)
    } else if lines(raw).any(|line| line.starts_with(FIELDS_DIRECTIVE)) {
        None
    } else {
        Some(ParseIssue::MissingFieldsDirective)
    }
}
