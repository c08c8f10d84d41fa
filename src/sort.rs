use std::cmp::Ordering;

use crate::columns::{CellFormat, record_instant};
use crate::parser::ParsedLog;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Marker appended to the sorted column's header
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Single active sort column, if any
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(field: &str, direction: SortDirection) -> Self {
        Self {
            column: Some(field.to_string()),
            direction,
        }
    }

    /// Next state after activating `field`'s header.
    ///
    /// The same column cycles ascending → descending → unsorted; any other
    /// column starts ascending and replaces the current one.
    pub fn toggle(&self, field: &str) -> Self {
        match (&self.column, self.direction) {
            (Some(current), SortDirection::Ascending) if current == field => {
                Self::by(field, SortDirection::Descending)
            }
            (Some(current), SortDirection::Descending) if current == field => Self::default(),
            _ => Self::by(field, SortDirection::Ascending),
        }
    }

    /// Direction shown for `field`, if it is the sorted column
    pub fn direction_for(&self, field: &str) -> Option<SortDirection> {
        match &self.column {
            Some(column) if column == field => Some(self.direction),
            _ => None,
        }
    }

    /// Reorder `order` (indices into `log.rows`) in place.
    ///
    /// The sort is stable, so equal keys keep their input order and an
    /// unsorted state leaves `order` untouched.
    pub fn apply(&self, log: &ParsedLog, order: &mut [usize]) {
        let Some(field) = &self.column else {
            return;
        };
        let direction = self.direction;

        if CellFormat::for_field(field).is_chronological() {
            let keys: Vec<_> = log.rows.iter().map(record_instant).collect();
            order.sort_by(|&a, &b| direction.apply(keys[a].cmp(&keys[b])));
        } else {
            let Some(position) = log.fields.position(field) else {
                return;
            };
            order.sort_by(|&a, &b| {
                let a = &log.rows[a].values()[position];
                let b = &log.rows[b].values()[position];
                direction.apply(a.cmp(b))
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn values(log: &ParsedLog, order: &[usize], field: &str) -> Vec<String> {
        order
            .iter()
            .map(|&i| log.rows[i].get(field).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_toggle_cycles_single_column() {
        let state = SortState::default();
        let asc = state.toggle("c-ip");
        assert_eq!(asc, SortState::by("c-ip", SortDirection::Ascending));
        let desc = asc.toggle("c-ip");
        assert_eq!(desc, SortState::by("c-ip", SortDirection::Descending));
        let none = desc.toggle("c-ip");
        assert_eq!(none.column, None);
    }

    #[test]
    fn test_toggle_other_column_replaces_sort() {
        let state = SortState::by("c-ip", SortDirection::Descending);
        let next = state.toggle("sc-status");
        assert_eq!(next, SortState::by("sc-status", SortDirection::Ascending));
        assert_eq!(next.direction_for("c-ip"), None);
        assert_eq!(next.direction_for("sc-status"), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_string_sort_cycle() {
        let log = parse("#Fields: cs-uri-stem\n/b\n/c\n/a\n/d").unwrap();
        let original: Vec<usize> = (0..log.rows.len()).collect();

        let state = SortState::default().toggle("cs-uri-stem");
        let mut order = original.clone();
        state.apply(&log, &mut order);
        let asc = values(&log, &order, "cs-uri-stem");
        assert!(asc.windows(2).all(|w| w[0] <= w[1]));

        let state = state.toggle("cs-uri-stem");
        let mut order = original.clone();
        state.apply(&log, &mut order);
        let desc = values(&log, &order, "cs-uri-stem");
        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);

        let state = state.toggle("cs-uri-stem");
        let mut order = original.clone();
        state.apply(&log, &mut order);
        assert_eq!(order, original);
    }

    #[test]
    fn test_string_sort_is_lexicographic() {
        let log = parse("#Fields: time-taken\n15\n200\n3").unwrap();
        let mut order = vec![0, 1, 2];
        SortState::by("time-taken", SortDirection::Ascending).apply(&log, &mut order);
        assert_eq!(values(&log, &order, "time-taken"), ["15", "200", "3"]);
    }

    #[test]
    fn test_time_sorts_by_instant() {
        let raw = "#Fields: date time\n\
                   2024-01-02 00:10:00\n\
                   2024-01-01 23:30:00\n\
                   2024-01-01 08:00:00";
        let log = parse(raw).unwrap();
        let mut order = vec![0, 1, 2];
        SortState::by("time", SortDirection::Ascending).apply(&log, &mut order);
        assert_eq!(order, [2, 1, 0]);

        let mut order = vec![0, 1, 2];
        SortState::by("date", SortDirection::Descending).apply(&log, &mut order);
        assert_eq!(order, [0, 1, 2]);
    }

    #[test]
    fn test_unparseable_instants_sort_first() {
        let log = parse("#Fields: date time\n2024-01-01 10:00:00\nbad 10:00:00").unwrap();
        let mut order = vec![0, 1];
        SortState::by("time", SortDirection::Ascending).apply(&log, &mut order);
        assert_eq!(order, [1, 0]);
    }

    #[test]
    fn test_sort_preserves_subset() {
        let log = parse("#Fields: a\nc\nb\na\nd").unwrap();
        let mut order = vec![3, 0];
        SortState::by("a", SortDirection::Ascending).apply(&log, &mut order);
        assert_eq!(order, [0, 3]);
        assert_eq!(log.rows[0].get("a"), Some("c"));
    }

    #[test]
    fn test_unknown_column_leaves_order() {
        let log = parse("#Fields: a\n2\n1").unwrap();
        let mut order = vec![0, 1];
        SortState::by("missing", SortDirection::Ascending).apply(&log, &mut order);
        assert_eq!(order, [0, 1]);
    }
}
