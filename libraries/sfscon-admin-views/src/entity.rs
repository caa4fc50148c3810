//! The row kinds a list view can show.

use crate::columns::{ColumnDescriptor, ATTENDEE_COLUMNS, TALK_COLUMNS};
use crate::datefmt;
use sfscon_admin_client::{AttendeeRow, ListRow, TalkRow};
use std::borrow::Cow;
use std::fmt::Debug;

/// Which list a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Attendee,
    Talk,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Attendee => "attendees",
            EntityKind::Talk => "talks",
        }
    }
}

/// A row type with everything a list view needs to show and filter it.
pub trait ListEntity: ListRow + Clone + Debug {
    const KIND: EntityKind;

    fn columns() -> &'static [ColumnDescriptor];

    /// Values the search box matches against.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Display text, one entry per column.
    fn cells(&self) -> Vec<String>;

    /// Case-insensitive substring match. `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl ListEntity for AttendeeRow {
    const KIND: EntityKind = EntityKind::Attendee;

    fn columns() -> &'static [ColumnDescriptor] {
        ATTENDEE_COLUMNS
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.id.as_str()),
            Cow::Owned(self.bookmarks.to_string()),
            Cow::Owned(self.nr_ratings.to_string()),
            Cow::Borrowed(self.register_at.as_str()),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.bookmarks.to_string(),
            self.nr_ratings.to_string(),
            datefmt::format_default(&self.register_at).unwrap_or_default(),
        ]
    }
}

impl ListEntity for TalkRow {
    const KIND: EntityKind = EntityKind::Talk;

    fn columns() -> &'static [ColumnDescriptor] {
        TALK_COLUMNS
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.speakers.as_str()),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.speakers.clone(),
            self.bookmarks.to_string(),
            self.rates.to_string(),
            self.avg_rate
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

/// Rows of `rows` matching `term`. An empty term keeps every row.
pub fn filter_rows<E: ListEntity>(rows: &[E], term: &str) -> Vec<E> {
    if term.is_empty() {
        return rows.to_vec();
    }

    let needle = term.to_lowercase();
    rows.iter()
        .filter(|row| row.matches(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendee(id: &str, bookmarks: u64, nr_ratings: u64, register_at: &str) -> AttendeeRow {
        AttendeeRow {
            id: id.into(),
            bookmarks,
            nr_ratings,
            register_at: register_at.into(),
        }
    }

    fn talk(title: &str, speakers: &str) -> TalkRow {
        TalkRow {
            title: title.into(),
            speakers: speakers.into(),
            bookmarks: 0,
            rates: 0,
            avg_rate: None,
        }
    }

    #[test]
    fn test_attendee_search_by_id() {
        let rows = vec![
            attendee("u1", 5, 2, "2024-01-01"),
            attendee("u2", 1, 0, "2024-02-01"),
        ];
        assert_eq!(filter_rows(&rows, "u2"), vec![rows[1].clone()]);
    }

    #[test]
    fn test_attendee_search_numeric_and_date_fields() {
        let rows = vec![
            attendee("alpha", 15, 2, "2024-01-01"),
            attendee("beta", 1, 7, "2024-02-01"),
        ];
        assert_eq!(filter_rows(&rows, "15").len(), 1);
        assert_eq!(filter_rows(&rows, "7")[0].id, "beta");
        assert_eq!(filter_rows(&rows, "2024-02")[0].id, "beta");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let rows = vec![talk("Rust at Scale", "Jane ROE"), talk("Opening", "Board")];
        assert_eq!(filter_rows(&rows, "rust")[0].title, "Rust at Scale");
        assert_eq!(filter_rows(&rows, "jane roe").len(), 1);
        assert_eq!(filter_rows(&rows, "BOARD")[0].title, "Opening");
    }

    #[test]
    fn test_talk_search_ignores_counters() {
        let mut row = talk("Opening", "Board");
        row.bookmarks = 42;
        assert!(filter_rows(&[row], "42").is_empty());
    }

    #[test]
    fn test_empty_term_is_identity() {
        let rows = vec![talk("a", "b"), talk("c", "d")];
        assert_eq!(filter_rows(&rows, ""), rows);
    }

    #[test]
    fn test_cells_line_up_with_columns() {
        assert_eq!(
            attendee("u1", 1, 1, "2024-01-01").cells().len(),
            AttendeeRow::columns().len()
        );
        assert_eq!(talk("a", "b").cells().len(), TalkRow::columns().len());
        assert_eq!(talk("a", "b").cells()[4], "-");
    }
}
