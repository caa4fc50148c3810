//! Static column metadata for the list views.

use sfscon_admin_client::SortOrder;

/// One table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub title: &'static str,
    /// Field name sent to the server when sorting by this column
    pub sort_field: Option<&'static str>,
    /// Share of the table width, in percent
    pub width_percent: u8,
    /// Which columns stay visible first on narrow displays (higher wins)
    pub priority: Option<u8>,
}

impl ColumnDescriptor {
    const fn plain(title: &'static str, width_percent: u8) -> Self {
        Self {
            title,
            sort_field: None,
            width_percent,
            priority: None,
        }
    }

    const fn sortable(
        title: &'static str,
        sort_field: &'static str,
        width_percent: u8,
        priority: Option<u8>,
    ) -> Self {
        Self {
            title,
            sort_field: Some(sort_field),
            width_percent,
            priority,
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_field.is_some()
    }

    /// Directions a header click cycles through.
    pub fn sort_directions(&self) -> &'static [SortOrder] {
        if self.is_sortable() {
            &[SortOrder::Ascend, SortOrder::Descend, SortOrder::Unsorted]
        } else {
            &[]
        }
    }
}

pub const ATTENDEE_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::plain("ID", 40),
    ColumnDescriptor::sortable("Bookmarks", "bookmarks", 20, Some(3)),
    ColumnDescriptor::sortable("Number of ratings", "nr_ratings", 20, Some(2)),
    ColumnDescriptor::sortable("Registered", "register_at", 20, Some(1)),
];

pub const TALK_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::plain("Title", 35),
    ColumnDescriptor::plain("Speakers", 20),
    ColumnDescriptor::sortable("Bookmarks", "bookmarks", 15, None),
    ColumnDescriptor::sortable("Ratings", "rates", 15, None),
    ColumnDescriptor::sortable("Average Rating", "avg_rate", 15, None),
];

/// Look up the column that sorts by `field`.
pub fn column_for_field(
    columns: &'static [ColumnDescriptor],
    field: &str,
) -> Option<&'static ColumnDescriptor> {
    columns.iter().find(|c| c.sort_field == Some(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_add_up() {
        for columns in [ATTENDEE_COLUMNS, TALK_COLUMNS] {
            let total: u32 = columns.iter().map(|c| u32::from(c.width_percent)).sum();
            assert_eq!(total, 100);
        }
    }

    #[test]
    fn test_sort_directions() {
        assert!(ATTENDEE_COLUMNS[0].sort_directions().is_empty());
        assert_eq!(ATTENDEE_COLUMNS[1].sort_directions().len(), 3);
    }

    #[test]
    fn test_lookup_by_field() {
        assert_eq!(
            column_for_field(TALK_COLUMNS, "avg_rate").map(|c| c.title),
            Some("Average Rating")
        );
        assert!(column_for_field(TALK_COLUMNS, "title").is_none());
    }
}
