//! Plain-text rendering of dashboard state.

use sfscon_admin_client::{SortOrder, Summary};
use sfscon_admin_views::{
    datefmt, Banner, BannerKind, ColumnDescriptor, ListEntity, ListViewController,
};
use std::fmt::Write;

/// Table width used when the terminal width is unknown.
pub const DEFAULT_WIDTH: usize = 100;

const MIN_COLUMN_WIDTH: usize = 4;

pub fn overview(summary: Option<&Summary>, last_sync_time: Option<&str>) -> String {
    let mut out = String::new();

    match summary {
        Some(s) => {
            let _ = writeln!(out, "Total Attendees:  {}", s.all_users);
            let _ = writeln!(out, "Total Sessions:   {}", s.total_sessions);
            let _ = writeln!(out, "Total Bookmarks:  {}", s.total_bookmarks);
            let _ = writeln!(out, "Total Ratings:    {}", s.total_rates);
        }
        None => out.push_str("Summary unavailable\n"),
    }

    out.push_str(&last_sync(last_sync_time));
    out.push('\n');

    out
}

pub fn last_sync(last_sync_time: Option<&str>) -> String {
    let formatted = last_sync_time
        .and_then(datefmt::format_default)
        .unwrap_or_else(|| "never".to_string());
    format!("Last sync:        {formatted}")
}

pub fn banner(banner: &Banner) -> String {
    let tag = match banner.kind {
        BannerKind::Success => "ok",
        BannerKind::Info => "info",
        BannerKind::Error => "error",
    };
    format!("[{tag}] {} {}", banner.message, banner.description)
}

/// Render the filtered rows of `view` as a fixed-width table `width`
/// characters wide.
pub fn table<E: ListEntity>(view: &ListViewController<E>, width: usize) -> String {
    let columns = view.columns();
    let widths = column_widths(columns, width);
    let mut out = String::new();

    let headers: Vec<String> = columns
        .iter()
        .map(|column| {
            let order = column
                .sort_field
                .map_or(SortOrder::Unsorted, |field| view.sort().order_for(field));
            header(column, order)
        })
        .collect();
    push_row(&mut out, &headers, &widths);

    let rule: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule));
    out.push('\n');

    for row in view.filtered() {
        push_row(&mut out, &row.cells(), &widths);
    }

    let _ = write!(
        out,
        "{} of {} {}",
        view.filtered().len(),
        view.rows().len(),
        E::KIND.label()
    );
    if !view.search().is_empty() {
        let _ = write!(out, " matching {:?}", view.search());
    }
    out.push('\n');

    out
}

fn header(column: &ColumnDescriptor, order: SortOrder) -> String {
    if !column.is_sortable() {
        return column.title.to_string();
    }
    match order {
        SortOrder::Ascend => format!("{} ▲", column.title),
        SortOrder::Descend => format!("{} ▼", column.title),
        SortOrder::Unsorted => column.title.to_string(),
    }
}

fn column_widths(columns: &[ColumnDescriptor], width: usize) -> Vec<usize> {
    let usable = width.saturating_sub(columns.len().saturating_sub(1));
    columns
        .iter()
        .map(|c| (usable * usize::from(c.width_percent) / 100).max(MIN_COLUMN_WIDTH))
        .collect()
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", fit(cell, w)))
        .collect();
    out.push_str(line.join(" ").trim_end());
    out.push('\n');
}

fn fit(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let mut cut: String = cell.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfscon_admin_client::{AttendeeRow, TalkRow};
    use sfscon_admin_views::{ExportPolicy, ViewQuery};

    fn attendees() -> ListViewController<AttendeeRow> {
        let mut view = ListViewController::new(ExportPolicy::default());
        let request = view.enter(&ViewQuery::parse("sort=-bookmarks"));
        view.complete_fetch(
            request.ticket,
            Ok(vec![AttendeeRow {
                id: "u1".into(),
                bookmarks: 5,
                nr_ratings: 2,
                register_at: "2024-01-01T10:00:00+01:00".into(),
            }]),
        );
        view
    }

    #[test]
    fn test_table_marks_sorted_column() {
        let out = table(&attendees(), DEFAULT_WIDTH);
        let header = out.lines().next().unwrap();
        assert!(header.contains("Bookmarks ▼"));
        assert!(!header.contains('▲'));
        assert!(out.contains("2024-01-01 10:00:00"));
        assert!(out.ends_with("1 of 1 attendees\n"));
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let mut view = ListViewController::<TalkRow>::default();
        let request = view.enter(&ViewQuery::new());
        view.complete_fetch(
            request.ticket,
            Ok(vec![TalkRow {
                title: "A very long title that does not fit".into(),
                speakers: "Jane".into(),
                bookmarks: 1,
                rates: 0,
                avg_rate: None,
            }]),
        );

        let out = table(&view, 40);
        assert!(out.contains('…'));
        assert!(!out.contains("does not fit"));
    }

    #[test]
    fn test_overview_without_data() {
        let out = overview(None, None);
        assert!(out.contains("Summary unavailable"));
        assert!(out.contains("Last sync:        never"));
    }

    #[test]
    fn test_overview_formats_last_sync() {
        let summary = Summary {
            all_users: 10,
            total_sessions: 4,
            total_bookmarks: 7,
            total_rates: 3,
        };
        let out = overview(Some(&summary), Some("2024-11-08T09:30:00+01:00"));
        assert!(out.contains("Total Attendees:  10"));
        assert!(out.contains("2024-11-08 09:30:00"));
    }
}
