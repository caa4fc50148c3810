//! Property tests for list view invariants.

use proptest::prelude::*;
use sfscon_admin_client::{AttendeeRow, SortOrder, TalkRow};
use sfscon_admin_views::{filter_rows, ListViewController, ViewQuery};

fn attendee() -> impl Strategy<Value = AttendeeRow> {
    ("[a-z0-9]{1,8}", 0u64..500, 0u64..100, "20[0-9]{2}-[01][0-9]-[0-3][0-9]").prop_map(
        |(id, bookmarks, nr_ratings, register_at)| AttendeeRow {
            id,
            bookmarks,
            nr_ratings,
            register_at,
        },
    )
}

fn talk() -> impl Strategy<Value = TalkRow> {
    ("[A-Za-z ]{1,20}", "[A-Za-z ,]{0,20}").prop_map(|(title, speakers)| TalkRow {
        title,
        speakers,
        bookmarks: 0,
        rates: 0,
        avg_rate: None,
    })
}

fn order() -> impl Strategy<Value = SortOrder> {
    prop_oneof![
        Just(SortOrder::Ascend),
        Just(SortOrder::Descend),
        Just(SortOrder::Unsorted)
    ]
}

proptest! {
    /// Property: an empty search term is the identity
    #[test]
    fn empty_search_is_identity(rows in prop::collection::vec(attendee(), 0..20)) {
        prop_assert_eq!(filter_rows(&rows, ""), rows);
    }

    /// Property: filtered rows are exactly the rows with a matching field
    #[test]
    fn filter_keeps_exactly_matches(
        rows in prop::collection::vec(talk(), 0..20),
        term in "[A-Za-z]{1,3}",
    ) {
        let needle = term.to_lowercase();
        let expected: Vec<TalkRow> = rows
            .iter()
            .filter(|r| r.title.to_lowercase().contains(&needle) || r.speakers.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        prop_assert_eq!(filter_rows(&rows, &term), expected);
    }

    /// Property: at most one field is ever sorted, and the query mirrors it
    #[test]
    fn at_most_one_sorted_field(
        steps in prop::collection::vec((0usize..4, order()), 1..12)
    ) {
        let mut view = ListViewController::<AttendeeRow>::default();
        view.enter(&ViewQuery::new());

        for (index, order) in steps {
            view.activate_column(index, order).unwrap();

            let active = view
                .columns()
                .iter()
                .filter_map(|c| c.sort_field)
                .filter(|f| view.sort().order_for(f) != SortOrder::Unsorted)
                .count();
            prop_assert!(active <= 1);
            prop_assert_eq!(
                ViewQuery::parse(&view.query().to_string()).sort(),
                view.sort().to_spec()
            );
        }
    }
}
