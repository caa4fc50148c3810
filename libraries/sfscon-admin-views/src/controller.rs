//! List view controller.
//!
//! Owns the rows of one list view together with its sort, search term and
//! query-string mirror. Sort changes are resolved by the server, so they
//! produce a [`FetchRequest`]; search changes only re-filter the rows that
//! are already loaded.
//!
//! Fetches are tagged with a ticket. Only the most recently issued ticket
//! can replace the rows; late answers to older requests are dropped.

use crate::columns::ColumnDescriptor;
use crate::entity::{filter_rows, ListEntity};
use crate::error::{Result, ViewError};
use crate::query::ViewQuery;
use sfscon_admin_client::{AdminClient, AdminClientError, ListQuery, SortOrder, SortSpec};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The single active sort of a view.
///
/// An unsorted state never carries a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    field: Option<String>,
    order: SortOrder,
}

impl SortState {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        let field = field.into();
        if order.is_active() && !field.is_empty() {
            Self {
                field: Some(field),
                order,
            }
        } else {
            Self::default()
        }
    }

    pub fn from_spec(spec: Option<SortSpec>) -> Self {
        spec.map(|s| Self::new(s.field, s.order))
            .unwrap_or_default()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Direction shown on the header of `field`.
    pub fn order_for(&self, field: &str) -> SortOrder {
        if self.field.as_deref() == Some(field) {
            self.order
        } else {
            SortOrder::Unsorted
        }
    }

    pub fn to_spec(&self) -> Option<SortSpec> {
        self.field
            .as_ref()
            .map(|field| SortSpec::new(field.clone(), self.order))
    }
}

/// What to ask the server for, and the ticket to hand the answer back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: u64,
    pub sort: Option<SortSpec>,
}

impl FetchRequest {
    pub async fn execute<E: ListEntity>(
        &self,
        client: &AdminClient,
    ) -> std::result::Result<Vec<E>, AdminClientError> {
        client.list::<E>(self.sort.as_ref()).await
    }
}

/// Whether exports carry the active search term.
///
/// The server filters exports only by sort by default, regardless of what
/// the search box shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportPolicy {
    pub include_search: bool,
}

/// Why the current rows are empty, when it is not because the list is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub message: String,
    pub auth: bool,
}

impl From<&AdminClientError> for LoadFailure {
    fn from(e: &AdminClientError) -> Self {
        Self {
            message: e.to_string(),
            auth: e.is_auth(),
        }
    }
}

pub struct ListViewController<E: ListEntity> {
    sort: SortState,
    search: String,
    query: ViewQuery,
    rows: Vec<E>,
    filtered: Vec<E>,
    loading: bool,
    exporting: bool,
    last_error: Option<LoadFailure>,
    latest_ticket: u64,
    export_policy: ExportPolicy,
}

impl<E: ListEntity> Default for ListViewController<E> {
    fn default() -> Self {
        Self::new(ExportPolicy::default())
    }
}

impl<E: ListEntity> ListViewController<E> {
    pub fn new(export_policy: ExportPolicy) -> Self {
        Self {
            sort: SortState::default(),
            search: String::new(),
            query: ViewQuery::new(),
            rows: Vec::new(),
            filtered: Vec::new(),
            loading: false,
            exporting: false,
            last_error: None,
            latest_ticket: 0,
            export_policy,
        }
    }

    /// A view restored from `query` without fetching anything.
    pub fn with_query(export_policy: ExportPolicy, query: &ViewQuery) -> Self {
        let mut view = Self::new(export_policy);
        view.adopt_query(query);
        view
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &'static [ColumnDescriptor] {
        E::columns()
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Query string reflecting the current view state.
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// Rows as last fetched, in server order.
    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    /// Rows matching the search term.
    pub fn filtered(&self) -> &[E] {
        &self.filtered
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn last_error(&self) -> Option<&LoadFailure> {
        self.last_error.as_ref()
    }

    pub fn export_policy(&self) -> ExportPolicy {
        self.export_policy
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Enter the view from a link. Always fetches.
    pub fn enter(&mut self, query: &ViewQuery) -> FetchRequest {
        self.adopt_query(query);
        self.issue_fetch()
    }

    /// React to the query string changing underneath the view.
    ///
    /// The search term is re-applied; a fetch is only issued when the sort
    /// differs from the current one.
    pub fn observe_query(&mut self, query: &ViewQuery) -> Option<FetchRequest> {
        let sort_changed = self.adopt_query(query);
        sort_changed.then(|| self.issue_fetch())
    }

    fn adopt_query(&mut self, query: &ViewQuery) -> bool {
        let sort = SortState::from_spec(query.sort());
        let sort_changed = sort != self.sort;

        self.query = query.clone();
        self.sort = sort;
        self.search = query.search().to_string();
        self.refilter();

        sort_changed
    }

    /// Sort by `field` in `order`. Clears any other column's sort.
    ///
    /// Returns `None` when this sort is already active.
    pub fn set_sort(&mut self, field: &str, order: SortOrder) -> Option<FetchRequest> {
        let requested = SortState::new(field, order);
        if requested == self.sort {
            return None;
        }

        debug!(kind = E::KIND.label(), field = %field, order = ?order, "Sort changed");
        self.sort = requested;
        self.query.set_sort(self.sort.to_spec().as_ref());
        Some(self.issue_fetch())
    }

    /// Header of column `index` switched to `order`.
    ///
    /// Non-sortable columns are ignored.
    pub fn activate_column(&mut self, index: usize, order: SortOrder) -> Result<Option<FetchRequest>> {
        let columns = E::columns();
        let column = columns.get(index).ok_or(ViewError::NoSuchColumn {
            index,
            count: columns.len(),
        })?;

        Ok(column
            .sort_field
            .and_then(|field| self.set_sort(field, order)))
    }

    pub fn clear_sort(&mut self) -> Option<FetchRequest> {
        self.set_sort("", SortOrder::Unsorted)
    }

    /// Change the search term. Filters loaded rows; never fetches.
    pub fn set_search(&mut self, term: &str) {
        if term == self.search {
            return;
        }
        self.search = term.to_string();
        self.query.set_search(term);
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter_rows(&self.rows, &self.search);
    }

    fn issue_fetch(&mut self) -> FetchRequest {
        self.latest_ticket += 1;
        self.loading = true;
        FetchRequest {
            ticket: self.latest_ticket,
            sort: self.sort.to_spec(),
        }
    }

    /// Apply the answer to a fetch. Returns whether it was applied.
    ///
    /// A failure empties the view and is kept in [`Self::last_error`].
    pub fn complete_fetch(
        &mut self,
        ticket: u64,
        result: std::result::Result<Vec<E>, AdminClientError>,
    ) -> bool {
        if ticket != self.latest_ticket {
            debug!(
                kind = E::KIND.label(),
                ticket,
                latest = self.latest_ticket,
                "Discarding stale response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(rows) => {
                debug!(kind = E::KIND.label(), rows = rows.len(), "Rows loaded");
                self.rows = rows;
                self.last_error = None;
            }
            Err(e) => {
                warn!(kind = E::KIND.label(), error = %e, "Error loading rows");
                self.rows.clear();
                self.last_error = Some(LoadFailure::from(&e));
            }
        }
        self.refilter();
        true
    }

    /// Issue a fetch for the current sort and apply it.
    pub async fn refresh(&mut self, client: &AdminClient) -> bool {
        let request = self.issue_fetch();
        self.run(client, request).await
    }

    /// Execute `request` and apply its result.
    pub async fn run(&mut self, client: &AdminClient, request: FetchRequest) -> bool {
        let result = request.execute::<E>(client).await;
        self.complete_fetch(request.ticket, result)
    }

    /// Query an export of this view would send.
    pub fn export_query(&self) -> ListQuery {
        let query = ListQuery::sorted(self.sort.to_spec());
        if self.export_policy.include_search {
            query.with_search(self.search.clone())
        } else {
            query
        }
    }

    /// Save a server-rendered CSV of this view into `dest_dir`.
    ///
    /// The exporting flag is held until the download has finished. Loaded
    /// rows are left untouched.
    pub async fn export(
        &mut self,
        client: &AdminClient,
        dest_dir: &Path,
    ) -> std::result::Result<PathBuf, AdminClientError> {
        self.exporting = true;
        let result = client
            .export_csv(E::RESOURCE, &self.export_query(), dest_dir)
            .await;
        self.exporting = false;

        if let Err(e) = &result {
            warn!(kind = E::KIND.label(), error = %e, "Error downloading CSV");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfscon_admin_client::{AttendeeRow, TalkRow};

    fn rows() -> Vec<AttendeeRow> {
        vec![
            AttendeeRow {
                id: "u1".into(),
                bookmarks: 5,
                nr_ratings: 2,
                register_at: "2024-01-01".into(),
            },
            AttendeeRow {
                id: "u2".into(),
                bookmarks: 1,
                nr_ratings: 0,
                register_at: "2024-02-01".into(),
            },
        ]
    }

    fn loaded() -> ListViewController<AttendeeRow> {
        let mut view = ListViewController::default();
        let request = view.enter(&ViewQuery::new());
        assert!(view.complete_fetch(request.ticket, Ok(rows())));
        view
    }

    #[test]
    fn test_enter_adopts_sort_before_first_fetch() {
        let mut view = ListViewController::<AttendeeRow>::default();
        let request = view.enter(&ViewQuery::parse("sort=-bookmarks&search=u"));

        assert_eq!(request.sort, Some(SortSpec::descend("bookmarks")));
        assert_eq!(view.sort().field(), Some("bookmarks"));
        assert_eq!(view.sort().order(), SortOrder::Descend);
        assert_eq!(view.search(), "u");
        assert!(view.is_loading());
    }

    #[test]
    fn test_enter_without_sort_is_unsorted() {
        let mut view = ListViewController::<TalkRow>::default();
        let request = view.enter(&ViewQuery::parse("search=rust"));
        assert_eq!(request.sort, None);
        assert_eq!(view.sort(), &SortState::default());
    }

    #[test]
    fn test_set_sort_mirrors_query_and_fetches() {
        let mut view = loaded();
        let request = view.set_sort("nr_ratings", SortOrder::Ascend).unwrap();

        assert_eq!(request.sort, Some(SortSpec::ascend("nr_ratings")));
        assert_eq!(view.query().get("sort"), Some("nr_ratings"));

        let request = view.set_sort("nr_ratings", SortOrder::Descend).unwrap();
        assert_eq!(request.sort, Some(SortSpec::descend("nr_ratings")));
        assert_eq!(view.query().get("sort"), Some("-nr_ratings"));
    }

    #[test]
    fn test_same_sort_is_a_no_op() {
        let mut view = loaded();
        assert!(view.set_sort("bookmarks", SortOrder::Ascend).is_some());
        assert!(view.set_sort("bookmarks", SortOrder::Ascend).is_none());
    }

    #[test]
    fn test_new_field_clears_previous_field() {
        let mut view = loaded();
        view.set_sort("bookmarks", SortOrder::Descend);
        view.set_sort("register_at", SortOrder::Ascend);

        assert_eq!(view.sort().order_for("bookmarks"), SortOrder::Unsorted);
        assert_eq!(view.sort().order_for("register_at"), SortOrder::Ascend);
    }

    #[test]
    fn test_unsorting_removes_query_param() {
        let mut view = loaded();
        view.set_sort("bookmarks", SortOrder::Ascend);
        let request = view.set_sort("bookmarks", SortOrder::Unsorted).unwrap();

        assert_eq!(request.sort, None);
        assert_eq!(view.sort().field(), None);
        assert_eq!(view.query().get("sort"), None);
        // Already unsorted
        assert!(view.clear_sort().is_none());
    }

    #[test]
    fn test_activate_column() {
        let mut view = loaded();

        // "ID" is not sortable
        assert_eq!(view.activate_column(0, SortOrder::Ascend), Ok(None));

        let request = view.activate_column(3, SortOrder::Descend).unwrap().unwrap();
        assert_eq!(request.sort, Some(SortSpec::descend("register_at")));

        assert_eq!(
            view.activate_column(9, SortOrder::Ascend),
            Err(ViewError::NoSuchColumn { index: 9, count: 4 })
        );
    }

    #[test]
    fn test_search_filters_without_fetching() {
        let mut view = loaded();
        let ticket_before = view.latest_ticket;

        view.set_search("u2");
        assert_eq!(view.filtered(), &rows()[1..]);
        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.query().get("search"), Some("u2"));
        assert_eq!(view.latest_ticket, ticket_before);
        assert!(!view.is_loading());

        view.set_search("");
        assert_eq!(view.filtered(), view.rows());
        assert_eq!(view.query().get("search"), None);
    }

    #[test]
    fn test_search_survives_reload() {
        let mut view = loaded();
        view.set_search("U1");

        let request = view.set_sort("bookmarks", SortOrder::Ascend).unwrap();
        view.complete_fetch(request.ticket, Ok(rows()));
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].id, "u1");
    }

    #[test]
    fn test_observe_query_only_refetches_on_sort_change() {
        let mut view = loaded();

        assert!(view.observe_query(&ViewQuery::parse("search=u1")).is_none());
        assert_eq!(view.filtered().len(), 1);

        let request = view
            .observe_query(&ViewQuery::parse("search=u1&sort=-bookmarks"))
            .unwrap();
        assert_eq!(request.sort, Some(SortSpec::descend("bookmarks")));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = loaded();

        let slow = view.set_sort("bookmarks", SortOrder::Ascend).unwrap();
        let fast = view.set_sort("bookmarks", SortOrder::Descend).unwrap();

        let mut newest = rows();
        newest.reverse();
        assert!(view.complete_fetch(fast.ticket, Ok(newest.clone())));
        assert!(!view.complete_fetch(slow.ticket, Ok(rows())));

        assert_eq!(view.rows(), newest.as_slice());
        assert!(!view.is_loading());
    }

    #[test]
    fn test_loading_until_latest_answer() {
        let mut view = loaded();
        let first = view.set_sort("bookmarks", SortOrder::Ascend).unwrap();
        let second = view.set_sort("bookmarks", SortOrder::Descend).unwrap();

        view.complete_fetch(first.ticket, Ok(rows()));
        assert!(view.is_loading());
        view.complete_fetch(second.ticket, Ok(rows()));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_failure_empties_view_and_is_remembered() {
        let mut view = loaded();
        let request = view.set_sort("bookmarks", SortOrder::Ascend).unwrap();

        view.complete_fetch(request.ticket, Err(AdminClientError::AuthRequired));
        assert!(view.rows().is_empty());
        assert!(view.filtered().is_empty());
        assert!(view.last_error().unwrap().auth);

        let request = view.set_sort("bookmarks", SortOrder::Descend).unwrap();
        view.complete_fetch(request.ticket, Ok(Vec::new()));
        assert!(view.rows().is_empty());
        assert!(view.last_error().is_none());
    }

    #[test]
    fn test_export_query_ignores_search_by_default() {
        let mut view = loaded();
        view.set_sort("nr_ratings", SortOrder::Descend);
        view.set_search("u2");

        let query = view.export_query();
        assert_eq!(query.sort, Some(SortSpec::descend("nr_ratings")));
        assert_eq!(query.search, None);
    }

    #[test]
    fn test_with_query_does_not_fetch() {
        let view = ListViewController::<TalkRow>::with_query(
            ExportPolicy::default(),
            &ViewQuery::parse("sort=-avg_rate&search=rust"),
        );
        assert!(!view.is_loading());
        assert_eq!(view.latest_ticket, 0);
        assert_eq!(view.export_query().sort, Some(SortSpec::descend("avg_rate")));
    }

    #[test]
    fn test_export_query_with_search_policy() {
        let mut view = ListViewController::<AttendeeRow>::new(ExportPolicy {
            include_search: true,
        });
        view.set_search("u2");
        assert_eq!(view.export_query().search.as_deref(), Some("u2"));
    }
}
