//! The dashboard shell: routing, overview panel, sync and the list views.

use crate::banner::Banner;
use crate::columns::column_for_field;
use crate::controller::{ExportPolicy, ListViewController};
use crate::entity::{EntityKind, ListEntity};
use crate::error::{Result, ViewError};
use crate::guard::AuthGuard;
use crate::route::{Link, Route};
use sfscon_admin_client::{AdminClient, AdminClientError, AttendeeRow, SortOrder, Summary, TalkRow};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

pub struct Dashboard {
    client: AdminClient,
    guard: AuthGuard,
    current: Link,
    summary: Option<Summary>,
    last_sync_time: Option<String>,
    banner: Option<Banner>,
    attendees: ListViewController<AttendeeRow>,
    talks: ListViewController<TalkRow>,
}

impl Dashboard {
    pub fn new(client: AdminClient, export_policy: ExportPolicy) -> Self {
        let guard = AuthGuard::new(client.session().clone());
        Self {
            client,
            guard,
            current: Link::new(Route::Admin),
            summary: None,
            last_sync_time: None,
            banner: None,
            attendees: ListViewController::new(export_policy),
            talks: ListViewController::new(export_policy),
        }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    /// The link currently shown.
    pub fn current(&self) -> &Link {
        &self.current
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn last_sync_time(&self) -> Option<&str> {
        self.last_sync_time.as_deref()
    }

    pub fn attendees(&self) -> &ListViewController<AttendeeRow> {
        &self.attendees
    }

    pub fn talks(&self) -> &ListViewController<TalkRow> {
        &self.talks
    }

    /// Open `link`, passing through the auth guard, and load what it shows.
    ///
    /// A token the server rejects sends the dashboard to `/login`. Returns
    /// the link actually shown.
    pub async fn navigate(&mut self, link: Link) -> &Link {
        self.current = self.guard.resolve(link);
        debug!(link = %self.current, "Navigated");

        if !self.current.route.requires_auth() {
            return &self.current;
        }

        let mut rejected = !self.load_overview().await;
        if !rejected {
            rejected = match self.current.route {
                Route::Attendees => {
                    let request = self.attendees.enter(&self.current.query);
                    self.attendees.run(&self.client, request).await;
                    token_rejected(&self.attendees)
                }
                Route::Talks => {
                    let request = self.talks.enter(&self.current.query);
                    self.talks.run(&self.client, request).await;
                    token_rejected(&self.talks)
                }
                Route::Admin | Route::Login => false,
            };
        }

        if rejected {
            self.redirect_to_login();
        }
        &self.current
    }

    /// Sort the list on the current route and mirror the sort into the
    /// current link. Other routes are left alone.
    pub async fn set_sort(&mut self, field: &str, order: SortOrder) -> Result<&Link> {
        let rejected = match self.current.route {
            Route::Attendees => {
                sort_view(&mut self.attendees, &self.client, field, order).await?;
                self.current.query = self.attendees.query().clone();
                token_rejected(&self.attendees)
            }
            Route::Talks => {
                sort_view(&mut self.talks, &self.client, field, order).await?;
                self.current.query = self.talks.query().clone();
                token_rejected(&self.talks)
            }
            Route::Admin | Route::Login => false,
        };

        if rejected {
            self.redirect_to_login();
        }
        Ok(&self.current)
    }

    /// Save a CSV of the `kind` list with that view's sort into `dest_dir`.
    pub async fn export(
        &mut self,
        kind: EntityKind,
        dest_dir: &Path,
    ) -> std::result::Result<PathBuf, AdminClientError> {
        match kind {
            EntityKind::Attendee => self.attendees.export(&self.client, dest_dir).await,
            EntityKind::Talk => self.talks.export(&self.client, dest_dir).await,
        }
    }

    /// Load summary counters and the last sync time.
    ///
    /// Returns `false` when the server rejected the session token.
    pub async fn load_overview(&mut self) -> bool {
        match self.client.summary().await {
            Ok(summary) => self.summary = Some(summary),
            Err(e) if e.is_auth() => {
                self.summary = None;
                return false;
            }
            Err(e) => {
                error!(error = %e, "Error fetching summary");
                self.summary = None;
            }
        }

        self.refresh_last_sync_time().await;
        true
    }

    pub async fn refresh_last_sync_time(&mut self) {
        self.last_sync_time = self
            .client
            .last_sync_time_or_none()
            .await
            .and_then(|t| t.last_sync_time);
    }

    /// Trigger a data import and raise a banner describing the outcome.
    ///
    /// After a successful import the last sync time and the list on the
    /// current route are reloaded.
    pub async fn sync(&mut self) -> &Banner {
        let outcome = self.client.sync().await;
        if outcome.is_ok() {
            self.refresh_last_sync_time().await;
            match self.current.route {
                Route::Attendees => {
                    self.attendees.refresh(&self.client).await;
                }
                Route::Talks => {
                    self.talks.refresh(&self.client).await;
                }
                Route::Admin | Route::Login => {}
            }
        }
        self.banner.insert(Banner::for_sync(&outcome))
    }

    /// The sync banner, unless it has expired by `now`.
    pub fn visible_banner(&self, now: Instant) -> Option<&Banner> {
        self.banner.as_ref().filter(|b| b.is_visible_at(now))
    }

    /// Shell-level search box: write the term into the current link and let
    /// the active view re-filter.
    pub fn filter_table(&mut self, term: &str) {
        self.current.query.set_search(term);
        match self.current.route {
            Route::Attendees => {
                self.attendees.set_search(term);
            }
            Route::Talks => {
                self.talks.set_search(term);
            }
            Route::Admin | Route::Login => {}
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let ok = self.client.login(username, password).await.is_some();
        if ok {
            self.current = Link::new(Route::Admin);
        }
        ok
    }

    pub async fn logout(&mut self) -> &Link {
        self.client.logout().await;
        self.redirect_to_login();
        &self.current
    }

    fn redirect_to_login(&mut self) {
        info!("Redirecting to login");
        self.summary = None;
        self.last_sync_time = None;
        self.current = Link::new(Route::Login);
    }
}

fn token_rejected<E: ListEntity>(view: &ListViewController<E>) -> bool {
    view.last_error().is_some_and(|e| e.auth)
}

async fn sort_view<E: ListEntity>(
    view: &mut ListViewController<E>,
    client: &AdminClient,
    field: &str,
    order: SortOrder,
) -> Result<()> {
    if order.is_active() && column_for_field(E::columns(), field).is_none() {
        return Err(ViewError::UnknownSortField(field.to_string()));
    }

    if let Some(request) = view.set_sort(field, order) {
        view.run(client, request).await;
    }
    Ok(())
}
