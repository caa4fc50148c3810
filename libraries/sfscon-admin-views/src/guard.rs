//! Route guard for login-gated views.

use crate::route::{Link, Route};
use sfscon_admin_client::Session;
use std::sync::Arc;
use tracing::debug;

/// Outcome of trying to enter a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Link),
}

pub struct AuthGuard {
    session: Arc<Session>,
}

impl AuthGuard {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Let logged-in users through; send everyone else to `/login`.
    pub fn can_activate(&self, route: Route) -> Navigation {
        if !route.requires_auth() {
            return Navigation::Proceed;
        }

        self.session.set_checking_auth(true);
        self.session.set_loading(true);

        let logged_in = self.session.is_logged_in();

        self.session.set_loading(false);
        self.session.set_checking_auth(false);

        if logged_in {
            Navigation::Proceed
        } else {
            debug!(route = route.path(), "Not logged in, redirecting to login");
            Navigation::Redirect(Link::new(Route::Login))
        }
    }

    /// Resolve a link to the one actually shown.
    pub fn resolve(&self, link: Link) -> Link {
        match self.can_activate(link.route) {
            Navigation::Proceed => link,
            Navigation::Redirect(to) => to,
        }
    }
}
