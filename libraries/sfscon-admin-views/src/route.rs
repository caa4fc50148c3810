//! Dashboard routes and shareable links.

use crate::error::{Result, ViewError};
use crate::query::ViewQuery;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Admin,
    Attendees,
    Talks,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Admin => "/admin",
            Route::Attendees => "/admin/attendees",
            Route::Talks => "/admin/talks",
        }
    }

    pub fn requires_auth(self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl FromStr for Route {
    type Err = ViewError;

    fn from_str(path: &str) -> Result<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "/login" | "login" => Ok(Route::Login),
            "" | "/admin" | "admin" => Ok(Route::Admin),
            "/admin/attendees" | "admin/attendees" => Ok(Route::Attendees),
            "/admin/talks" | "admin/talks" => Ok(Route::Talks),
            _ => Err(ViewError::UnknownRoute(path.to_string())),
        }
    }
}

/// A route plus its query string, e.g. `/admin/attendees?sort=-bookmarks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub route: Route,
    pub query: ViewQuery,
}

impl Link {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            query: ViewQuery::new(),
        }
    }

    pub fn with_query(route: Route, query: ViewQuery) -> Self {
        Self { route, query }
    }

    /// Parse a path-and-query, or a full URL whose path is a dashboard route.
    pub fn parse(link: &str) -> Result<Self> {
        let link = link.trim();
        if link.contains("://") {
            let url = url::Url::parse(link).map_err(|e| ViewError::InvalidLink(e.to_string()))?;
            let route = url.path().parse()?;
            let query = ViewQuery::parse(url.query().unwrap_or_default());
            return Ok(Self { route, query });
        }

        let (path, query) = link.split_once('?').unwrap_or((link, ""));
        Ok(Self {
            route: path.parse()?,
            query: ViewQuery::parse(query),
        })
    }
}

impl FromStr for Link {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            f.write_str(self.route.path())
        } else {
            write!(f, "{}?{}", self.route.path(), self.query)
        }
    }
}
