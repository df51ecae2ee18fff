//! Route table for the client views.
//!
//! Routes without `is_public` require an authenticated session. Enforcement
//! belongs to the host's navigation guard; this module only answers lookups.

use crate::tracker::EventData;

/// View rendered for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    SignUp,
    SignIn,
    Paint,
    Slider,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub is_public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub meta: RouteMeta,
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        !self.meta.is_public
    }
}

const PRIVATE: RouteMeta = RouteMeta { is_public: false };
const PUBLIC: RouteMeta = RouteMeta { is_public: true };

/// Application routes, in match order.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: "Home",
        view: View::Home,
        meta: PRIVATE,
    },
    Route {
        path: "/sign-up",
        name: "sign-up",
        view: View::SignUp,
        meta: PUBLIC,
    },
    Route {
        path: "/sign-in",
        name: "sign-in",
        view: View::SignIn,
        meta: PUBLIC,
    },
    Route {
        path: "/new-canvas",
        name: "paint",
        view: View::Paint,
        meta: PRIVATE,
    },
    Route {
        path: "/slider",
        name: "slider",
        view: View::Slider,
        meta: PRIVATE,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct Router {
    routes: &'static [Route],
}

impl Router {
    pub fn new() -> Self {
        Self { routes: ROUTES }
    }

    pub fn routes(&self) -> &'static [Route] {
        self.routes
    }

    /// First route whose path equals `path`, ignoring a trailing `/`.
    pub fn resolve(&self, path: &str) -> Option<&'static Route> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        self.routes.iter().find(|r| r.path == trimmed)
    }

    pub fn by_name(&self, name: &str) -> Option<&'static Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Unknown paths are treated as protected.
    pub fn requires_auth(&self, path: &str) -> bool {
        self.resolve(path).map_or(true, Route::requires_auth)
    }

    /// `ROUTE_CHANGE` event for a navigation from `from` to `to`.
    pub fn route_change(&self, from: &str, to: &str) -> EventData {
        EventData::route_change(to, from)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
