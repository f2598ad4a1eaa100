//! Client-side route table.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Gallery,
    Contact,
    Privacy,
    Accessibility,
    /// Admin entry point. Shows the login form when logged out.
    Admin,
    AdminContacts,
    AdminGallery,
    AdminContent,
    AdminAnalytics,
    AdminHomeGallery,
    AdminBackups,
    NotFound(String),
}

impl Route {
    /// Resolves a location path. Query strings, fragments and a trailing
    /// slash are ignored.
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        match normalized {
            "/" => Route::Home,
            "/gallery" => Route::Gallery,
            "/contact" => Route::Contact,
            "/privacy" => Route::Privacy,
            "/accessibility" => Route::Accessibility,
            "/admin" => Route::Admin,
            "/admin/contacts" => Route::AdminContacts,
            "/admin/gallery" => Route::AdminGallery,
            "/admin/content" => Route::AdminContent,
            "/admin/analytics" => Route::AdminAnalytics,
            "/admin/home-gallery" => Route::AdminHomeGallery,
            "/admin/backups" => Route::AdminBackups,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Gallery => "/gallery",
            Route::Contact => "/contact",
            Route::Privacy => "/privacy",
            Route::Accessibility => "/accessibility",
            Route::Admin => "/admin",
            Route::AdminContacts => "/admin/contacts",
            Route::AdminGallery => "/admin/gallery",
            Route::AdminContent => "/admin/content",
            Route::AdminAnalytics => "/admin/analytics",
            Route::AdminHomeGallery => "/admin/home-gallery",
            Route::AdminBackups => "/admin/backups",
            Route::NotFound(path) => path,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Route::Admin
                | Route::AdminContacts
                | Route::AdminGallery
                | Route::AdminContent
                | Route::AdminAnalytics
                | Route::AdminHomeGallery
                | Route::AdminBackups
        )
    }

    /// Admin routes that require a logged-in session.
    pub fn requires_session(&self) -> bool {
        self.is_admin() && *self != Route::Admin
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of the admin route guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}
