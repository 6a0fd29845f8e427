//! Fakebank endpoint paths.

use std::fmt;

/// Every resource path the fakebank backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiRoute {
    Cards,
    Clients,
    Operations,
    Statements,
    Notifications,
}

impl ApiRoute {
    pub const ALL: [ApiRoute; 5] = [
        ApiRoute::Cards,
        ApiRoute::Clients,
        ApiRoute::Operations,
        ApiRoute::Statements,
        ApiRoute::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiRoute::Cards => "/fakebank/cards",
            ApiRoute::Clients => "/fakebank/clients",
            // Operations live under the accounts resource on the backend.
            ApiRoute::Operations => "/fakebank/accounts",
            ApiRoute::Statements => "/fakebank/statements",
            ApiRoute::Notifications => "/fakebank/notifications",
        }
    }

    /// `{path}/{id}` for item-level endpoints.
    pub fn item(&self, id: impl fmt::Display) -> String {
        format!("{}/{id}", self.as_str())
    }
}

impl fmt::Display for ApiRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
