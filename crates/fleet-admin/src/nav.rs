//! Navigation catalog and the per-browser flags that hide or show entries.
//!
//! The flags live in a cookie holding a JSON object of `id -> bool`. Without a
//! cookie the catalog defaults apply. With one, only the ids it enables are
//! shown; ids the catalog does not know are dropped, so a stale cookie can
//! never add links.

use std::collections::BTreeMap;

use fleet_table::{url_decode, url_encode};
use serde::Serialize;
use tracing::warn;

use crate::http::Request;

/// One sidebar link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Stable identifier used as the flag key.
    pub id: &'static str,
    /// Link text.
    pub label: &'static str,
    /// Target path.
    pub href: &'static str,
    /// Bootstrap icon class.
    pub icon: &'static str,
    /// Whether the link shows before the browser stored any preference.
    pub default_enabled: bool,
}

/// Every link the sidebar can show, in display order.
pub const NAV_CATALOG: &[NavItem] = &[
    NavItem {
        id: "dashboard",
        label: "Dashboard",
        href: "/",
        icon: "bi-speedometer2",
        default_enabled: true,
    },
    NavItem {
        id: "vehicles",
        label: "Vehicles",
        href: "/vehicles/",
        icon: "bi-truck",
        default_enabled: true,
    },
    NavItem {
        id: "drivers",
        label: "Drivers",
        href: "/drivers/",
        icon: "bi-person-badge",
        default_enabled: true,
    },
    NavItem {
        id: "training",
        label: "Training",
        href: "/training/",
        icon: "bi-mortarboard",
        default_enabled: true,
    },
    NavItem {
        id: "subcontractors",
        label: "Subcontractors",
        href: "/subcontractors/",
        icon: "bi-building",
        default_enabled: true,
    },
    NavItem {
        id: "working-time",
        label: "Working Time",
        href: "/working-time/",
        icon: "bi-clock-history",
        default_enabled: true,
    },
    NavItem {
        id: "subscriptions",
        label: "Subscriptions",
        href: "/subscriptions/",
        icon: "bi-credit-card",
        default_enabled: false,
    },
];

/// Looks up a catalog entry.
pub fn nav_item(id: &str) -> Option<&'static NavItem> {
    NAV_CATALOG.iter().find(|item| item.id == id)
}

/// Which catalog links are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlags {
    flags: BTreeMap<String, bool>,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            flags: NAV_CATALOG
                .iter()
                .map(|item| (item.id.to_string(), item.default_enabled))
                .collect(),
        }
    }
}

impl FeatureFlags {
    /// Returns the catalog defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns flags with every link hidden.
    pub fn all_disabled() -> Self {
        Self {
            flags: NAV_CATALOG
                .iter()
                .map(|item| (item.id.to_string(), false))
                .collect(),
        }
    }

    /// Overlays stored values on these flags, ignoring unknown ids.
    pub fn merge(&mut self, stored: &BTreeMap<String, bool>) {
        for (id, enabled) in stored {
            if let Some(flag) = self.flags.get_mut(id) {
                *flag = *enabled;
            }
        }
    }

    /// Decodes a cookie value.
    ///
    /// Catalog ids missing from the cookie are hidden. A value that is not a
    /// URL-encoded JSON object of booleans hides every link.
    pub fn from_cookie(value: &str) -> Self {
        match serde_json::from_str::<BTreeMap<String, bool>>(&url_decode(value)) {
            Ok(stored) => {
                let mut flags = Self::all_disabled();
                flags.merge(&stored);
                flags
            }
            Err(e) => {
                warn!(error = %e, "undecodable navigation flag cookie; hiding all links");
                Self::all_disabled()
            }
        }
    }

    /// Reads the flags from a request's cookie, falling back to defaults when
    /// the cookie is absent.
    pub fn from_request(req: &Request, cookie_name: &str) -> Self {
        match req.cookie(cookie_name) {
            Some(value) => Self::from_cookie(&value),
            None => Self::default(),
        }
    }

    /// Returns whether a link is shown. Unknown ids are never shown.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    /// Shows or hides a link. Returns `false` for ids outside the catalog.
    pub fn set(&mut self, id: &str, enabled: bool) -> bool {
        match self.flags.get_mut(id) {
            Some(flag) => {
                *flag = enabled;
                true
            }
            None => false,
        }
    }

    /// Flips a link. Returns the new state, or `None` for unknown ids.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let flag = self.flags.get_mut(id)?;
        *flag = !*flag;
        Some(*flag)
    }

    /// Returns the shown links in catalog order.
    pub fn visible_links(&self) -> Vec<&'static NavItem> {
        NAV_CATALOG
            .iter()
            .filter(|item| self.is_enabled(item.id))
            .collect()
    }

    /// Encodes the flags as a cookie value.
    pub fn encode(&self) -> String {
        // A map of string keys to booleans always serializes.
        let json = serde_json::to_string(&self.flags).unwrap_or_else(|_| "{}".to_string());
        url_encode(&json)
    }

    /// Builds the `Set-Cookie` header value that persists these flags.
    pub fn set_cookie_header(&self, name: &str, max_age: u64) -> String {
        format!(
            "{name}={}; Path=/; Max-Age={max_age}; SameSite=Lax",
            self.encode()
        )
    }
}
