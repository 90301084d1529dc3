//! Resolved, validated settings shared across crates.
//!
//! Raw TOML structs stay private in `content-tree-config`; the loader resolves
//! them into these types at the parse boundary.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LocationId, LocationPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subitems load limit must be greater than zero")]
pub struct PageSizeError;

/// Number of children fetched per request (`subitemsLoadLimit`).
///
/// Invariant: never zero, so rounding up to a page is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(NonZeroU32);

impl PageSize {
    pub const DEFAULT: Self = Self(NonZeroU32::new(10).unwrap());

    pub fn new(value: u32) -> Result<Self, PageSizeError> {
        NonZeroU32::new(value).map(Self).ok_or(PageSizeError)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Smallest multiple of the page size that covers `count` children.
    #[must_use]
    pub fn round_up(self, count: usize) -> u32 {
        let page = self.get() as usize;
        u32::try_from(count.div_ceil(page) * page).unwrap_or(u32::MAX)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings fixed for the lifetime of one content tree instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSettings {
    /// Root of the managed subtree.
    pub root_location_id: LocationId,
    /// Where the viewed content lives, e.g. `/1/2/43/52/`.
    pub current_location_path: LocationPath,
    pub subitems_load_limit: PageSize,
}

impl TreeSettings {
    /// Location highlighted in the view; the last segment of the current path.
    #[must_use]
    pub fn current_location_id(&self) -> Option<LocationId> {
        self.current_location_path.last()
    }
}

/// Opaque request context handed to every loader call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RestInfo {
    pub token: String,
    pub siteaccess: String,
}

impl RestInfo {
    #[must_use]
    pub fn new(token: impl Into<String>, siteaccess: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            siteaccess: siteaccess.into(),
        }
    }
}

// Manual Debug impl so the CSRF token never reaches the logs.
impl fmt::Debug for RestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() {
            "None"
        } else {
            "[REDACTED]"
        };
        f.debug_struct("RestInfo")
            .field("token", &token)
            .field("siteaccess", &self.siteaccess)
            .finish()
    }
}
