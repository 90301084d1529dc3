//! Location paths: the addressing scheme shared by the item tree and the
//! subtree descriptor tree.
//!
//! Two textual forms exist. The view layer hands paths around comma-joined
//! (`"2,43,52"`), while the content repository describes where a location
//! lives with a slash-delimited chain (`"/1/2/43/52/"`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::LocationId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid location id {segment:?} in path")]
pub struct PathParseError {
    segment: String,
}

impl PathParseError {
    #[must_use]
    pub fn segment(&self) -> &str {
        &self.segment
    }
}

/// Ancestor-to-descendant chain of location ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocationPath(Vec<LocationId>);

impl LocationPath {
    #[must_use]
    pub fn new(ids: Vec<LocationId>) -> Self {
        Self(ids)
    }

    /// Parse a slash-delimited location path such as `/1/2/43/`.
    ///
    /// Empty segments are ignored, so leading and trailing slashes are optional.
    pub fn from_slashed(raw: &str) -> Result<Self, PathParseError> {
        parse_segments(raw.split('/'))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[LocationId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<LocationId> {
        self.0.last().copied()
    }

    /// The part of the path strictly after the first occurrence of `id`.
    ///
    /// Returns `None` when `id` is not on the path at all.
    #[must_use]
    pub fn after(&self, id: LocationId) -> Option<&[LocationId]> {
        let index = self.0.iter().position(|segment| *segment == id)?;
        Some(&self.0[index + 1..])
    }

    /// Extend the path by one location, returning the new path.
    #[must_use]
    pub fn child(&self, id: LocationId) -> Self {
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.extend_from_slice(&self.0);
        ids.push(id);
        Self(ids)
    }

    /// Render in the slash-delimited location form (`/1/2/43/`).
    #[must_use]
    pub fn to_slashed(&self) -> String {
        let mut out = String::from("/");
        for id in &self.0 {
            out.push_str(&id.to_string());
            out.push('/');
        }
        out
    }
}

fn parse_segments<'a>(
    segments: impl Iterator<Item = &'a str>,
) -> Result<LocationPath, PathParseError> {
    segments
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment.parse::<LocationId>().map_err(|_| PathParseError {
                segment: segment.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LocationPath)
}

/// Parses the comma-joined view form (`"2,43,52"`).
impl FromStr for LocationPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_segments(s.split(','))
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, id) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl From<Vec<LocationId>> for LocationPath {
    fn from(ids: Vec<LocationId>) -> Self {
        Self(ids)
    }
}

impl FromIterator<LocationId> for LocationPath {
    fn from_iter<I: IntoIterator<Item = LocationId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
