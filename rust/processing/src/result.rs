// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Match results: one assignment per input surface.

use crate::error::Result;
use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Literal reported for surfaces without a matching wall
pub const UNMATCHED: &str = "none";

/// Terminal state of one surface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Assignment {
    Matched(String),
    Unmatched,
}

impl Assignment {
    /// Wall id, or `"none"`
    pub fn as_str(&self) -> &str {
        match self {
            Assignment::Matched(wall) => wall,
            Assignment::Unmatched => UNMATCHED,
        }
    }

    pub fn wall_id(&self) -> Option<&str> {
        match self {
            Assignment::Matched(wall) => Some(wall),
            Assignment::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Assignment::Matched(_))
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Assignment for a single surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMatch {
    pub surface_id: String,
    pub assignment: Assignment,
}

/// Total mapping from surface id to assignment.
///
/// Keeps the input surface order; serializes as a flat JSON object
/// `{"surfaceId": "wallId" | "none"}`.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    entries: Vec<SurfaceMatch>,
    index: FxHashMap<String, usize>,
}

impl MatchResult {
    /// Build from entries with unique surface ids
    pub(crate) fn from_entries(entries: Vec<SurfaceMatch>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.surface_id.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, surface_id: &str) -> Option<&Assignment> {
        self.index
            .get(surface_id)
            .map(|&i| &self.entries[i].assignment)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in input surface order
    pub fn iter(&self) -> impl Iterator<Item = &SurfaceMatch> {
        self.entries.iter()
    }

    pub fn matched_count(&self) -> usize {
        self.iter()
            .filter(|e| e.assignment.is_matched())
            .count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.len() - self.matched_count()
    }

    /// Surface id to wall id or `"none"`
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|e| (e.surface_id.clone(), e.assignment.as_str().to_string()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl PartialEq for MatchResult {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for MatchResult {}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.surface_id, &entry.assignment)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        MatchResult::from_entries(vec![
            SurfaceMatch {
                surface_id: "s1".into(),
                assignment: Assignment::Matched("w1".into()),
            },
            SurfaceMatch {
                surface_id: "s2".into(),
                assignment: Assignment::Unmatched,
            },
        ])
    }

    #[test]
    fn lookup_and_counts() {
        let result = sample();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("s1").and_then(Assignment::wall_id), Some("w1"));
        assert_eq!(result.get("s2"), Some(&Assignment::Unmatched));
        assert!(result.get("s3").is_none());
        assert_eq!(result.matched_count(), 1);
        assert_eq!(result.unmatched_count(), 1);
    }

    #[test]
    fn unmatched_renders_as_none() {
        let map = sample().to_map();
        assert_eq!(map["s1"], "w1");
        assert_eq!(map["s2"], "none");
    }

    #[test]
    fn serializes_as_flat_object() {
        let json = sample().to_json().unwrap();
        assert_eq!(json, r#"{"s1":"w1","s2":"none"}"#);
    }
}
