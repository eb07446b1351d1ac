//! Tagged snapshot keys
//!
//! A key selects one bucket of the snapshot cache. Date windows and
//! user-chosen names live in separate variants and render with distinct
//! prefixes (`range:` / `name:`), so a name can never alias a window.

use crate::errors::{Result, SnapError};
use crate::model::window::TimeWindow;
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const RANGE_PREFIX: &str = "range:";
const NAME_PREFIX: &str = "name:";
const OPEN_BOUND: &str = "*";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnapshotKey {
    /// Latest commit at or before `until` (and at/after `since`)
    Range(TimeWindow),
    /// A snapshot recorded or replayed by name
    Named(String),
}

impl SnapshotKey {
    pub fn range(window: TimeWindow) -> Self {
        SnapshotKey::Range(window)
    }

    /// Build a named key, validating the name
    pub fn named(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(SnapshotKey::Named(name))
    }

    /// Canonical string form, as stored in the cache file
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SnapError::InvalidSnapshotName {
            reason: "name must not be empty".to_string(),
        }
        .into());
    }
    if name.chars().any(char::is_control) {
        return Err(SnapError::InvalidSnapshotName {
            reason: "name must not contain control characters".to_string(),
        }
        .into());
    }
    Ok(())
}

fn parse_bound(key: &str, raw: &str) -> Result<Option<NaiveDate>> {
    if raw == OPEN_BOUND {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| {
            SnapError::InvalidSnapshotKey {
                key: key.to_string(),
                reason: format!("bad date '{}': {}", raw, e),
            }
            .into()
        })
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKey::Range(window) => write!(f, "{}{}", RANGE_PREFIX, window),
            SnapshotKey::Named(name) => write!(f, "{}{}", NAME_PREFIX, name),
        }
    }
}

impl FromStr for SnapshotKey {
    type Err = crate::errors::ExError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix(RANGE_PREFIX) {
            let (since, until) =
                rest.split_once("..")
                    .ok_or_else(|| SnapError::InvalidSnapshotKey {
                        key: s.to_string(),
                        reason: "expected <since>..<until>".to_string(),
                    })?;
            let window = TimeWindow::new(parse_bound(s, since)?, parse_bound(s, until)?)?;
            Ok(SnapshotKey::Range(window))
        } else if let Some(name) = s.strip_prefix(NAME_PREFIX) {
            SnapshotKey::named(name)
        } else {
            Err(SnapError::InvalidSnapshotKey {
                key: s.to_string(),
                reason: "missing 'range:' or 'name:' prefix".to_string(),
            }
            .into())
        }
    }
}

impl Serialize for SnapshotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SnapshotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: crate::errors::ExError| {
            de::Error::custom(e.message().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap())
    }

    #[test]
    fn test_range_canonical_form() {
        let key = SnapshotKey::range(TimeWindow::new(d("2024-01-01"), d("2024-02-01")).unwrap());
        assert_eq!(key.canonical(), "range:2024-01-01..2024-02-01");

        let open = SnapshotKey::range(TimeWindow::new(None, d("2024-02-01")).unwrap());
        assert_eq!(open.canonical(), "range:*..2024-02-01");
    }

    #[test]
    fn test_name_that_looks_like_range_does_not_collide() {
        let range = SnapshotKey::range(TimeWindow::new(d("2024-01-01"), d("2024-02-01")).unwrap());
        let named = SnapshotKey::named("2024-01-01..2024-02-01").unwrap();
        assert_ne!(range, named);
        assert_ne!(range.canonical(), named.canonical());

        let sneaky = SnapshotKey::named("range:2024-01-01..2024-02-01").unwrap();
        assert_eq!(sneaky.canonical(), "name:range:2024-01-01..2024-02-01");
        assert_eq!(sneaky.canonical().parse::<SnapshotKey>().unwrap(), sneaky);
    }

    #[test]
    fn test_parse_rejects_untagged() {
        assert!("2024-01-01 to 2024-02-01".parse::<SnapshotKey>().is_err());
        assert!("range:2024-13-01..*".parse::<SnapshotKey>().is_err());
        assert!("range:2024-01-01".parse::<SnapshotKey>().is_err());
        assert!("name:".parse::<SnapshotKey>().is_err());
    }

    #[test]
    fn test_named_rejects_control_chars() {
        assert!(SnapshotKey::named("release\n1").is_err());
        assert!(SnapshotKey::named("   ").is_err());
        assert!(SnapshotKey::named("release-4.1").is_ok());
    }

    #[test]
    fn test_serde_as_string() {
        let key = SnapshotKey::named("beta").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"name:beta\"");
        let back: SnapshotKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
