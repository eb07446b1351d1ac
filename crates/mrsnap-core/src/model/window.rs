//! Date windows used to pin a point in history

use crate::errors::{Result, SnapError};
use chrono::NaiveDate;
use std::fmt;

/// Inclusive date window `[since, until]`; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimeWindow {
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl TimeWindow {
    /// Build a window, rejecting `since > until`
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(u)) = (since, until) {
            if s > u {
                return Err(SnapError::InvalidWindow {
                    since: s.to_string(),
                    until: u.to_string(),
                }
                .into());
            }
        }
        Ok(Self { since, until })
    }

    /// The open window, meaning "most recent commit overall"
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn since(&self) -> Option<NaiveDate> {
        self.since
    }

    pub fn until(&self) -> Option<NaiveDate> {
        self.until
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.since {
            Some(d) => write!(f, "{}", d)?,
            None => write!(f, "*")?,
        }
        write!(f, "..")?;
        match self.until {
            Some(d) => write!(f, "{}", d),
            None => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let err = TimeWindow::new(Some(d("2024-03-01")), Some(d("2024-01-01"))).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_window_allows_single_day() {
        let w = TimeWindow::new(Some(d("2024-03-01")), Some(d("2024-03-01"))).unwrap();
        assert_eq!(w.to_string(), "2024-03-01..2024-03-01");
    }

    #[test]
    fn test_window_display_open_bounds() {
        assert_eq!(TimeWindow::latest().to_string(), "*..*");
        let w = TimeWindow::new(None, Some(d("2023-12-31"))).unwrap();
        assert_eq!(w.to_string(), "*..2023-12-31");
    }
}
