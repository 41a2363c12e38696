//! Calendar-month partition key (`YYYY-MM`).

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// One calendar month; the unit of pipeline processing.
///
/// Ordering is chronological, which matches the lexical order of the
/// `YYYY-MM` rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMonth`] if `month` is outside `1..=12` or
    /// `year` does not fit in four digits.
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(CoreError::InvalidMonth(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar month immediately before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let m: Month = "2024-03".parse().unwrap();
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 3);
        assert_eq!(m.to_string(), "2024-03");
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in ["2024-3", "24-03", "2024-13", "2024-00", "2024/03", "abcd-ef", "2024-03-01"] {
            assert!(bad.parse::<Month>().is_err(), "expected '{bad}' to be rejected");
        }
    }

    #[test]
    fn previous_wraps_year() {
        let jan: Month = "2024-01".parse().unwrap();
        assert_eq!(jan.previous().to_string(), "2023-12");
        let jul: Month = "2024-07".parse().unwrap();
        assert_eq!(jul.previous().to_string(), "2024-06");
    }

    #[test]
    fn ordering_is_chronological() {
        let mut months: Vec<Month> = ["2024-02", "2023-12", "2024-01"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        months.sort();
        let rendered: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["2023-12", "2024-01", "2024-02"]);
    }
}
