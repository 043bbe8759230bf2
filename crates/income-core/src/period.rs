//! The registry query window derived from a calculation date.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Day of the month by which employers must have reported the previous
/// month's income.
const REPORTING_DEADLINE_DAY: u32 = 5;

/// Number of months covered by an [`EarningPeriod`].
pub const EARNING_PERIOD_MONTHS: u32 = 36;

// ─── YearMonth ───────────────────────────────────────────────────────────────

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
  year:  i32,
  month: u32,
}

impl YearMonth {
  /// Returns `None` unless `1 <= month <= 12`.
  pub fn new(year: i32, month: u32) -> Option<Self> {
    (1..=12).contains(&month).then_some(Self { year, month })
  }

  pub fn of(date: NaiveDate) -> Self {
    Self { year: date.year(), month: date.month() }
  }

  pub fn year(&self) -> i32 { self.year }

  pub fn month(&self) -> u32 { self.month }

  pub fn minus_months(self, n: u32) -> Self {
    let index = self.year * 12 + (self.month as i32 - 1) - n as i32;
    Self {
      year:  index.div_euclid(12),
      month: index.rem_euclid(12) as u32 + 1,
    }
  }
}

impl fmt::Display for YearMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid year-month: {0:?}")]
pub struct ParseYearMonthError(String);

impl FromStr for YearMonth {
  type Err = ParseYearMonthError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let err = || ParseYearMonthError(s.to_owned());
    let (y, m) = s.split_once('-').ok_or_else(err)?;
    let year = y.parse().map_err(|_| err())?;
    let month = m.parse().map_err(|_| err())?;
    YearMonth::new(year, month).ok_or_else(err)
  }
}

impl Serialize for YearMonth {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for YearMonth {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let s = String::deserialize(d)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

// ─── EarningPeriod ───────────────────────────────────────────────────────────

/// The closed range of months whose income is relevant for a calculation
/// date: the last month whose reporting deadline has passed, and the 35
/// months before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningPeriod {
  pub first_month: YearMonth,
  pub last_month:  YearMonth,
}

impl EarningPeriod {
  pub fn from_calculation_date(date: NaiveDate) -> Self {
    let current = YearMonth::of(date);
    let last_month = if date > reporting_deadline(date) {
      current.minus_months(1)
    } else {
      current.minus_months(2)
    };
    Self {
      first_month: last_month.minus_months(EARNING_PERIOD_MONTHS - 1),
      last_month,
    }
  }
}

/// The reporting deadline in `date`'s month, pushed past a weekend.
fn reporting_deadline(date: NaiveDate) -> NaiveDate {
  // The 5th exists in every month, so with_day cannot fail here.
  let mut deadline = date.with_day(REPORTING_DEADLINE_DAY).unwrap_or(date);
  while matches!(deadline.weekday(), Weekday::Sat | Weekday::Sun) {
    deadline = deadline + Days::new(1);
  }
  deadline
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn ym(y: i32, m: u32) -> YearMonth { YearMonth::new(y, m).unwrap() }

  #[test]
  fn after_deadline_uses_previous_month() {
    // 2024-01-05 is a Friday.
    let p = EarningPeriod::from_calculation_date(date(2024, 1, 15));
    assert_eq!(p.last_month, ym(2023, 12));
    assert_eq!(p.first_month, ym(2021, 1));
  }

  #[test]
  fn on_deadline_uses_month_before_previous() {
    let p = EarningPeriod::from_calculation_date(date(2024, 1, 5));
    assert_eq!(p.last_month, ym(2023, 11));
    assert_eq!(p.first_month, ym(2020, 12));
  }

  #[test]
  fn weekend_deadline_moves_to_monday() {
    // 2024-05-05 is a Sunday, so the deadline is Monday 2024-05-06.
    let p = EarningPeriod::from_calculation_date(date(2024, 5, 6));
    assert_eq!(p.last_month, ym(2024, 3));

    let p = EarningPeriod::from_calculation_date(date(2024, 5, 7));
    assert_eq!(p.last_month, ym(2024, 4));
  }

  #[test]
  fn window_spans_thirty_six_months() {
    let p = EarningPeriod::from_calculation_date(date(2019, 3, 20));
    let span = (p.last_month.year() - p.first_month.year()) * 12
      + p.last_month.month() as i32
      - p.first_month.month() as i32
      + 1;
    assert_eq!(span, EARNING_PERIOD_MONTHS as i32);
  }

  #[test]
  fn minus_months_crosses_year_boundaries() {
    assert_eq!(ym(2024, 1).minus_months(1), ym(2023, 12));
    assert_eq!(ym(2024, 3).minus_months(14), ym(2023, 1));
    assert_eq!(ym(2024, 12).minus_months(0), ym(2024, 12));
  }

  #[test]
  fn year_month_parse_and_display() {
    assert_eq!("2023-07".parse::<YearMonth>().unwrap(), ym(2023, 7));
    assert_eq!(ym(2023, 7).to_string(), "2023-07");
    assert!("2023-13".parse::<YearMonth>().is_err());
    assert!("202307".parse::<YearMonth>().is_err());
  }

  #[test]
  fn year_month_serializes_as_string() {
    let json = serde_json::to_string(&ym(2021, 2)).unwrap();
    assert_eq!(json, "\"2021-02\"");
    let back: YearMonth = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ym(2021, 2));
  }
}
