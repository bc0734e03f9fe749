//! Usage domain entities

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::pricing::Availability;
use crate::support::{DomainError, DomainResult};

/// A calendar month that usage is billed for.
///
/// Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingPeriod {
    start: NaiveDate,
}

impl BillingPeriod {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|start| Self { start })
            .ok_or_else(|| {
                DomainError::Validation(format!("invalid billing month {year}-{month:02}"))
            })
    }

    /// Period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    pub fn last_day(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    pub fn hours(&self) -> u32 {
        self.days() * 24
    }

    pub fn next(&self) -> Self {
        Self {
            start: self
                .start
                .checked_add_months(Months::new(1))
                .unwrap_or(self.start),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            start: self
                .start
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.start),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// Whether the inclusive range `[start, end]` shares at least one day
    /// with this month.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= end && start <= self.last_day() && end >= self.first_day()
    }
}

impl FromStr for BillingPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::Validation(format!("expected YYYY-MM, got {s:?}"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BillingPeriod {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingPeriod> for String {
    fn from(period: BillingPeriod) -> Self {
        period.to_string()
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// One project's usage for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    #[serde(default)]
    pub name: String,
    pub month: u32,
    pub year: i32,
    pub hits: u64,
    pub availability: Availability,
    /// GB-days of storage
    pub storage_days: f64,
    pub prod_hours: f64,
    pub dev_hours: f64,
}

impl UsageRecord {
    pub fn period(&self) -> DomainResult<BillingPeriod> {
        BillingPeriod::new(self.year, self.month)
    }

    /// Reject out-of-range months and negative or non-finite quantities.
    pub fn validate(&self) -> DomainResult<()> {
        self.period()?;
        for field in [UsageField::StorageDays, UsageField::ProdHours, UsageField::DevHours] {
            let value = field.value(self);
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::invalid_usage(field.name(), value));
            }
        }
        Ok(())
    }
}

/// Numeric fields of a [`UsageRecord`] that can be aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageField {
    Hits,
    StorageDays,
    ProdHours,
    DevHours,
}

impl UsageField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::StorageDays => "storageDays",
            Self::ProdHours => "prodHours",
            Self::DevHours => "devHours",
        }
    }

    pub fn value(&self, record: &UsageRecord) -> f64 {
        match self {
            Self::Hits => record.hits as f64,
            Self::StorageDays => record.storage_days,
            Self::ProdHours => record.prod_hours,
            Self::DevHours => record.dev_hours,
        }
    }
}

/// Hit counter of one environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitCount {
    pub total: u64,
}

/// Storage snapshot of one environment, taken at month end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSnapshot {
    pub bytes_used: String,
    pub month: String,
}

/// Hours an environment ran during a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourCount {
    pub month: String,
    pub hours: f64,
}

/// Raw per-environment counters as reported by the hosting platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEnvironmentUsage {
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: String,
    pub hits: HitCount,
    pub storage: StorageSnapshot,
    pub hours: HourCount,
}

impl RawEnvironmentUsage {
    pub const PRODUCTION: &'static str = "production";

    pub fn is_production(&self) -> bool {
        self.environment_type == Self::PRODUCTION
    }
}

/// Billable totals of one project, summed over its environments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTotals {
    pub hits: u64,
    pub storage_days: f64,
    pub prod_hours: f64,
    pub dev_hours: f64,
}

// ── Tests ──────────────────────────────────────────────────────
