//! Pricing configuration entities
//!
//! Currency-keyed rate tables: shared hit-tier boundaries, per-availability hit
//! schedules, storage rates and hourly environment rates.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::support::{AppError, DomainError, DomainResult};

/// Billing currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
    Aud,
    Chf,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Gbp,
        Currency::Eur,
        Currency::Aud,
        Currency::Chf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
            Self::Aud => "AUD",
            Self::Chf => "CHF",
        }
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            "EUR" => Ok(Self::Eur),
            "AUD" => Ok(Self::Aud),
            "CHF" => Ok(Self::Chf),
            _ => Err(DomainError::UnknownCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service availability class, selects the compute hourly rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Availability {
    Standard,
    High,
}

impl Availability {
    pub const ALL: [Availability; 2] = [Availability::Standard, Availability::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::High => "HIGH",
        }
    }
}

impl FromStr for Availability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(Self::Standard),
            "HIGH" => Ok(Self::High),
            _ => Err(DomainError::UnknownAvailability(s.to_string())),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive hit range. `max = None` marks the open-ended top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTier {
    pub min: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl HitTier {
    pub fn new(min: u64, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, hits: u64) -> bool {
        hits >= self.min && self.max.map_or(true, |max| hits <= max)
    }
}

/// Hit charges for one currency and availability class.
///
/// `base` is a flat charge covering the tier 0 allotment; `rates[i]` is the
/// per-hit rate for the portion of hits falling inside tier `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitSchedule {
    pub availability: Availability,
    pub base: Decimal,
    pub rates: Vec<Decimal>,
}

/// Hourly environment rates for one availability class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRates {
    pub availability: Availability,
    pub prod: Decimal,
    pub dev: Decimal,
}

/// Development hours included before the dev rate applies, expressed in
/// full-month environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentAllowance {
    PerProject(u32),
    PerGroup(u32),
}

impl DevelopmentAllowance {
    /// Number of full-month environments included for a group.
    pub fn environments(&self, project_count: usize) -> u64 {
        match *self {
            Self::PerProject(n) => n as u64 * project_count as u64,
            Self::PerGroup(n) => n as u64,
        }
    }
}

impl Default for DevelopmentAllowance {
    fn default() -> Self {
        Self::PerProject(0)
    }
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

/// Complete rate table for one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPricing {
    pub currency: Currency,
    /// Conversion applied to the progressive hit charge.
    #[serde(default = "default_multiplier")]
    pub hit_multiplier: Decimal,
    pub hits: Vec<HitSchedule>,
    /// Price per GB-day beyond the included allowance.
    pub storage_rate: Decimal,
    /// GB included per project per day of the month.
    #[serde(default)]
    pub storage_included_gb: Decimal,
    pub environments: Vec<EnvironmentRates>,
    #[serde(default)]
    pub dev_allowance: DevelopmentAllowance,
}

impl CurrencyPricing {
    pub fn hit_schedule(&self, availability: Availability) -> Option<&HitSchedule> {
        self.hits.iter().find(|s| s.availability == availability)
    }

    pub fn environment_rates(&self, availability: Availability) -> Option<&EnvironmentRates> {
        self.environments
            .iter()
            .find(|r| r.availability == availability)
    }
}

/// Versionable pricing table consumed by the cost engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub hit_tiers: Vec<HitTier>,
    pub currencies: Vec<CurrencyPricing>,
}

/// Rates resolved for a single currency and availability class
#[derive(Debug, Clone, Copy)]
pub struct RateCard<'a> {
    pub currency: Currency,
    pub availability: Availability,
    pub tiers: &'a [HitTier],
    pub hits: &'a HitSchedule,
    pub environment: &'a EnvironmentRates,
    pub pricing: &'a CurrencyPricing,
}

impl PricingConfig {
    /// Parse and validate a pricing table from TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        let config: PricingConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a pricing table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn currency(&self, currency: Currency) -> Option<&CurrencyPricing> {
        self.currencies.iter().find(|c| c.currency == currency)
    }

    /// Tier index for a total hit count.
    pub fn hit_tier(&self, hits: u64) -> usize {
        hit_tier(&self.hit_tiers, hits)
    }

    /// Resolve every rate needed to cost one currency/availability pair.
    ///
    /// Fails before any computation when an entry is missing.
    pub fn rate_card(
        &self,
        currency: Currency,
        availability: Availability,
    ) -> DomainResult<RateCard<'_>> {
        let pricing = self
            .currency(currency)
            .ok_or_else(|| DomainError::MissingPricing(format!("no rate table for {currency}")))?;
        let hits = pricing.hit_schedule(availability).ok_or_else(|| {
            DomainError::MissingPricing(format!("no hit schedule for {currency}/{availability}"))
        })?;
        if hits.rates.len() != self.hit_tiers.len() {
            return Err(DomainError::MissingPricing(format!(
                "{currency}/{availability} defines {} hit rates for {} tiers",
                hits.rates.len(),
                self.hit_tiers.len()
            )));
        }
        let environment = pricing.environment_rates(availability).ok_or_else(|| {
            DomainError::MissingPricing(format!(
                "no environment rates for {currency}/{availability}"
            ))
        })?;

        Ok(RateCard {
            currency,
            availability,
            tiers: &self.hit_tiers,
            hits,
            environment,
            pricing,
        })
    }

    /// Check tier ordering and that every table is complete and non-negative.
    pub fn validate(&self) -> DomainResult<()> {
        validate_tiers(&self.hit_tiers)?;

        for (i, entry) in self.currencies.iter().enumerate() {
            if self.currencies[..i]
                .iter()
                .any(|c| c.currency == entry.currency)
            {
                return Err(DomainError::Validation(format!(
                    "duplicate rate table for {}",
                    entry.currency
                )));
            }
            let currency = entry.currency;

            for availability in Availability::ALL {
                let schedule = entry.hit_schedule(availability).ok_or_else(|| {
                    DomainError::MissingPricing(format!(
                        "no hit schedule for {currency}/{availability}"
                    ))
                })?;
                if schedule.rates.len() != self.hit_tiers.len() {
                    return Err(DomainError::MissingPricing(format!(
                        "{currency}/{availability} defines {} hit rates for {} tiers",
                        schedule.rates.len(),
                        self.hit_tiers.len()
                    )));
                }
                let rates = entry.environment_rates(availability).ok_or_else(|| {
                    DomainError::MissingPricing(format!(
                        "no environment rates for {currency}/{availability}"
                    ))
                })?;

                let amounts = schedule
                    .rates
                    .iter()
                    .chain([&schedule.base, &rates.prod, &rates.dev]);
                if amounts.into_iter().any(|v| v.is_sign_negative()) {
                    return Err(DomainError::Validation(format!(
                        "{currency}/{availability} has a negative rate"
                    )));
                }
            }

            if entry.storage_rate.is_sign_negative()
                || entry.storage_included_gb.is_sign_negative()
                || entry.hit_multiplier.is_sign_negative()
            {
                return Err(DomainError::Validation(format!(
                    "{currency} has a negative storage rate, allowance or multiplier"
                )));
            }
        }

        Ok(())
    }
}

/// Step function over ordered inclusive tiers. Hits above the highest
/// configured bound fall into the last tier.
pub fn hit_tier(tiers: &[HitTier], hits: u64) -> usize {
    tiers
        .iter()
        .position(|tier| tier.contains(hits))
        .unwrap_or_else(|| tiers.len().saturating_sub(1))
}

fn validate_tiers(tiers: &[HitTier]) -> DomainResult<()> {
    let first = tiers
        .first()
        .ok_or_else(|| DomainError::Validation("pricing defines no hit tiers".into()))?;
    if first.min != 0 {
        return Err(DomainError::Validation(format!(
            "first hit tier must start at 0, got {}",
            first.min
        )));
    }

    for (i, pair) in tiers.windows(2).enumerate() {
        let Some(max) = pair[0].max else {
            return Err(DomainError::Validation(format!(
                "hit tier {i} is open-ended but is not the last tier"
            )));
        };
        if pair[1].min != max + 1 {
            return Err(DomainError::Validation(format!(
                "hit tier {} must start at {}, got {}",
                i + 1,
                max + 1,
                pair[1].min
            )));
        }
    }

    if let Some(tier) = tiers.iter().find(|t| t.max.is_some_and(|max| max < t.min)) {
        return Err(DomainError::Validation(format!(
            "hit tier starting at {} ends before it starts",
            tier.min
        )));
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
