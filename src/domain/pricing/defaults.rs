//! Built-in pricing table
//!
//! Used when no pricing file is configured. Every amount is denominated in
//! the currency it is listed under, so the hit multiplier stays at 1.

use rust_decimal::Decimal;

use super::model::{
    Availability, Currency, CurrencyPricing, DevelopmentAllowance, EnvironmentRates, HitSchedule,
    HitTier, PricingConfig,
};

/// GB of storage included per project for each day of the month.
const STORAGE_INCLUDED_GB: i64 = 5;

fn d(num: i64, scale: u32) -> Decimal {
    Decimal::new(num, scale)
}

/// Rates per tier, expressed in hundred-thousandths of the currency unit.
fn rates(per_100k: [i64; 5]) -> Vec<Decimal> {
    per_100k.iter().map(|&r| d(r, 5)).collect()
}

fn schedule(availability: Availability, base: i64, per_100k: [i64; 5]) -> HitSchedule {
    HitSchedule {
        availability,
        base: Decimal::from(base),
        rates: rates(per_100k),
    }
}

fn environments(standard: (Decimal, Decimal), high: (Decimal, Decimal)) -> Vec<EnvironmentRates> {
    vec![
        EnvironmentRates {
            availability: Availability::Standard,
            prod: standard.0,
            dev: standard.1,
        },
        EnvironmentRates {
            availability: Availability::High,
            prod: high.0,
            dev: high.1,
        },
    ]
}

fn default_tiers() -> Vec<HitTier> {
    vec![
        HitTier::new(0, Some(300_000)),
        HitTier::new(300_001, Some(2_500_000)),
        HitTier::new(2_500_001, Some(10_000_000)),
        HitTier::new(10_000_001, Some(50_000_000)),
        HitTier::new(50_000_001, None),
    ]
}

fn usd_like(currency: Currency) -> CurrencyPricing {
    CurrencyPricing {
        currency,
        hit_multiplier: Decimal::ONE,
        hits: vec![
            schedule(Availability::Standard, 69, [0, 15, 12, 10, 8]),
            schedule(Availability::High, 200, [0, 30, 14, 12, 10]),
        ],
        storage_rate: d(333, 4),
        storage_included_gb: Decimal::from(STORAGE_INCLUDED_GB),
        environments: environments((d(417, 4), d(139, 4)), (d(1389, 4), d(139, 4))),
        dev_allowance: DevelopmentAllowance::PerProject(2),
    }
}

fn gbp() -> CurrencyPricing {
    CurrencyPricing {
        currency: Currency::Gbp,
        hit_multiplier: Decimal::ONE,
        hits: vec![
            schedule(Availability::Standard, 55, [0, 12, 10, 8, 6]),
            schedule(Availability::High, 160, [0, 24, 11, 10, 8]),
        ],
        storage_rate: d(266, 4),
        storage_included_gb: Decimal::from(STORAGE_INCLUDED_GB),
        environments: environments((d(347, 4), d(116, 4)), (d(1157, 4), d(116, 4))),
        dev_allowance: DevelopmentAllowance::PerProject(2),
    }
}

fn eur() -> CurrencyPricing {
    CurrencyPricing {
        currency: Currency::Eur,
        hit_multiplier: Decimal::ONE,
        hits: vec![
            schedule(Availability::Standard, 60, [0, 13, 10, 9, 7]),
            schedule(Availability::High, 175, [0, 26, 12, 10, 9]),
        ],
        storage_rate: d(300, 4),
        storage_included_gb: Decimal::from(STORAGE_INCLUDED_GB),
        environments: environments((d(382, 4), d(127, 4)), (d(1273, 4), d(127, 4))),
        dev_allowance: DevelopmentAllowance::PerProject(2),
    }
}

fn aud() -> CurrencyPricing {
    CurrencyPricing {
        currency: Currency::Aud,
        hit_multiplier: Decimal::ONE,
        hits: vec![
            schedule(Availability::Standard, 125, [0, 27, 22, 18, 14]),
            schedule(Availability::High, 360, [0, 54, 25, 22, 18]),
        ],
        storage_rate: d(500, 4),
        storage_included_gb: Decimal::from(STORAGE_INCLUDED_GB),
        environments: environments((d(750, 4), d(250, 4)), (d(2500, 4), d(250, 4))),
        dev_allowance: DevelopmentAllowance::PerGroup(1),
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            hit_tiers: default_tiers(),
            currencies: vec![
                usd_like(Currency::Usd),
                gbp(),
                eur(),
                aud(),
                usd_like(Currency::Chf),
            ],
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
