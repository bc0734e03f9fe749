//! Modifier engine
//!
//! Selects the modifiers active for a billing month, orders them by weight
//! and folds them over a running total. The result never drops below zero.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::model::Modifier;
use crate::domain::usage::BillingPeriod;

/// Result of applying a modifier chain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierOutcome {
    pub total: Decimal,
    /// Modifiers in the order they were applied
    pub applied: Vec<Modifier>,
}

/// Modifiers overlapping `period`, ordered by ascending weight.
///
/// Equal weights keep their input order.
pub fn active_modifiers(modifiers: &[Modifier], period: BillingPeriod) -> Vec<Modifier> {
    let mut active: Vec<Modifier> = modifiers
        .iter()
        .filter(|m| {
            if m.start_date > m.end_date {
                warn!(
                    group = %m.group_ref,
                    kind = %m.kind,
                    start = %m.start_date,
                    end = %m.end_date,
                    "Ignoring modifier with inverted date range"
                );
                return false;
            }
            m.is_active_for(period)
        })
        .cloned()
        .collect();

    active.sort_by_key(|m| m.weight);
    active
}

/// Apply the modifiers active for `period` to `pre_total`.
pub fn apply_modifiers(
    pre_total: Decimal,
    modifiers: &[Modifier],
    period: BillingPeriod,
) -> ModifierOutcome {
    let applied = active_modifiers(modifiers, period);

    let running = applied.iter().fold(pre_total, |running, modifier| {
        let next = modifier.apply(running);
        debug!(
            kind = %modifier.kind,
            value = %modifier.value,
            weight = modifier.weight,
            before = %running,
            after = %next,
            "Applied modifier"
        );
        next
    });

    if running.is_sign_negative() && !running.is_zero() {
        debug!(%period, running = %running, "Modifier chain went below zero, flooring");
    }

    ModifierOutcome {
        total: running.max(Decimal::ZERO),
        applied,
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::modifier::model::ModifierKind;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn november() -> BillingPeriod {
        BillingPeriod::new(2019, 11).unwrap()
    }

    fn modifier(kind: ModifierKind, value: Decimal) -> Modifier {
        Modifier::for_period("SAMPLE", kind, value, november())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_chain_is_identity() {
        let outcome = apply_modifiers(dec!(1041.73), &[], november());
        assert_eq!(outcome.total, dec!(1041.73));
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn single_modifier_scenarios() {
        let cases = [
            (ModifierKind::DiscountPercentage, dec!(50), dec!(520.865)),
            (ModifierKind::ExtraFixed, dec!(100), dec!(1141.73)),
            (ModifierKind::ExtraPercentage, dec!(100), dec!(2083.46)),
            (ModifierKind::DiscountFixed, dec!(41.73), dec!(1000)),
        ];
        for (kind, value, expected) in cases {
            let outcome = apply_modifiers(dec!(1041.73), &[modifier(kind, value)], november());
            assert_eq!(outcome.total, expected, "{kind}");
            assert_eq!(outcome.applied.len(), 1);
        }
    }

    #[test]
    fn weight_orders_application_not_input_order() {
        let modifiers = [
            modifier(ModifierKind::ExtraFixed, dec!(100)).with_weight(100),
            modifier(ModifierKind::ExtraPercentage, dec!(100)).with_weight(0),
        ];
        let outcome = apply_modifiers(dec!(1041.73), &modifiers, november());
        // (T * 2) + 100
        assert_eq!(outcome.total, dec!(2183.46));
        assert_eq!(outcome.applied[0].kind, ModifierKind::ExtraPercentage);
        assert_eq!(outcome.applied[1].kind, ModifierKind::ExtraFixed);
    }

    #[test]
    fn equal_weights_keep_input_order() {
        let modifiers = [
            modifier(ModifierKind::ExtraFixed, dec!(100)),
            modifier(ModifierKind::ExtraPercentage, dec!(100)),
        ];
        let outcome = apply_modifiers(dec!(1041.73), &modifiers, november());
        assert_eq!(outcome.total, dec!(2283.46));

        let reversed = [modifiers[1].clone(), modifiers[0].clone()];
        let outcome = apply_modifiers(dec!(1041.73), &reversed, november());
        assert_eq!(outcome.total, dec!(2183.46));
    }

    #[test]
    fn percentages_compound_on_running_total() {
        let modifiers = [
            modifier(ModifierKind::DiscountPercentage, dec!(50)),
            modifier(ModifierKind::DiscountPercentage, dec!(50)),
        ];
        let outcome = apply_modifiers(dec!(100), &modifiers, november());
        assert_eq!(outcome.total, dec!(25));
    }

    #[test]
    fn total_is_floored_at_zero() {
        let outcome = apply_modifiers(
            dec!(69),
            &[modifier(ModifierKind::DiscountFixed, dec!(100000))],
            november(),
        );
        assert_eq!(outcome.total, Decimal::ZERO);
        assert!(!outcome.total.is_sign_negative());

        // Floor only applies at the end of the chain
        let modifiers = [
            modifier(ModifierKind::DiscountFixed, dec!(150)),
            modifier(ModifierKind::ExtraFixed, dec!(100)).with_weight(1),
        ];
        let outcome = apply_modifiers(dec!(100), &modifiers, november());
        assert_eq!(outcome.total, dec!(50));
    }

    #[test]
    fn inactive_modifiers_are_skipped() {
        let expired = Modifier::for_period(
            "SAMPLE",
            ModifierKind::ExtraFixed,
            dec!(100),
            november().previous(),
        );
        let upcoming = Modifier::new(
            "SAMPLE",
            ModifierKind::DiscountFixed,
            dec!(10),
            date(2019, 12, 1),
            date(2020, 12, 31),
        );
        let outcome = apply_modifiers(dec!(10), &[expired, upcoming], november());
        assert_eq!(outcome.total, dec!(10));
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn modifier_ending_this_month_does_not_reach_next_month() {
        let modifiers = [modifier(ModifierKind::ExtraFixed, dec!(100))];
        assert_eq!(apply_modifiers(dec!(1), &modifiers, november()).total, dec!(101));
        assert_eq!(apply_modifiers(dec!(1), &modifiers, november().next()).total, dec!(1));
    }

    #[test]
    fn inverted_range_is_ignored() {
        let inverted = Modifier::new(
            "SAMPLE",
            ModifierKind::ExtraFixed,
            dec!(100),
            date(2019, 11, 30),
            date(2019, 11, 1),
        );
        let outcome = apply_modifiers(dec!(5), &[inverted], november());
        assert_eq!(outcome.total, dec!(5));
    }

    #[test]
    fn application_is_deterministic() {
        let modifiers = [
            modifier(ModifierKind::ExtraPercentage, dec!(12.5)).with_weight(3),
            modifier(ModifierKind::DiscountFixed, dec!(7.25)).with_weight(-1),
            modifier(ModifierKind::ExtraFixed, dec!(1)).with_weight(3),
        ];
        let first = apply_modifiers(dec!(333.33), &modifiers, november());
        let second = apply_modifiers(dec!(333.33), &modifiers, november());
        assert_eq!(first, second);
        assert_eq!(first.applied[0].kind, ModifierKind::DiscountFixed);
    }
}
