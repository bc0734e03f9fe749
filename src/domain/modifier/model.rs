//! Billing modifier entities

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::usage::BillingPeriod;
use crate::support::{AppError, DomainError, DomainResult};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// How a modifier changes the running total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum ModifierKind {
    /// Subtract a fixed amount
    DiscountFixed,
    /// Subtract a percentage of the running total
    DiscountPercentage,
    /// Add a fixed amount
    ExtraFixed,
    /// Add a percentage of the running total
    ExtraPercentage,
}

impl ModifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscountFixed => "discountFixed",
            Self::DiscountPercentage => "discountPercentage",
            Self::ExtraFixed => "extraFixed",
            Self::ExtraPercentage => "extraPercentage",
        }
    }

    /// Apply `value` of this kind to a running total. Results past the
    /// decimal range saturate.
    pub fn apply(&self, running: Decimal, value: Decimal) -> Decimal {
        match self {
            Self::DiscountFixed => running.saturating_sub(value),
            Self::DiscountPercentage => {
                running.saturating_sub(running.saturating_mul(value / HUNDRED))
            }
            Self::ExtraFixed => running.saturating_add(value),
            Self::ExtraPercentage => {
                running.saturating_add(running.saturating_mul(value / HUNDRED))
            }
        }
    }
}

impl FromStr for ModifierKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discountFixed" => Ok(Self::DiscountFixed),
            "discountPercentage" => Ok(Self::DiscountPercentage),
            "extraFixed" => Ok(Self::ExtraFixed),
            "extraPercentage" => Ok(Self::ExtraPercentage),
            _ => Err(DomainError::UnknownModifierKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ModifierKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discount or surcharge for a billing group, valid over an inclusive
/// date range. Lower weights are applied first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub group_ref: String,
    pub kind: ModifierKind,
    pub value: Decimal,
    #[serde(default)]
    pub weight: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Modifier {
    pub fn new(
        group_ref: impl Into<String>,
        kind: ModifierKind,
        value: Decimal,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            group_ref: group_ref.into(),
            kind,
            value,
            weight: 0,
            start_date,
            end_date,
        }
    }

    /// Modifier covering exactly one billing month.
    pub fn for_period(
        group_ref: impl Into<String>,
        kind: ModifierKind,
        value: Decimal,
        period: BillingPeriod,
    ) -> Self {
        Self::new(group_ref, kind, value, period.first_day(), period.last_day())
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_active_for(&self, period: BillingPeriod) -> bool {
        period.overlaps(self.start_date, self.end_date)
    }

    pub fn apply(&self, running: Decimal) -> Decimal {
        self.kind.apply(running, self.value)
    }
}

/// Modifier row as kept by the modifier store: one column per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierRecord {
    #[serde(default)]
    pub id: Option<i32>,
    pub group: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub discount_fixed: Option<Decimal>,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub extra_fixed: Option<Decimal>,
    #[serde(default)]
    pub extra_percentage: Option<Decimal>,
    #[serde(default)]
    pub weight: i32,
}

impl ModifierRecord {
    /// One modifier per non-zero column, in column order, all sharing the
    /// record's weight and dates.
    pub fn into_modifiers(self) -> Vec<Modifier> {
        let columns = [
            (ModifierKind::DiscountFixed, self.discount_fixed),
            (ModifierKind::DiscountPercentage, self.discount_percentage),
            (ModifierKind::ExtraFixed, self.extra_fixed),
            (ModifierKind::ExtraPercentage, self.extra_percentage),
        ];

        columns
            .into_iter()
            .filter_map(|(kind, value)| value.filter(|v| !v.is_zero()).map(|v| (kind, v)))
            .map(|(kind, value)| Modifier {
                id: self.id,
                group_ref: self.group.clone(),
                kind,
                value,
                weight: self.weight,
                start_date: self.start_date,
                end_date: self.end_date,
            })
            .collect()
    }
}

/// Decode a JSON array holding modifiers in either the [`Modifier`] shape
/// (has a `kind`) or the [`ModifierRecord`] column shape.
///
/// An unrecognised `kind` fails the whole batch.
pub fn decode_modifiers(raw: &str) -> Result<Vec<Modifier>, AppError> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    let mut modifiers = Vec::with_capacity(values.len());

    for value in values {
        let tagged = match value.get("kind") {
            Some(kind) => {
                check_kind(kind)?;
                true
            }
            None => false,
        };

        if tagged {
            modifiers.push(serde_json::from_value::<Modifier>(value)?);
        } else {
            let record = serde_json::from_value::<ModifierRecord>(value)?;
            modifiers.extend(record.into_modifiers());
        }
    }

    Ok(modifiers)
}

fn check_kind(kind: &Value) -> DomainResult<ModifierKind> {
    match kind.as_str() {
        Some(name) => name.parse(),
        None => Err(DomainError::UnknownModifierKind(kind.to_string())),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn kinds_apply_to_running_total() {
        let total = dec!(1041.73);
        assert_eq!(ModifierKind::DiscountFixed.apply(total, dec!(41.73)), dec!(1000.00));
        assert_eq!(ModifierKind::DiscountPercentage.apply(total, dec!(50)), dec!(520.865));
        assert_eq!(ModifierKind::ExtraFixed.apply(total, dec!(100)), dec!(1141.73));
        assert_eq!(ModifierKind::ExtraPercentage.apply(total, dec!(100)), dec!(2083.46));
    }

    #[test]
    fn kinds_saturate_at_decimal_range() {
        assert_eq!(ModifierKind::ExtraFixed.apply(Decimal::MAX, dec!(1)), Decimal::MAX);
        assert_eq!(
            ModifierKind::ExtraPercentage.apply(Decimal::MAX, dec!(500)),
            Decimal::MAX
        );
        assert_eq!(ModifierKind::DiscountFixed.apply(Decimal::MIN, dec!(1)), Decimal::MIN);
        assert_eq!(
            ModifierKind::DiscountPercentage.apply(Decimal::MIN, dec!(-100)),
            Decimal::MIN
        );
    }

    #[test]
    fn kind_parsing_is_closed() {
        assert_eq!(
            "extraPercentage".parse::<ModifierKind>().unwrap(),
            ModifierKind::ExtraPercentage
        );
        assert!(matches!(
            "discountFlat".parse::<ModifierKind>(),
            Err(DomainError::UnknownModifierKind(kind)) if kind == "discountFlat"
        ));
        assert_eq!(ModifierKind::DiscountFixed.to_string(), "discountFixed");
    }

    #[test]
    fn modifier_json_shape() {
        let raw = r#"{
            "groupRef": "FC",
            "kind": "discountFixed",
            "value": 761.26,
            "startDate": "2019-11-01",
            "endDate": "2019-11-30"
        }"#;
        let modifier: Modifier = serde_json::from_str(raw).unwrap();
        assert_eq!(modifier.kind, ModifierKind::DiscountFixed);
        assert_eq!(modifier.value, dec!(761.26));
        assert_eq!(modifier.weight, 0);
        assert_eq!(modifier.id, None);
    }

    #[test]
    fn modifier_json_rejects_unknown_kind() {
        let raw = r#"{
            "groupRef": "FC",
            "kind": "bonus",
            "value": 1,
            "startDate": "2019-11-01",
            "endDate": "2019-11-30"
        }"#;
        let err = serde_json::from_str::<Modifier>(raw).unwrap_err();
        assert!(err.to_string().contains("Unknown modifier kind: bonus"));
    }

    #[test]
    fn activity_follows_date_range() {
        let november = BillingPeriod::new(2019, 11).unwrap();
        let modifier = Modifier::for_period("G", ModifierKind::ExtraFixed, dec!(10), november);
        assert!(modifier.is_active_for(november));
        assert!(!modifier.is_active_for(november.next()));
        assert!(!modifier.is_active_for(november.previous()));

        let straddling = Modifier::new(
            "G",
            ModifierKind::ExtraFixed,
            dec!(10),
            date(2019, 11, 30),
            date(2019, 12, 1),
        );
        assert!(straddling.is_active_for(november));
        assert!(straddling.is_active_for(november.next()));
    }

    #[test]
    fn record_expands_non_zero_columns_in_order() {
        let record = ModifierRecord {
            id: Some(7),
            group: "SV".into(),
            start_date: date(2019, 7, 1),
            end_date: date(2019, 7, 31),
            discount_fixed: Some(Decimal::ZERO),
            discount_percentage: Some(dec!(10)),
            extra_fixed: Some(dec!(1000)),
            extra_percentage: None,
            weight: 3,
        };
        let modifiers = record.into_modifiers();
        assert_eq!(modifiers.len(), 2);
        assert_eq!(modifiers[0].kind, ModifierKind::DiscountPercentage);
        assert_eq!(modifiers[1].kind, ModifierKind::ExtraFixed);
        assert!(modifiers.iter().all(|m| m.weight == 3 && m.group_ref == "SV"));
        assert!(modifiers.iter().all(|m| m.id == Some(7)));
    }

    #[test]
    fn decode_accepts_both_shapes() {
        let raw = r#"[
            { "groupRef": "G", "kind": "extraFixed", "value": 100, "weight": 100,
              "startDate": "2019-11-01", "endDate": "2019-11-30" },
            { "group": "G", "extraPercentage": 100, "discountFixed": 0,
              "startDate": "2019-11-01", "endDate": "2019-11-30" }
        ]"#;
        let modifiers = decode_modifiers(raw).unwrap();
        assert_eq!(modifiers.len(), 2);
        assert_eq!(modifiers[0].kind, ModifierKind::ExtraFixed);
        assert_eq!(modifiers[0].weight, 100);
        assert_eq!(modifiers[1].kind, ModifierKind::ExtraPercentage);
        assert_eq!(modifiers[1].weight, 0);
    }

    #[test]
    fn decode_fails_on_unknown_kind() {
        let raw = r#"[
            { "groupRef": "G", "kind": "cashback", "value": 1,
              "startDate": "2019-11-01", "endDate": "2019-11-30" }
        ]"#;
        assert!(matches!(
            decode_modifiers(raw),
            Err(AppError::Domain(DomainError::UnknownModifierKind(kind))) if kind == "cashback"
        ));
    }
}
