//! Database models

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Division value stored for submissions filed at district level
pub const DISTRICT_LEVEL_DIVISION: &str = "දිස්ත්‍රික් මට්ටම";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct District {
    pub id: i64,
    pub name_si: String,
    pub name_en: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Sport {
    pub id: i64,
    pub code: i64,
    pub name_si: String,
    pub name_en: String,
}

/// Submission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Draft,
    Submitted,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "draft",
            SubmissionStatus::Submitted => "submitted",
        }
    }
}

/// Officer designation; the four values accepted by the entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Designation {
    Ad,
    Dyo,
    Yso,
    Ayso,
}

impl Designation {
    pub const ALL: [Designation; 4] = [
        Designation::Ad,
        Designation::Dyo,
        Designation::Yso,
        Designation::Ayso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Designation::Ad => "AD",
            Designation::Dyo => "DYO",
            Designation::Yso => "YSO",
            Designation::Ayso => "AYSO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub district_id: i64,
    pub division: String,
    pub officer_name: String,
    pub designation: Designation,
    pub epf_number: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Submission {
    pub fn is_draft(&self) -> bool {
        self.status == SubmissionStatus::Draft
    }
}

/// Row of `team_sports_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TeamSportRecord {
    pub id: i64,
    pub submission_id: i64,
    pub sport_id: i64,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub teams_male: Option<i64>,
    pub teams_female: Option<i64>,
    pub players_male: Option<i64>,
    pub players_female: Option<i64>,
}

/// Row of `swimming_data` or `track_field_data` (identical shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub submission_id: i64,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub event_name: Option<String>,
    pub teams_male: Option<i64>,
    pub teams_female: Option<i64>,
    pub players_male: Option<i64>,
    pub players_female: Option<i64>,
}

/// Row of `financial_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FinancialRecord {
    pub submission_id: i64,
    pub income_head_office: Money,
    pub income_external_sources: Money,
    pub total_income: Money,
    pub expense_team_sports: Money,
    pub expense_track_field: Money,
    pub total_expense: Money,
}

/// Monetary amount held as exact hundredths (cents)
///
/// Parsing, rounding and arithmetic go through [`Decimal`], so no amount
/// ever passes through binary floating point. Serialized as a decimal
/// string with two places (`"150.00"`); deserialized from a number or a
/// numeric string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

/// Why a value could not become a [`Money`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("not a number")]
    NotANumber,
    #[error("negative amount")]
    Negative,
    #[error("amount greater than {}", Money::MAX.as_decimal())]
    TooLarge,
}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest single amount accepted: 99,999,999,999,999.99
    pub const MAX: Money = Money(9_999_999_999_999_999);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Round to the nearest hundredth, halves away from zero (`1.005` → `1.01`)
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let cents = rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .ok_or(AmountError::TooLarge)?;
        if cents > Self::MAX.0 {
            return Err(AmountError::TooLarge);
        }
        Ok(Money(cents))
    }

    /// Parse plain (`"50.25"`) or scientific (`"1.5e3"`) decimal text
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let text = text.trim();
        let value = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| AmountError::NotANumber)?;
        Self::from_decimal(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// `None` when the sum leaves the `i64` cents range
    pub fn checked_add(self, other: Money) -> Option<Money> {
        let sum = self.as_decimal().checked_add(other.as_decimal())?;
        sum.checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .map(Money)
    }
}

impl fmt::Display for Money {
    /// `1234567` cents → `12,345.67`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = (abs / 100).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{}{}.{:02}", sign, grouped, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Float(f64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => Money::from_decimal(Decimal::from(n)),
            // Shortest round-trip text of the float, not its binary expansion
            Raw::Float(n) if n.is_finite() => Money::parse(&n.to_string()),
            Raw::Float(_) => Err(AmountError::NotANumber),
            Raw::Text(s) => Money::parse(&s),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_money_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec("1.005")), Ok(Money::from_cents(101)));
        assert_eq!(Money::from_decimal(dec("1.004")), Ok(Money::from_cents(100)));
        assert_eq!(Money::from_decimal(dec("19.999")), Ok(Money::from_cents(2000)));
        assert_eq!(Money::from_decimal(dec("0.1") + dec("0.2")), Ok(Money::from_cents(30)));
        assert_eq!(Money::from_decimal(dec("-1")), Err(AmountError::Negative));
        assert_eq!(Money::from_decimal(dec("-0.00")), Ok(Money::ZERO));
    }

    #[test]
    fn test_money_parse_is_exact_past_float_precision() {
        assert_eq!(
            Money::parse("90071992547409.93").map(|m| m.cents()),
            Ok(9_007_199_254_740_993)
        );
        assert_eq!(Money::parse(" 1.5e3 "), Ok(Money::from_cents(150_000)));
        assert_eq!(Money::parse("99999999999999.99"), Ok(Money::MAX));
        assert_eq!(Money::parse("100000000000000"), Err(AmountError::TooLarge));
        assert_eq!(Money::parse("1e20"), Err(AmountError::TooLarge));
        assert_eq!(Money::parse("abc"), Err(AmountError::NotANumber));
    }

    #[test]
    fn test_money_checked_add() {
        let a = Money::from_cents(10_000);
        assert_eq!(a.checked_add(Money::from_cents(5_025)), Some(Money::from_cents(15_025)));
        assert_eq!(Money::MAX.checked_add(Money::MAX).map(|m| m.cents()), Some(19_999_999_999_999_998));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_money_display_groups_thousands() {
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(15000).to_string(), "150.00");
        assert_eq!(Money::from_cents(123456789).to_string(), "1,234,567.89");
    }

    #[test]
    fn test_money_serde() {
        let a: Money = serde_json::from_str("50.5").unwrap();
        let b: Money = serde_json::from_str("\"50.50\"").unwrap();
        let c: Money = serde_json::from_str("1.005").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.cents(), 101);
        assert!(serde_json::from_str::<Money>("-3").is_err());

        assert_eq!(serde_json::to_string(&Money::from_cents(15_000)).unwrap(), "\"150.00\"");
        assert_eq!(serde_json::to_string(&Money::ZERO).unwrap(), "\"0.00\"");
    }

    #[test]
    fn test_designation_parse() {
        assert_eq!(Designation::parse("AYSO"), Some(Designation::Ayso));
        assert_eq!(Designation::parse("ayso"), None);
        assert_eq!(
            serde_json::to_string(&Designation::Dyo).unwrap(),
            "\"DYO\""
        );
    }
}
