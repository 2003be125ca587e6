//! Parsing and validation of the payload used to create a transaction.

use serde::Deserialize;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, date_format::DATE_FORMAT};

use super::core::{Transaction, TransactionBuilder, TransactionKind};

/// Which amounts are accepted when creating a transaction.
///
/// Negative amounts are always rejected since the sign of a transaction comes
/// from its kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AmountPolicy {
    /// Accept zero and positive amounts.
    #[default]
    NonNegative,
    /// Accept strictly positive amounts only.
    Positive,
}

impl AmountPolicy {
    /// Check `amount` against the policy.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] describing why the amount was rejected.
    pub fn check(self, amount: f64) -> Result<f64, Error> {
        if !amount.is_finite() {
            return Err(Error::Validation("Amount must be a number".to_owned()));
        }

        if amount < 0.0 {
            return Err(Error::Validation("Amount must not be negative".to_owned()));
        }

        if self == AmountPolicy::Positive && amount == 0.0 {
            return Err(Error::Validation(
                "Amount must be greater than zero".to_owned(),
            ));
        }

        Ok(amount)
    }
}

/// An amount sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// A JSON number, e.g. `12.5`.
    Number(f64),
    /// A string holding a number, e.g. `"12.5"`.
    Text(String),
}

impl AmountInput {
    fn parse(&self) -> Result<f64, Error> {
        match self {
            AmountInput::Number(amount) => Ok(*amount),
            AmountInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::Validation("Amount must be a number".to_owned())),
        }
    }
}

/// The raw data sent by the client to create a transaction.
///
/// Every field is optional here so that missing fields produce a validation
/// error rather than a deserialization error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionForm {
    /// The magnitude of the transaction.
    pub amount: Option<AmountInput>,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// A free text label for the transaction.
    pub category: Option<String>,
    /// An optional description. Empty strings count as no description.
    pub description: Option<String>,
    /// A calendar date "YYYY-MM-DD" or an RFC 3339 timestamp.
    pub date: Option<String>,
}

impl TransactionForm {
    /// Validate the form and convert it into a [TransactionBuilder].
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if a required field is missing or a
    /// field has an invalid value.
    pub fn into_builder(self, policy: AmountPolicy) -> Result<TransactionBuilder, Error> {
        let (Some(amount), Some(kind), Some(category), Some(date)) =
            (self.amount, self.kind, self.category, self.date)
        else {
            return Err(missing_fields());
        };

        let category = category.trim();
        if category.is_empty() {
            return Err(missing_fields());
        }

        let amount = policy.check(amount.parse()?)?;
        let kind: TransactionKind = kind.trim().parse()?;
        let date = parse_date(&date)?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty());

        Ok(Transaction::build(amount, kind, category, date).description(description))
    }
}

fn missing_fields() -> Error {
    Error::Validation("Missing required fields".to_owned())
}

/// Parse a calendar date, accepting an RFC 3339 timestamp and keeping only its date.
///
/// # Errors
///
/// Returns an [Error::Validation] if `raw` is neither format.
pub fn parse_date(raw: &str) -> Result<Date, Error> {
    let raw = raw.trim();

    Date::parse(raw, DATE_FORMAT)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|datetime| datetime.date()))
        .map_err(|_| Error::Validation(format!("Invalid date \"{raw}\"")))
}

#[cfg(test)]
mod form_tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{AmountPolicy, TransactionKind},
    };

    use super::{AmountInput, TransactionForm, parse_date};

    fn valid_form() -> TransactionForm {
        TransactionForm {
            amount: Some(AmountInput::Number(30.0)),
            kind: Some("expense".to_owned()),
            category: Some("Food".to_owned()),
            description: None,
            date: Some("2024-01-20".to_owned()),
        }
    }

    #[test]
    fn valid_form_produces_builder() {
        let builder = valid_form()
            .into_builder(AmountPolicy::NonNegative)
            .unwrap();

        assert_eq!(builder.amount, 30.0);
        assert_eq!(builder.kind, TransactionKind::Expense);
        assert_eq!(builder.category, "Food");
        assert_eq!(builder.description, None);
        assert_eq!(builder.date, date!(2024 - 01 - 20));
    }

    #[test]
    fn missing_field_is_rejected() {
        let form = TransactionForm {
            category: None,
            ..valid_form()
        };

        assert_eq!(
            form.into_builder(AmountPolicy::NonNegative),
            Err(Error::Validation("Missing required fields".to_owned()))
        );
    }

    #[test]
    fn blank_category_is_rejected() {
        let form = TransactionForm {
            category: Some("   ".to_owned()),
            ..valid_form()
        };

        assert!(form.into_builder(AmountPolicy::NonNegative).is_err());
    }

    #[test]
    fn negative_amount_is_rejected_by_every_policy() {
        for policy in [AmountPolicy::NonNegative, AmountPolicy::Positive] {
            let form = TransactionForm {
                amount: Some(AmountInput::Number(-5.0)),
                ..valid_form()
            };

            assert_eq!(
                form.into_builder(policy),
                Err(Error::Validation("Amount must not be negative".to_owned())),
                "policy {policy:?} accepted a negative amount"
            );
        }
    }

    #[test]
    fn zero_amount_depends_on_policy() {
        let form = TransactionForm {
            amount: Some(AmountInput::Number(0.0)),
            ..valid_form()
        };

        assert!(form.clone().into_builder(AmountPolicy::NonNegative).is_ok());
        assert_eq!(
            form.into_builder(AmountPolicy::Positive),
            Err(Error::Validation(
                "Amount must be greater than zero".to_owned()
            ))
        );
    }

    #[test]
    fn amount_may_be_numeric_string() {
        let form = TransactionForm {
            amount: Some(AmountInput::Text("12.5".to_owned())),
            ..valid_form()
        };

        assert_eq!(
            form.into_builder(AmountPolicy::NonNegative).unwrap().amount,
            12.5
        );
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let form = TransactionForm {
            amount: Some(AmountInput::Text("lots".to_owned())),
            ..valid_form()
        };

        assert_eq!(
            form.into_builder(AmountPolicy::NonNegative),
            Err(Error::Validation("Amount must be a number".to_owned()))
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let form = TransactionForm {
            kind: Some("transfer".to_owned()),
            ..valid_form()
        };

        assert!(matches!(
            form.into_builder(AmountPolicy::NonNegative),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn empty_description_becomes_none() {
        let form = TransactionForm {
            description: Some("".to_owned()),
            ..valid_form()
        };

        assert_eq!(
            form.into_builder(AmountPolicy::NonNegative)
                .unwrap()
                .description,
            None
        );
    }

    #[test]
    fn parses_calendar_dates_and_timestamps() {
        assert_eq!(parse_date("2024-01-15"), Ok(date!(2024 - 01 - 15)));
        assert_eq!(
            parse_date("2024-01-15T10:30:00Z"),
            Ok(date!(2024 - 01 - 15))
        );
        assert!(parse_date("15/01/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }
}
