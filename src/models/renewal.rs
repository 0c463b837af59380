//! Renewal forms
//!
//! Two request shapes can carry a new due date: the plain renewal form
//! (`renewal_date`) and the form bound to the book instance (`due_back`).
//! Both go through [`RenewalDateField::clean`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book_instance::BookInstanceView;
use crate::services::loan_policy::{self, RenewalError};

/// A form field holding a proposed due date
pub trait RenewalDateField {
    /// Name of the field the date came from, used in error feedback
    const FIELD: &'static str;

    fn proposed(&self) -> NaiveDate;

    fn clean(&self, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
        loan_policy::validate_renewal_date(self.proposed(), today)
    }
}

/// Plain renewal form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// yyyy-mm-dd, at most 4 weeks ahead (default: 3 weeks later)
    pub renewal_date: NaiveDate,
}

impl RenewalDateField for RenewBookForm {
    const FIELD: &'static str = "renewal_date";

    fn proposed(&self) -> NaiveDate {
        self.renewal_date
    }
}

/// Renewal form bound to the book instance's `due_back` column
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewBookModelForm {
    /// New renewal date, limit 4 weeks
    pub due_back: NaiveDate,
}

impl RenewalDateField for RenewBookModelForm {
    const FIELD: &'static str = "due_back";

    fn proposed(&self) -> NaiveDate {
        self.due_back
    }
}

/// Renewal submission body; either form shape is accepted
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RenewalSubmission {
    Plain(RenewBookForm),
    Model(RenewBookModelForm),
}

impl RenewalSubmission {
    /// Parse a submitted JSON body.
    ///
    /// An unreadable body is reported against `due_back` when that key was
    /// sent, otherwise against `renewal_date`.
    pub fn from_body(body: &[u8]) -> Result<Self, FieldError> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Unreadable renewal submission: {}", e);
            let field = match serde_json::from_slice::<serde_json::Value>(body) {
                Ok(value) if value.get(RenewBookModelForm::FIELD).is_some() => {
                    RenewBookModelForm::FIELD
                }
                _ => RenewBookForm::FIELD,
            };
            FieldError::invalid(field)
        })
    }
}

/// Field-level validation feedback
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: RenewalDateField>(error: RenewalError) -> Self {
        Self {
            field: F::FIELD.to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// The field did not hold a date
    pub fn invalid(field: &str) -> Self {
        Self {
            field: field.to_string(),
            code: "invalid".to_string(),
            message: "Enter a valid date.".to_string(),
        }
    }
}

/// Renewal form as presented to the client
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalPage {
    pub book_instance: BookInstanceView,
    /// Proposed date on first display, submitted date after a rejection
    pub renewal_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
}

/// Result of a renewal submission
#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    Renewed { due_back: NaiveDate },
    Rejected(RenewalPage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn both_form_shapes_share_the_rule() {
        let past = today() - Duration::days(1);
        let far = today() + Duration::weeks(4) + Duration::days(1);

        assert_eq!(RenewBookForm { renewal_date: past }.clean(today()), Err(RenewalError::PastDate));
        assert_eq!(RenewBookModelForm { due_back: past }.clean(today()), Err(RenewalError::PastDate));
        assert_eq!(
            RenewBookForm { renewal_date: far }.clean(today()),
            Err(RenewalError::RangeExceeded)
        );
        assert_eq!(
            RenewBookModelForm { due_back: far }.clean(today()),
            Err(RenewalError::RangeExceeded)
        );
    }

    #[test]
    fn submission_picks_shape_from_field_name() {
        let plain: RenewalSubmission = serde_json::from_str(r#"{"renewal_date": "2025-03-10"}"#).unwrap();
        assert!(matches!(plain, RenewalSubmission::Plain(_)));

        let model: RenewalSubmission = serde_json::from_str(r#"{"due_back": "2025-03-10"}"#).unwrap();
        assert!(matches!(model, RenewalSubmission::Model(_)));
    }

    #[test]
    fn unreadable_date_is_a_field_error() {
        let error = RenewalSubmission::from_body(br#"{"renewal_date": "2024-13-01"}"#).unwrap_err();
        assert_eq!(error, FieldError::invalid("renewal_date"));

        let error = RenewalSubmission::from_body(br#"{"due_back": "next week"}"#).unwrap_err();
        assert_eq!(error.field, "due_back");
        assert_eq!(error.code, "invalid");

        let error = RenewalSubmission::from_body(b"not json").unwrap_err();
        assert_eq!(error.field, "renewal_date");

        assert!(matches!(
            RenewalSubmission::from_body(br#"{"due_back": "2025-03-10"}"#),
            Ok(RenewalSubmission::Model(_))
        ));
    }

    #[test]
    fn field_error_names_the_submitted_field() {
        let error = FieldError::new::<RenewBookModelForm>(RenewalError::PastDate);
        assert_eq!(error.field, "due_back");
        assert_eq!(error.code, "past_date");
        assert_eq!(error.message, "Invalid date - renewal in past");
    }
}
