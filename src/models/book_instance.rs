//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::{postgres::PgTypeInfo, Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::services::loan_policy;

/// Loan status of a copy, stored as a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Available,
    #[default]
    Maintenance,
    OnLoan,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Available => "A",
            LoanStatus::Maintenance => "M",
            LoanStatus::OnLoan => "O",
            LoanStatus::Reserved => "R",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Available => "Available",
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(LoanStatus::Available),
            "M" => Ok(LoanStatus::Maintenance),
            "O" => Ok(LoanStatus::OnLoan),
            "R" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// Stored as CHAR(1); decode through String so bpchar and text both work
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.code(), buf)
    }
}

/// Book instance as stored, plus the joined book title
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    // Populated when queried with a JOIN on books
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
}

impl BookInstance {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        loan_policy::is_overdue(self.due_back, today)
    }

    /// Presentation form with computed fields for `today`
    pub fn view(self, today: NaiveDate) -> BookInstanceView {
        BookInstanceView {
            is_overdue: self.is_overdue(today),
            status_display: self.status.label().to_string(),
            instance: self,
        }
    }
}

impl std::fmt::Display for BookInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.id, self.book_title.as_deref().unwrap_or("None"))
    }
}

/// Book instance with overdue flag and status label
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceView {
    #[serde(flatten)]
    pub instance: BookInstance,
    pub status_display: String,
    pub is_overdue: bool,
}

/// Book instance list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookInstanceQuery {
    pub status: Option<LoanStatus>,
    pub borrower_id: Option<i32>,
    pub book_id: Option<i32>,
}

/// Create book instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Imprint must be 1 to 100 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// Update book instance request; absent fields are left untouched,
/// explicit nulls clear nullable columns
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub book_id: Option<Option<i32>>,
    #[validate(length(min = 1, max = 100, message = "Imprint must be 1 to 100 characters"))]
    pub imprint: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    pub status: Option<LoanStatus>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub borrower_id: Option<Option<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(due_back: Option<NaiveDate>) -> BookInstance {
        BookInstance {
            id: Uuid::nil(),
            book_id: Some(1),
            imprint: "Penguin, 1990".to_string(),
            due_back,
            status: LoanStatus::OnLoan,
            borrower_id: None,
            book_title: Some("Dune".to_string()),
        }
    }

    #[test]
    fn status_codes_parse_case_insensitively() {
        assert_eq!("o".parse::<LoanStatus>(), Ok(LoanStatus::OnLoan));
        assert_eq!("A".parse::<LoanStatus>(), Ok(LoanStatus::Available));
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(LoanStatus::Reserved.code(), "R");
    }

    #[test]
    fn default_status_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        let req: CreateBookInstance =
            serde_json::from_str(r#"{"book_id": 3, "imprint": "Folio"}"#).unwrap();
        assert_eq!(req.status, LoanStatus::Maintenance);
    }

    #[test]
    fn view_reports_overdue_and_label() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let view = instance(Some(today.succ_opt().unwrap())).view(today);
        assert!(!view.is_overdue);
        assert_eq!(view.status_display, "On loan");

        assert!(instance(None).view(today).is_overdue);
    }

    #[test]
    fn display_shows_id_and_title() {
        assert_eq!(
            instance(None).to_string(),
            "00000000-0000-0000-0000-000000000000 - Dune"
        );
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: UpdateBookInstance = serde_json::from_str(r#"{"borrower_id": null}"#).unwrap();
        assert_eq!(update.borrower_id, Some(None));
        assert_eq!(update.due_back, None);
    }
}
