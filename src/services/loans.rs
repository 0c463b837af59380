//! Loan management service: borrowed lists and the renewal flow

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, BookInstanceView},
        renewal::{FieldError, RenewalDateField, RenewalOutcome, RenewalPage, RenewalSubmission},
    },
    repository::BookInstanceStore,
    services::loan_policy,
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn BookInstanceStore>,
}

impl LoansService {
    pub fn new(store: Arc<dyn BookInstanceStore>) -> Self {
        Self { store }
    }

    async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Renewal form for a copy, pre-filled with the default proposed date
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalPage> {
        let instance = self.get_instance(id).await?;

        Ok(RenewalPage {
            book_instance: instance.view(today),
            renewal_date: loan_policy::default_renewal_date(today),
            error: None,
        })
    }

    /// Re-present the renewal form for a submission whose date could not be read
    pub async fn reject_unreadable(
        &self,
        id: Uuid,
        error: FieldError,
        today: NaiveDate,
    ) -> AppResult<RenewalPage> {
        let mut page = self.renewal_form(id, today).await?;
        page.error = Some(error);
        Ok(page)
    }

    /// Validate a submitted renewal and store the new due date.
    ///
    /// A refused date is returned as a re-presented form; nothing is written.
    pub async fn renew(
        &self,
        id: Uuid,
        submission: &RenewalSubmission,
        today: NaiveDate,
    ) -> AppResult<RenewalOutcome> {
        match submission {
            RenewalSubmission::Plain(form) => self.renew_with(id, form, today).await,
            RenewalSubmission::Model(form) => self.renew_with(id, form, today).await,
        }
    }

    async fn renew_with<F>(&self, id: Uuid, form: &F, today: NaiveDate) -> AppResult<RenewalOutcome>
    where
        F: RenewalDateField + Sync,
    {
        let instance = self.get_instance(id).await?;

        match form.clean(today) {
            Ok(due_back) => {
                self.store.set_due_back(id, due_back).await?;
                tracing::info!("Renewed book instance {} until {}", id, due_back);
                Ok(RenewalOutcome::Renewed { due_back })
            }
            Err(e) => {
                tracing::debug!("Refused renewal of {} to {}: {}", id, form.proposed(), e);
                Ok(RenewalOutcome::Rejected(RenewalPage {
                    book_instance: instance.view(today),
                    renewal_date: form.proposed(),
                    error: Some(FieldError::new::<F>(e)),
                }))
            }
        }
    }

    /// Copies currently on loan to one user, soonest due first
    pub async fn borrowed_by(&self, user_id: i32, today: NaiveDate) -> AppResult<Vec<BookInstanceView>> {
        let instances = self.store.list_on_loan(Some(user_id)).await?;
        Ok(instances.into_iter().map(|i| i.view(today)).collect())
    }

    /// All copies currently on loan, soonest due first
    pub async fn all_borrowed(&self, today: NaiveDate) -> AppResult<Vec<BookInstanceView>> {
        let instances = self.store.list_on_loan(None).await?;
        Ok(instances.into_iter().map(|i| i.view(today)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            book_instance::LoanStatus,
            renewal::{RenewBookForm, RenewBookModelForm},
        },
        repository::book_instances::MockBookInstanceStore,
        services::loan_policy::RenewalError,
    };
    use chrono::Duration;
    use mockall::predicate::eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()
    }

    fn instance(id: Uuid, due_back: Option<NaiveDate>) -> BookInstance {
        BookInstance {
            id,
            book_id: Some(4),
            imprint: "Gollancz, 2001".to_string(),
            due_back,
            status: LoanStatus::OnLoan,
            borrower_id: Some(2),
            book_title: Some("The Left Hand of Darkness".to_string()),
        }
    }

    fn service_finding(id: Uuid, due_back: Option<NaiveDate>) -> MockBookInstanceStore {
        let mut store = MockBookInstanceStore::new();
        store
            .expect_find()
            .with(eq(id))
            .returning(move |id| Ok(Some(instance(id, due_back))));
        store
    }

    #[tokio::test]
    async fn renewal_form_proposes_three_weeks() {
        let id = Uuid::new_v4();
        let store = service_finding(id, Some(today()));
        let service = LoansService::new(Arc::new(store));

        let page = service.renewal_form(id, today()).await.unwrap();
        assert_eq!(page.renewal_date, today() + Duration::days(21));
        assert!(page.error.is_none());
        assert_eq!(page.book_instance.instance.id, id);
    }

    #[tokio::test]
    async fn past_date_is_refused_without_writing() {
        let id = Uuid::new_v4();
        let mut store = service_finding(id, Some(today()));
        store.expect_set_due_back().never();
        let service = LoansService::new(Arc::new(store));

        let proposed = today() - Duration::days(1);
        let submission = RenewalSubmission::Plain(RenewBookForm { renewal_date: proposed });
        let outcome = service.renew(id, &submission, today()).await.unwrap();

        match outcome {
            RenewalOutcome::Rejected(page) => {
                assert_eq!(page.renewal_date, proposed);
                assert_eq!(page.book_instance.instance.due_back, Some(today()));
                let error = page.error.unwrap();
                assert_eq!(error.field, "renewal_date");
                assert_eq!(error.message, RenewalError::PastDate.to_string());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn too_far_is_refused_on_model_form_too() {
        let id = Uuid::new_v4();
        let mut store = service_finding(id, None);
        store.expect_set_due_back().never();
        let service = LoansService::new(Arc::new(store));

        let proposed = today() + Duration::weeks(4) + Duration::days(1);
        let submission = RenewalSubmission::Model(RenewBookModelForm { due_back: proposed });
        let outcome = service.renew(id, &submission, today()).await.unwrap();

        match outcome {
            RenewalOutcome::Rejected(page) => {
                let error = page.error.unwrap();
                assert_eq!(error.field, "due_back");
                assert_eq!(error.code, "range_exceeded");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn valid_date_is_stored_as_is() {
        let id = Uuid::new_v4();
        let proposed = today() + Duration::weeks(4);
        let mut store = service_finding(id, Some(today()));
        store
            .expect_set_due_back()
            .with(eq(id), eq(proposed))
            .times(1)
            .returning(|_, _| Ok(()));
        let service = LoansService::new(Arc::new(store));

        let submission = RenewalSubmission::Plain(RenewBookForm { renewal_date: proposed });
        let outcome = service.renew(id, &submission, today()).await.unwrap();
        assert!(matches!(outcome, RenewalOutcome::Renewed { due_back } if due_back == proposed));
    }

    #[tokio::test]
    async fn unreadable_submission_re_presents_the_form() {
        let id = Uuid::new_v4();
        let mut store = service_finding(id, Some(today()));
        store.expect_set_due_back().never();
        let service = LoansService::new(Arc::new(store));

        let page = service
            .reject_unreadable(id, FieldError::invalid("renewal_date"), today())
            .await
            .unwrap();
        assert_eq!(page.renewal_date, today() + Duration::weeks(3));
        assert_eq!(page.error, Some(FieldError::invalid("renewal_date")));
    }

    #[tokio::test]
    async fn unknown_instance_is_not_found() {
        let mut store = MockBookInstanceStore::new();
        store.expect_find().returning(|_| Ok(None));
        store.expect_set_due_back().never();
        let service = LoansService::new(Arc::new(store));

        let submission = RenewalSubmission::Plain(RenewBookForm { renewal_date: today() });
        let result = service.renew(Uuid::new_v4(), &submission, today()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = service.renewal_form(Uuid::new_v4(), today()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn borrowed_lists_flag_overdue_copies() {
        let mut store = MockBookInstanceStore::new();
        store
            .expect_list_on_loan()
            .with(eq(Some(2)))
            .returning(|_| {
                Ok(vec![
                    instance(Uuid::new_v4(), Some(today() - Duration::days(3))),
                    instance(Uuid::new_v4(), Some(today() + Duration::days(3))),
                ])
            });
        let service = LoansService::new(Arc::new(store));

        let books = service.borrowed_by(2, today()).await.unwrap();
        assert_eq!(books.len(), 2);
        assert!(books[0].is_overdue);
        assert!(!books[1].is_overdue);
    }
}
