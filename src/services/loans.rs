//! Loan lifecycle: checkout, extension and return.
//!
//! A loan is `Open` until it is returned; `Returned` is terminal. Every state
//! change goes to the store as one `LendingCommand`, so the loan, the book's
//! available count and the customer's holding flag move together.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use super::eligibility::check_eligibility;
use crate::{
    clock::Clock,
    error::{AppError, AppResult, ConflictKind, Entity},
    models::Loan,
    repository::{LendingCommand, LendingStore},
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LendingStore>,
    clock: Arc<dyn Clock>,
    loan_duration: Duration,
}

fn ensure_id(id: Uuid, field: &str) -> AppResult<()> {
    if id.is_nil() {
        return Err(AppError::Validation(format!("{} is not a valid id", field)));
    }
    Ok(())
}

impl LoansService {
    pub fn new(store: Arc<dyn LendingStore>, clock: Arc<dyn Clock>, loan_duration_days: u32) -> Self {
        Self {
            store,
            clock,
            loan_duration: Duration::days(i64::from(loan_duration_days)),
        }
    }

    /// All loans, newest first
    pub async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        self.store.list_loans().await
    }

    pub async fn get_loan(&self, id: Uuid) -> AppResult<Loan> {
        self.store
            .find_loan(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Loan))
    }

    /// Lend a copy of `book_id` to `customer_id`
    pub async fn create_loan(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Loan> {
        ensure_id(customer_id, "customerId")?;
        ensure_id(book_id, "bookId")?;

        let eligible = match check_eligibility(self.store.as_ref(), customer_id, book_id).await {
            Ok(eligible) => eligible,
            Err(e) => {
                tracing::warn!(%customer_id, %book_id, "Loan rejected: {}", e);
                return Err(e);
            }
        };

        let loan = Loan::open(
            &eligible.customer,
            &eligible.book,
            self.clock.now(),
            self.loan_duration,
        );

        // The store re-checks eligibility atomically; a concurrent checkout
        // may have taken the last copy since the read above.
        let loan = self
            .store
            .apply(LendingCommand::Open(loan))
            .await
            .inspect_err(|e| tracing::warn!(%customer_id, %book_id, "Loan rejected: {}", e))?;

        tracing::info!(
            loan_id = %loan.id,
            %customer_id,
            %book_id,
            due_date = %loan.due_date,
            "Loan created"
        );
        Ok(loan)
    }

    /// Push the due date of the pair's open loan to now + loan duration
    pub async fn extend_loan(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Loan> {
        let loan = self.open_loan_for_pair(customer_id, book_id).await?;
        self.extend(loan).await
    }

    /// Same as `extend_loan`, addressing the loan by its id
    pub async fn extend_loan_by_id(&self, id: Uuid) -> AppResult<Loan> {
        let loan = self.open_loan_by_id(id).await?;
        self.extend(loan).await
    }

    /// Close the pair's open loan, charging a penalty when it is overdue
    pub async fn return_loan(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Loan> {
        let loan = self.open_loan_for_pair(customer_id, book_id).await?;
        self.close(loan).await
    }

    pub async fn return_loan_by_id(&self, id: Uuid) -> AppResult<Loan> {
        let loan = self.open_loan_by_id(id).await?;
        self.close(loan).await
    }

    async fn extend(&self, loan: Loan) -> AppResult<Loan> {
        let due_date = self.clock.now() + self.loan_duration;
        let loan = self
            .store
            .apply(LendingCommand::Extend {
                loan_id: loan.id,
                due_date,
            })
            .await?;

        tracing::info!(loan_id = %loan.id, due_date = %loan.due_date, "Loan extended");
        Ok(loan)
    }

    async fn close(&self, loan: Loan) -> AppResult<Loan> {
        // The store prices the return against the due date it holds at commit
        let loan = self
            .store
            .apply(LendingCommand::Close {
                loan_id: loan.id,
                return_date: self.clock.now(),
            })
            .await?;

        tracing::info!(loan_id = %loan.id, penalty = ?loan.penalty, "Loan returned");
        Ok(loan)
    }

    async fn open_loan_for_pair(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Loan> {
        ensure_id(customer_id, "customerId")?;
        ensure_id(book_id, "bookId")?;

        let loan = self
            .store
            .find_loan_for_pair(customer_id, book_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Loan))?;
        ensure_open(loan)
    }

    async fn open_loan_by_id(&self, id: Uuid) -> AppResult<Loan> {
        ensure_id(id, "id")?;
        let loan = self.get_loan(id).await?;
        ensure_open(loan)
    }
}

fn ensure_open(loan: Loan) -> AppResult<Loan> {
    if !loan.is_open() {
        tracing::warn!(loan_id = %loan.id, "Loan already returned");
        return Err(AppError::Conflict(ConflictKind::AlreadyProcessed));
    }
    Ok(loan)
}
