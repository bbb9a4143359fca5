//! Loans repository for Postgres.
//!
//! Compound writes run in one transaction. Rows are locked in the order
//! loan, customer, book so that opening and closing never wait on each other
//! in a cycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{
    catalog::{book_from_row, customer_from_row},
    count_from_db, count_to_db, LendingCommand, LendingStore,
};
use crate::{
    error::{AppError, AppResult, ConflictKind, Entity},
    models::{Book, BookSnapshot, Customer, CustomerSnapshot, Loan},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

fn loan_from_row(row: &PgRow) -> AppResult<Loan> {
    let penalty: Option<i32> = row.try_get("penalty")?;
    Ok(Loan {
        id: row.try_get("id")?,
        customer: CustomerSnapshot {
            id: row.try_get("customer_id")?,
            name: row.try_get("customer_name")?,
            phone: row.try_get("customer_phone")?,
        },
        book: BookSnapshot {
            id: row.try_get("book_id")?,
            title: row.try_get("book_title")?,
        },
        out_date: row.try_get("out_date")?,
        due_date: row.try_get("due_date")?,
        return_date: row.try_get("return_date")?,
        returned: row.try_get("returned")?,
        penalty: penalty.map(|p| count_from_db(p, "penalty")).transpose()?,
    })
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn lock_customer(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Customer> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound(Entity::Customer))?;
        customer_from_row(&row)
    }

    async fn lock_book(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<Book> {
        let row = sqlx::query("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound(Entity::Book))?;
        book_from_row(&row)
    }

    async fn open(&self, loan: Loan) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let customer = Self::lock_customer(&mut tx, loan.customer.id).await?;
        let book = Self::lock_book(&mut tx, loan.book.id).await?;

        if customer.has_book {
            return Err(AppError::Conflict(ConflictKind::AlreadyHoldingBook));
        }
        if !book.has_available_copy() {
            return Err(AppError::Conflict(ConflictKind::NoAvailableCopies));
        }

        sqlx::query("UPDATE books SET available = available - 1 WHERE id = $1")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE customers SET has_book = TRUE WHERE id = $1")
            .bind(customer.id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            INSERT INTO loans (
                id, customer_id, customer_name, customer_phone, book_id, book_title,
                out_date, due_date, return_date, returned, penalty
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, FALSE, NULL)
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.customer.id)
        .bind(&loan.customer.name)
        .bind(&loan.customer.phone)
        .bind(loan.book.id)
        .bind(&loan.book.title)
        .bind(loan.out_date)
        .bind(loan.due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // loans_one_open_per_customer
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                AppError::Conflict(ConflictKind::AlreadyHoldingBook)
            } else {
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;
        loan_from_row(&row)
    }

    async fn extend(&self, loan_id: Uuid, due_date: DateTime<Utc>) -> AppResult<Loan> {
        let row = sqlx::query(
            "UPDATE loans SET due_date = $2 WHERE id = $1 AND return_date IS NULL RETURNING *",
        )
        .bind(loan_id)
        .bind(due_date)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => loan_from_row(&row),
            None => match self.find_loan(loan_id).await? {
                Some(_) => Err(AppError::Conflict(ConflictKind::AlreadyProcessed)),
                None => Err(AppError::NotFound(Entity::Loan)),
            },
        }
    }

    async fn close(&self, loan_id: Uuid, return_date: DateTime<Utc>) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound(Entity::Loan))?;
        let mut loan = loan_from_row(&row)?;
        if !loan.is_open() {
            return Err(AppError::Conflict(ConflictKind::AlreadyProcessed));
        }
        loan.close(return_date);
        let penalty = loan.penalty.unwrap_or_default();

        Self::lock_customer(&mut tx, loan.customer.id).await?;
        let book = Self::lock_book(&mut tx, loan.book.id).await?;
        if book.available >= book.stock {
            return Err(AppError::Internal(format!(
                "book {} has no copy out on loan",
                book.id
            )));
        }

        sqlx::query("UPDATE customers SET has_book = FALSE WHERE id = $1")
            .bind(loan.customer.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET available = available + 1 WHERE id = $1")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            UPDATE loans SET return_date = $2, returned = TRUE, penalty = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(return_date)
        .bind(count_to_db(penalty, "penalty")?)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        loan_from_row(&row)
    }
}

#[async_trait]
impl LendingStore for LoansRepository {
    async fn find_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        sqlx::query("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(customer_from_row)
            .transpose()
    }

    async fn find_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        sqlx::query("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(book_from_row)
            .transpose()
    }

    async fn find_loan(&self, id: Uuid) -> AppResult<Option<Loan>> {
        sqlx::query("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(loan_from_row)
            .transpose()
    }

    async fn find_loan_for_pair(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Option<Loan>> {
        sqlx::query(
            r#"
            SELECT * FROM loans
            WHERE customer_id = $1 AND book_id = $2
            ORDER BY (return_date IS NULL) DESC, out_date DESC
            LIMIT 1
            "#,
        )
        .bind(customer_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(loan_from_row)
        .transpose()
    }

    async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        let rows = sqlx::query("SELECT * FROM loans ORDER BY out_date DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(loan_from_row).collect()
    }

    async fn apply(&self, command: LendingCommand) -> AppResult<Loan> {
        match command {
            LendingCommand::Open(loan) => self.open(loan).await,
            LendingCommand::Extend { loan_id, due_date } => self.extend(loan_id, due_date).await,
            LendingCommand::Close {
                loan_id,
                return_date,
            } => self.close(loan_id, return_date).await,
        }
    }
}
