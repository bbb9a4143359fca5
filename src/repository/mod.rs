//! Repository layer: storage traits and their Postgres / in-memory backends

pub mod catalog;
pub mod loans;
pub mod memory;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, Book, Category, Customer, Loan, Publisher, User},
};

pub use memory::MemoryStore;

/// A compound write on loan, book and customer records.
///
/// `LendingStore::apply` commits every change a command implies or none of
/// them, re-checking the preconditions inside its atomic boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum LendingCommand {
    /// Insert the loan, take one copy off the book, flag the customer.
    Open(Loan),
    /// Move the due date of an open loan.
    Extend {
        loan_id: Uuid,
        due_date: DateTime<Utc>,
    },
    /// Stamp the return, put the copy back, clear the customer. The penalty
    /// is computed from the due date read inside the atomic boundary.
    Close {
        loan_id: Uuid,
        return_date: DateTime<Utc>,
    },
}

/// Storage used by the lending lifecycle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingStore: Send + Sync {
    async fn find_customer(&self, id: Uuid) -> AppResult<Option<Customer>>;

    async fn find_book(&self, id: Uuid) -> AppResult<Option<Book>>;

    async fn find_loan(&self, id: Uuid) -> AppResult<Option<Loan>>;

    /// The open loan for the pair if there is one, otherwise the most recent
    /// returned one
    async fn find_loan_for_pair(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Option<Loan>>;

    /// All loans, newest checkout first
    async fn list_loans(&self) -> AppResult<Vec<Loan>>;

    /// Atomically apply a compound write and return the resulting loan
    async fn apply(&self, command: LendingCommand) -> AppResult<Loan>;
}

/// Storage for the catalog and customer records
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_author(&self, author: &Author) -> AppResult<()>;
    /// Sorted by last name
    async fn list_authors(&self) -> AppResult<Vec<Author>>;
    async fn get_author(&self, id: Uuid) -> AppResult<Option<Author>>;
    async fn update_author(&self, author: &Author) -> AppResult<Option<Author>>;
    async fn delete_author(&self, id: Uuid) -> AppResult<Option<Author>>;

    async fn insert_category(&self, category: &Category) -> AppResult<()>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn update_category(&self, category: &Category) -> AppResult<Option<Category>>;
    async fn delete_category(&self, id: Uuid) -> AppResult<Option<Category>>;

    async fn insert_publisher(&self, publisher: &Publisher) -> AppResult<()>;
    async fn list_publishers(&self) -> AppResult<Vec<Publisher>>;
    async fn get_publisher(&self, id: Uuid) -> AppResult<Option<Publisher>>;
    async fn update_publisher(&self, publisher: &Publisher) -> AppResult<Option<Publisher>>;
    async fn delete_publisher(&self, id: Uuid) -> AppResult<Option<Publisher>>;

    async fn insert_book(&self, book: &Book) -> AppResult<()>;
    /// Sorted by title
    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn get_book(&self, id: Uuid) -> AppResult<Option<Book>>;
    /// Replace title, snapshots and stock. `available` is recomputed from the
    /// stored number of copies on loan; a stock below that is rejected.
    async fn update_book(&self, book: &Book) -> AppResult<Option<Book>>;
    /// Fails with `HasOpenLoan` while any copy is out
    async fn delete_book(&self, id: Uuid) -> AppResult<Option<Book>>;

    async fn insert_customer(&self, customer: &Customer) -> AppResult<()>;
    /// Sorted by name
    async fn list_customers(&self) -> AppResult<Vec<Customer>>;
    async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>>;
    /// Replace name and phone; `has_book` is left untouched
    async fn update_customer(&self, customer: &Customer) -> AppResult<Option<Customer>>;
    /// Fails with `HasOpenLoan` while the customer holds a book
    async fn delete_customer(&self, id: Uuid) -> AppResult<Option<Customer>>;
}

/// Storage for staff accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the email is taken
    async fn insert_user(&self, user: &User) -> AppResult<()>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Storage handles shared by all services
#[derive(Clone)]
pub struct Repository {
    pub lending: Arc<dyn LendingStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a repository backed by the given Postgres pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            lending: Arc::new(loans::LoansRepository::new(pool.clone())),
            catalog: Arc::new(catalog::CatalogRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }

    /// Create a repository whose three stores share one in-memory dataset
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            lending: Arc::new(store.clone()),
            catalog: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}

/// Postgres INTEGER column to a non-negative count
pub(crate) fn count_from_db(value: i32, column: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| crate::error::AppError::Internal(format!("negative value in column {}", column)))
}

/// Non-negative count to a Postgres INTEGER column
pub(crate) fn count_to_db(value: u32, column: &str) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|_| crate::error::AppError::Validation(format!("{} is too large", column)))
}
