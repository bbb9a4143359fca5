//! In-memory store.
//!
//! Every table lives behind one `RwLock`, so a `LendingCommand` is checked
//! and applied under a single write guard and readers never see half of it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, LendingCommand, LendingStore, UserStore};
use crate::{
    error::{AppError, AppResult, ConflictKind, Entity},
    models::{Author, Book, Category, Customer, Loan, Publisher, User},
};

#[derive(Default)]
struct Tables {
    authors: HashMap<Uuid, Author>,
    categories: HashMap<Uuid, Category>,
    publishers: HashMap<Uuid, Publisher>,
    books: HashMap<Uuid, Book>,
    customers: HashMap<Uuid, Customer>,
    loans: HashMap<Uuid, Loan>,
    users: HashMap<Uuid, User>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T: Clone, K: Ord>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut values: Vec<T> = values.collect();
    values.sort_by_key(|v| key(v));
    values
}

impl Tables {
    fn open_loan(&mut self, loan: Loan) -> AppResult<Loan> {
        let customer = self
            .customers
            .get(&loan.customer.id)
            .ok_or(AppError::NotFound(Entity::Customer))?;
        let book = self
            .books
            .get(&loan.book.id)
            .ok_or(AppError::NotFound(Entity::Book))?;

        if customer.has_book {
            return Err(AppError::Conflict(ConflictKind::AlreadyHoldingBook));
        }
        if !book.has_available_copy() {
            return Err(AppError::Conflict(ConflictKind::NoAvailableCopies));
        }

        // Checks passed, nothing below can fail.
        if let Some(book) = self.books.get_mut(&loan.book.id) {
            book.available -= 1;
        }
        if let Some(customer) = self.customers.get_mut(&loan.customer.id) {
            customer.has_book = true;
        }
        self.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    fn extend_loan(&mut self, loan_id: Uuid, due_date: chrono::DateTime<chrono::Utc>) -> AppResult<Loan> {
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or(AppError::NotFound(Entity::Loan))?;
        if !loan.is_open() {
            return Err(AppError::Conflict(ConflictKind::AlreadyProcessed));
        }
        loan.due_date = due_date;
        Ok(loan.clone())
    }

    fn close_loan(
        &mut self,
        loan_id: Uuid,
        return_date: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<Loan> {
        let loan = self.loans.get(&loan_id).ok_or(AppError::NotFound(Entity::Loan))?;
        if !loan.is_open() {
            return Err(AppError::Conflict(ConflictKind::AlreadyProcessed));
        }
        let (customer_id, book_id) = (loan.customer.id, loan.book.id);

        let book = self.books.get(&book_id).ok_or(AppError::NotFound(Entity::Book))?;
        if book.available >= book.stock {
            return Err(AppError::Internal(format!(
                "book {} has no copy out on loan",
                book_id
            )));
        }
        if !self.customers.contains_key(&customer_id) {
            return Err(AppError::NotFound(Entity::Customer));
        }

        if let Some(book) = self.books.get_mut(&book_id) {
            book.available += 1;
        }
        if let Some(customer) = self.customers.get_mut(&customer_id) {
            customer.has_book = false;
        }
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or(AppError::NotFound(Entity::Loan))?;
        loan.close(return_date);
        Ok(loan.clone())
    }
}

#[async_trait]
impl LendingStore for MemoryStore {
    async fn find_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn find_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn find_loan(&self, id: Uuid) -> AppResult<Option<Loan>> {
        Ok(self.tables.read().await.loans.get(&id).cloned())
    }

    async fn find_loan_for_pair(&self, customer_id: Uuid, book_id: Uuid) -> AppResult<Option<Loan>> {
        let tables = self.tables.read().await;
        let loan = tables
            .loans
            .values()
            .filter(|l| l.customer.id == customer_id && l.book.id == book_id)
            .max_by_key(|l| (l.is_open(), l.out_date))
            .cloned();
        Ok(loan)
    }

    async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        let tables = self.tables.read().await;
        let mut loans: Vec<Loan> = tables.loans.values().cloned().collect();
        loans.sort_by(|a, b| b.out_date.cmp(&a.out_date));
        Ok(loans)
    }

    async fn apply(&self, command: LendingCommand) -> AppResult<Loan> {
        let mut tables = self.tables.write().await;
        match command {
            LendingCommand::Open(loan) => tables.open_loan(loan),
            LendingCommand::Extend { loan_id, due_date } => tables.extend_loan(loan_id, due_date),
            LendingCommand::Close {
                loan_id,
                return_date,
            } => tables.close_loan(loan_id, return_date),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_author(&self, author: &Author) -> AppResult<()> {
        self.tables.write().await.authors.insert(author.id, author.clone());
        Ok(())
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.authors.values().cloned(), |a| a.last_name.clone()))
    }

    async fn get_author(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn update_author(&self, author: &Author) -> AppResult<Option<Author>> {
        let mut tables = self.tables.write().await;
        Ok(tables.authors.get_mut(&author.id).map(|stored| {
            *stored = author.clone();
            stored.clone()
        }))
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.tables.write().await.authors.remove(&id))
    }

    async fn insert_category(&self, category: &Category) -> AppResult<()> {
        self.tables.write().await.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.categories.values().cloned(), |c| c.name.clone()))
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn update_category(&self, category: &Category) -> AppResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        Ok(tables.categories.get_mut(&category.id).map(|stored| {
            *stored = category.clone();
            stored.clone()
        }))
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.tables.write().await.categories.remove(&id))
    }

    async fn insert_publisher(&self, publisher: &Publisher) -> AppResult<()> {
        self.tables.write().await.publishers.insert(publisher.id, publisher.clone());
        Ok(())
    }

    async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.publishers.values().cloned(), |p| p.name.clone()))
    }

    async fn get_publisher(&self, id: Uuid) -> AppResult<Option<Publisher>> {
        Ok(self.tables.read().await.publishers.get(&id).cloned())
    }

    async fn update_publisher(&self, publisher: &Publisher) -> AppResult<Option<Publisher>> {
        let mut tables = self.tables.write().await;
        Ok(tables.publishers.get_mut(&publisher.id).map(|stored| {
            *stored = publisher.clone();
            stored.clone()
        }))
    }

    async fn delete_publisher(&self, id: Uuid) -> AppResult<Option<Publisher>> {
        Ok(self.tables.write().await.publishers.remove(&id))
    }

    async fn insert_book(&self, book: &Book) -> AppResult<()> {
        if book.available > book.stock {
            return Err(AppError::Validation("available cannot exceed stock".to_string()));
        }
        self.tables.write().await.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.books.values().cloned(), |b| b.title.clone()))
    }

    async fn get_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn update_book(&self, book: &Book) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.books.get_mut(&book.id) else {
            return Ok(None);
        };
        let on_loan = stored.on_loan();
        if book.stock < on_loan {
            return Err(AppError::Validation(format!(
                "stock cannot be lower than the {} copies on loan",
                on_loan
            )));
        }
        *stored = Book {
            available: book.stock - on_loan,
            ..book.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        if tables.loans.values().any(|l| l.book.id == id && l.is_open()) {
            return Err(AppError::Conflict(ConflictKind::HasOpenLoan));
        }
        Ok(tables.books.remove(&id))
    }

    async fn insert_customer(&self, customer: &Customer) -> AppResult<()> {
        self.tables.write().await.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.customers.values().cloned(), |c| c.name.clone()))
    }

    async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn update_customer(&self, customer: &Customer) -> AppResult<Option<Customer>> {
        let mut tables = self.tables.write().await;
        Ok(tables.customers.get_mut(&customer.id).map(|stored| {
            stored.name = customer.name.clone();
            stored.phone = customer.phone.clone();
            stored.clone()
        }))
    }

    async fn delete_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let mut tables = self.tables.write().await;
        if tables.customers.get(&id).is_some_and(|c| c.has_book) {
            return Err(AppError::Conflict(ConflictKind::HasOpenLoan));
        }
        Ok(tables.customers.remove(&id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(ConflictKind::Duplicate));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}
