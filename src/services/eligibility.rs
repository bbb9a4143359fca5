//! Loan eligibility

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, ConflictKind, Entity},
    models::{Book, Customer},
    repository::LendingStore,
};

/// Records that passed the eligibility check
#[derive(Debug, Clone)]
pub struct Eligible {
    pub customer: Customer,
    pub book: Book,
}

/// Decide whether `customer_id` may borrow `book_id`.
///
/// Checks run in a fixed order and stop at the first failure: customer
/// exists, book exists, customer holds nothing, a copy is on the shelf.
/// Read only.
pub async fn check_eligibility(
    store: &dyn LendingStore,
    customer_id: Uuid,
    book_id: Uuid,
) -> AppResult<Eligible> {
    let customer = store
        .find_customer(customer_id)
        .await?
        .ok_or(AppError::NotFound(Entity::Customer))?;

    let book = store
        .find_book(book_id)
        .await?
        .ok_or(AppError::NotFound(Entity::Book))?;

    if customer.has_book {
        return Err(AppError::Conflict(ConflictKind::AlreadyHoldingBook));
    }

    if !book.has_available_copy() {
        return Err(AppError::Conflict(ConflictKind::NoAvailableCopies));
    }

    Ok(Eligible { customer, book })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{AuthorSnapshot, Category, Publisher},
        repository::MockLendingStore,
    };

    fn customer(has_book: bool) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Hannah Arendt".into(),
            phone: "123456789".into(),
            has_book,
        }
    }

    fn book(available: u32) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "The Concept of the Political".into(),
            author: AuthorSnapshot {
                id: Uuid::new_v4(),
                first_name: "Carl".into(),
                last_name: "Schmitt".into(),
            },
            category: Category {
                id: Uuid::new_v4(),
                name: "Politics".into(),
            },
            publisher: Publisher {
                id: Uuid::new_v4(),
                name: "Taylor & Francis".into(),
            },
            stock: 3,
            available,
        }
    }

    fn store_with(customer: Option<Customer>, book: Option<Book>) -> MockLendingStore {
        let mut store = MockLendingStore::new();
        store
            .expect_find_customer()
            .returning(move |_| Ok(customer.clone()));
        store.expect_find_book().returning(move |_| Ok(book.clone()));
        store.expect_apply().never();
        store
    }

    #[tokio::test]
    async fn missing_customer_is_reported_first() {
        let mut store = MockLendingStore::new();
        store.expect_find_customer().returning(|_| Ok(None));
        store.expect_find_book().never();

        let result = check_eligibility(&store, Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(Entity::Customer))));
    }

    #[tokio::test]
    async fn missing_book() {
        let store = store_with(Some(customer(true)), None);
        let result = check_eligibility(&store, Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(Entity::Book))));
    }

    #[tokio::test]
    async fn holding_customer_wins_over_empty_shelf() {
        let store = store_with(Some(customer(true)), Some(book(0)));
        let result = check_eligibility(&store, Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(ConflictKind::AlreadyHoldingBook))
        ));
    }

    #[tokio::test]
    async fn empty_shelf() {
        let store = store_with(Some(customer(false)), Some(book(0)));
        let result = check_eligibility(&store, Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(ConflictKind::NoAvailableCopies))
        ));
    }

    #[tokio::test]
    async fn eligible_pair_returns_both_records() {
        let customer = customer(false);
        let book = book(2);
        let store = store_with(Some(customer.clone()), Some(book.clone()));

        let eligible = check_eligibility(&store, customer.id, book.id).await.unwrap();
        assert_eq!(eligible.customer, customer);
        assert_eq!(eligible.book, book);
    }
}
