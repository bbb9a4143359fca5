//! Book model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{author::AuthorSnapshot, category::Category, publisher::Publisher};

/// A catalog title with its copy counts.
///
/// `available` is the number of copies on the shelf. It is kept in
/// `0..=stock` and only moves when a loan is opened or closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: AuthorSnapshot,
    pub category: Category,
    pub publisher: Publisher,
    pub stock: u32,
    pub available: u32,
}

impl Book {
    /// Copies currently out on loan
    pub fn on_loan(&self) -> u32 {
        self.stock.saturating_sub(self.available)
    }

    pub fn has_available_copy(&self) -> bool {
        self.available > 0
    }
}

/// Create/update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[validate(length(min = 3, max = 50, message = "title must be 3 to 50 characters"))]
    pub title: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub publisher_id: Uuid,
    pub stock: u32,
    /// Copies on the shelf at creation; defaults to `stock`. On update it
    /// must not exceed `stock`, and the stored count is derived from the
    /// copies on loan.
    pub available: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(stock: u32, available: u32) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "Eichmann in Jerusalem".into(),
            author: AuthorSnapshot {
                id: Uuid::new_v4(),
                first_name: "Hannah".into(),
                last_name: "Arendt".into(),
            },
            category: Category {
                id: Uuid::new_v4(),
                name: "Journalism".into(),
            },
            publisher: Publisher {
                id: Uuid::new_v4(),
                name: "Penguin Classics".into(),
            },
            stock,
            available,
        }
    }

    #[test]
    fn copies_on_loan() {
        assert_eq!(book(5, 3).on_loan(), 2);
        assert!(book(5, 3).has_available_copy());
        assert!(!book(5, 0).has_available_copy());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(book(1, 1)).unwrap();
        assert_eq!(json["author"]["firstName"], "Hannah");
        assert_eq!(json["available"], 1);
    }
}
