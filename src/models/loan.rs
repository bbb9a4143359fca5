//! Loan (lending) model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{book::Book, customer::Customer};
use crate::{
    error::{AppError, AppResult},
    services::penalty::compute_penalty,
};

/// Customer fields copied into a loan when it is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerSnapshot {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            phone: customer.phone.clone(),
        }
    }
}

/// Book fields copied into a loan when it is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSnapshot {
    pub id: Uuid,
    pub title: String,
}

impl From<&Book> for BookSnapshot {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Open,
    Returned,
}

/// A borrowing event.
///
/// The snapshots are frozen at checkout; later edits to the customer or the
/// book do not show up here. `penalty` is set once the loan is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub customer: CustomerSnapshot,
    pub book: BookSnapshot,
    pub out_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub returned: bool,
    pub penalty: Option<u32>,
}

impl Loan {
    /// Build a new open loan for `customer` borrowing `book`
    pub fn open(customer: &Customer, book: &Book, out_date: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: customer.into(),
            book: book.into(),
            out_date,
            due_date: out_date + duration,
            return_date: None,
            returned: false,
            penalty: None,
        }
    }

    pub fn status(&self) -> LoanStatus {
        if self.return_date.is_some() {
            LoanStatus::Returned
        } else {
            LoanStatus::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == LoanStatus::Open
    }

    /// Stamp the return, charging for each whole day past the due date
    /// this loan currently carries
    pub fn close(&mut self, return_date: DateTime<Utc>) {
        self.return_date = Some(return_date);
        self.returned = true;
        self.penalty = Some(compute_penalty(self.due_date, return_date));
    }
}

/// Body of lending, extension and return requests
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    #[validate(length(min = 1, message = "customerId is required"))]
    pub customer_id: String,
    #[validate(length(min = 1, message = "bookId is required"))]
    pub book_id: String,
}

impl LoanRequest {
    /// Parse both identifiers, rejecting anything that is not a UUID
    pub fn ids(&self) -> AppResult<(Uuid, Uuid)> {
        Ok((
            parse_id(&self.customer_id, "customerId")?,
            parse_id(&self.book_id, "bookId")?,
        ))
    }
}

/// Body of `PUT /lendings/{id}`: extend the loan, or return it when
/// `hasReturned` is true
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanUpdate {
    pub has_returned: bool,
}

fn parse_id(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation(format!("{} is not a valid id", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::CustomerInput;

    #[test]
    fn request_ids_must_be_uuids() {
        let request = LoanRequest {
            customer_id: "not-an-id".into(),
            book_id: Uuid::new_v4().to_string(),
        };
        assert!(matches!(request.ids(), Err(AppError::Validation(_))));

        let customer_id = Uuid::new_v4();
        let book_id = Uuid::new_v4();
        let request = LoanRequest {
            customer_id: customer_id.to_string(),
            book_id: book_id.to_string(),
        };
        assert_eq!(request.ids().unwrap(), (customer_id, book_id));
    }

    #[test]
    fn empty_ids_fail_validation() {
        let request = LoanRequest {
            customer_id: String::new(),
            book_id: Uuid::new_v4().to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn status_follows_return_date() {
        let customer = Customer::new(CustomerInput {
            name: "Ada Lovelace".into(),
            phone: "123456789".into(),
        });
        let book = crate::models::book::Book {
            id: Uuid::new_v4(),
            title: "Origins of Totalitarianism".into(),
            author: crate::models::author::AuthorSnapshot {
                id: Uuid::new_v4(),
                first_name: "Hannah".into(),
                last_name: "Arendt".into(),
            },
            category: crate::models::category::Category {
                id: Uuid::new_v4(),
                name: "Politics".into(),
            },
            publisher: crate::models::publisher::Publisher {
                id: Uuid::new_v4(),
                name: "Penguin Classics".into(),
            },
            stock: 1,
            available: 1,
        };
        let now = Utc::now();
        let mut loan = Loan::open(&customer, &book, now, Duration::days(7));

        assert_eq!(loan.status(), LoanStatus::Open);
        assert_eq!(loan.due_date, now + Duration::days(7));
        assert_eq!(loan.customer.name, "Ada Lovelace");
        assert_eq!(loan.book.title, "Origins of Totalitarianism");

        loan.return_date = Some(now);
        assert_eq!(loan.status(), LoanStatus::Returned);
        assert!(!loan.is_open());
    }

    #[test]
    fn close_charges_against_the_current_due_date() {
        let customer = Customer::new(CustomerInput {
            name: "Simone Weil".into(),
            phone: "123456789".into(),
        });
        let book = crate::models::book::Book {
            id: Uuid::new_v4(),
            title: "Gravity and Grace".into(),
            author: crate::models::author::AuthorSnapshot {
                id: Uuid::new_v4(),
                first_name: "Simone".into(),
                last_name: "Weil".into(),
            },
            category: crate::models::category::Category {
                id: Uuid::new_v4(),
                name: "Philosophy".into(),
            },
            publisher: crate::models::publisher::Publisher {
                id: Uuid::new_v4(),
                name: "Routledge".into(),
            },
            stock: 1,
            available: 1,
        };
        let out = Utc::now();
        let mut loan = Loan::open(&customer, &book, out, Duration::days(7));
        loan.due_date = out + Duration::days(14);

        loan.close(out + Duration::days(10));

        assert!(loan.returned);
        assert_eq!(loan.return_date, Some(out + Duration::days(10)));
        assert_eq!(loan.penalty, Some(0));
    }
}
