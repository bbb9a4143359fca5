//! Data models for the lending server

pub mod author;
pub mod book;
pub mod category;
pub mod customer;
pub mod loan;
pub mod publisher;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorSnapshot};
pub use book::Book;
pub use category::Category;
pub use customer::Customer;
pub use loan::{BookSnapshot, CustomerSnapshot, Loan, LoanStatus};
pub use publisher::Publisher;
pub use user::{User, UserClaims};
