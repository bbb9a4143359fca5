//! Catalog and customer repository for Postgres

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use super::{count_from_db, count_to_db, CatalogStore};
use crate::{
    error::{AppError, AppResult, ConflictKind},
    models::{Author, AuthorSnapshot, Book, Category, Customer, Publisher},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn author_from_row(row: &PgRow) -> AppResult<Author> {
    Ok(Author {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        middle_name: row.try_get("middle_name")?,
        last_name: row.try_get("last_name")?,
    })
}

fn category_from_row(row: &PgRow) -> AppResult<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn publisher_from_row(row: &PgRow) -> AppResult<Publisher> {
    Ok(Publisher {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

pub(crate) fn book_from_row(row: &PgRow) -> AppResult<Book> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: AuthorSnapshot {
            id: row.try_get("author_id")?,
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
        },
        category: Category {
            id: row.try_get("category_id")?,
            name: row.try_get("category_name")?,
        },
        publisher: Publisher {
            id: row.try_get("publisher_id")?,
            name: row.try_get("publisher_name")?,
        },
        stock: count_from_db(row.try_get("stock")?, "stock")?,
        available: count_from_db(row.try_get("available")?, "available")?,
    })
}

pub(crate) fn customer_from_row(row: &PgRow) -> AppResult<Customer> {
    Ok(Customer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        has_book: row.try_get("has_book")?,
    })
}

fn map_rows<T>(rows: Vec<PgRow>, f: fn(&PgRow) -> AppResult<T>) -> AppResult<Vec<T>> {
    rows.iter().map(f).collect()
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn insert_author(&self, author: &Author) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO authors (id, first_name, middle_name, last_name) VALUES ($1, $2, $3, $4)",
        )
        .bind(author.id)
        .bind(&author.first_name)
        .bind(&author.middle_name)
        .bind(&author.last_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query("SELECT * FROM authors ORDER BY last_name, first_name")
            .fetch_all(&self.pool)
            .await?;
        map_rows(rows, author_from_row)
    }

    async fn get_author(&self, id: Uuid) -> AppResult<Option<Author>> {
        sqlx::query("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(author_from_row)
            .transpose()
    }

    async fn update_author(&self, author: &Author) -> AppResult<Option<Author>> {
        sqlx::query(
            r#"
            UPDATE authors SET first_name = $2, middle_name = $3, last_name = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(author.id)
        .bind(&author.first_name)
        .bind(&author.middle_name)
        .bind(&author.last_name)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(author_from_row)
        .transpose()
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<Option<Author>> {
        sqlx::query("DELETE FROM authors WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(author_from_row)
            .transpose()
    }

    async fn insert_category(&self, category: &Category) -> AppResult<()> {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        map_rows(rows, category_from_row)
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(category_from_row)
            .transpose()
    }

    async fn update_category(&self, category: &Category) -> AppResult<Option<Category>> {
        sqlx::query("UPDATE categories SET name = $2 WHERE id = $1 RETURNING *")
            .bind(category.id)
            .bind(&category.name)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(category_from_row)
            .transpose()
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query("DELETE FROM categories WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(category_from_row)
            .transpose()
    }

    async fn insert_publisher(&self, publisher: &Publisher) -> AppResult<()> {
        sqlx::query("INSERT INTO publishers (id, name) VALUES ($1, $2)")
            .bind(publisher.id)
            .bind(&publisher.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        let rows = sqlx::query("SELECT * FROM publishers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        map_rows(rows, publisher_from_row)
    }

    async fn get_publisher(&self, id: Uuid) -> AppResult<Option<Publisher>> {
        sqlx::query("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(publisher_from_row)
            .transpose()
    }

    async fn update_publisher(&self, publisher: &Publisher) -> AppResult<Option<Publisher>> {
        sqlx::query("UPDATE publishers SET name = $2 WHERE id = $1 RETURNING *")
            .bind(publisher.id)
            .bind(&publisher.name)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(publisher_from_row)
            .transpose()
    }

    async fn delete_publisher(&self, id: Uuid) -> AppResult<Option<Publisher>> {
        sqlx::query("DELETE FROM publishers WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(publisher_from_row)
            .transpose()
    }

    async fn insert_book(&self, book: &Book) -> AppResult<()> {
        if book.available > book.stock {
            return Err(AppError::Validation("available cannot exceed stock".to_string()));
        }
        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, author_id, author_first_name, author_last_name,
                category_id, category_name, publisher_id, publisher_name,
                stock, available
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author.id)
        .bind(&book.author.first_name)
        .bind(&book.author.last_name)
        .bind(book.category.id)
        .bind(&book.category.name)
        .bind(book.publisher.id)
        .bind(&book.publisher.name)
        .bind(count_to_db(book.stock, "stock")?)
        .bind(count_to_db(book.available, "available")?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        map_rows(rows, book_from_row)
    }

    async fn get_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        sqlx::query("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(book_from_row)
            .transpose()
    }

    async fn update_book(&self, book: &Book) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let on_loan: Option<i32> =
            sqlx::query_scalar("SELECT stock - available FROM books WHERE id = $1 FOR UPDATE")
                .bind(book.id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(on_loan) = on_loan else {
            return Ok(None);
        };
        let on_loan = count_from_db(on_loan, "stock")?;
        if book.stock < on_loan {
            return Err(AppError::Validation(format!(
                "stock cannot be lower than the {} copies on loan",
                on_loan
            )));
        }

        let row = sqlx::query(
            r#"
            UPDATE books SET
                title = $2,
                author_id = $3, author_first_name = $4, author_last_name = $5,
                category_id = $6, category_name = $7,
                publisher_id = $8, publisher_name = $9,
                stock = $10, available = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author.id)
        .bind(&book.author.first_name)
        .bind(&book.author.last_name)
        .bind(book.category.id)
        .bind(&book.category.name)
        .bind(book.publisher.id)
        .bind(&book.publisher.name)
        .bind(count_to_db(book.stock, "stock")?)
        .bind(count_to_db(book.stock - on_loan, "available")?)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        book_from_row(&row).map(Some)
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let has_open_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND return_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if has_open_loan {
            return Err(AppError::Conflict(ConflictKind::HasOpenLoan));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        book_from_row(&row).map(Some)
    }

    async fn insert_customer(&self, customer: &Customer) -> AppResult<()> {
        sqlx::query("INSERT INTO customers (id, name, phone, has_book) VALUES ($1, $2, $3, $4)")
            .bind(customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(customer.has_book)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query("SELECT * FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        map_rows(rows, customer_from_row)
    }

    async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        sqlx::query("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(customer_from_row)
            .transpose()
    }

    async fn update_customer(&self, customer: &Customer) -> AppResult<Option<Customer>> {
        sqlx::query("UPDATE customers SET name = $2, phone = $3 WHERE id = $1 RETURNING *")
            .bind(customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(customer_from_row)
            .transpose()
    }

    async fn delete_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let customer = customer_from_row(&row)?;
        if customer.has_book {
            return Err(AppError::Conflict(ConflictKind::HasOpenLoan));
        }

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(customer))
    }
}
