//! Catalog management service: authors, categories, publishers and books

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, Entity},
    models::{
        author::AuthorInput, book::BookInput, category::CategoryInput,
        publisher::PublisherInput, Author, AuthorSnapshot, Book, Category, Publisher,
    },
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // ---- authors ----

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.store.list_authors().await
    }

    pub async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        self.store
            .get_author(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Author))
    }

    pub async fn create_author(&self, input: AuthorInput) -> AppResult<Author> {
        let author = Author::new(input);
        self.store.insert_author(&author).await?;
        tracing::info!(author_id = %author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: Uuid, input: AuthorInput) -> AppResult<Author> {
        let author = Author {
            id,
            ..Author::new(input)
        };
        self.store
            .update_author(&author)
            .await?
            .ok_or(AppError::NotFound(Entity::Author))
    }

    pub async fn delete_author(&self, id: Uuid) -> AppResult<Author> {
        self.store
            .delete_author(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Author))
    }

    // ---- categories ----

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Category))
    }

    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
        };
        self.store.insert_category(&category).await?;
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        self.store
            .update_category(&Category { id, name: input.name })
            .await?
            .ok_or(AppError::NotFound(Entity::Category))
    }

    pub async fn delete_category(&self, id: Uuid) -> AppResult<Category> {
        self.store
            .delete_category(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Category))
    }

    // ---- publishers ----

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        self.store.list_publishers().await
    }

    pub async fn get_publisher(&self, id: Uuid) -> AppResult<Publisher> {
        self.store
            .get_publisher(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Publisher))
    }

    pub async fn create_publisher(&self, input: PublisherInput) -> AppResult<Publisher> {
        let publisher = Publisher {
            id: Uuid::new_v4(),
            name: input.name,
        };
        self.store.insert_publisher(&publisher).await?;
        Ok(publisher)
    }

    pub async fn update_publisher(&self, id: Uuid, input: PublisherInput) -> AppResult<Publisher> {
        self.store
            .update_publisher(&Publisher { id, name: input.name })
            .await?
            .ok_or(AppError::NotFound(Entity::Publisher))
    }

    pub async fn delete_publisher(&self, id: Uuid) -> AppResult<Publisher> {
        self.store
            .delete_publisher(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Publisher))
    }

    // ---- books ----

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.list_books().await
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.store
            .get_book(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Book))
    }

    /// Create a book, embedding snapshots of its author, category and
    /// publisher. All copies start on the shelf unless `available` says
    /// otherwise.
    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let available = shelf_count(&input)?;
        let book = self.resolve(Uuid::new_v4(), &input, available).await?;
        self.store.insert_book(&book).await?;
        tracing::info!(book_id = %book.id, title = %book.title, "Book created");
        Ok(book)
    }

    /// Replace title, references and stock. Copies currently on loan stay on
    /// loan: the store recomputes `available` from them. A supplied
    /// `available` is still rejected when it exceeds `stock`.
    pub async fn update_book(&self, id: Uuid, input: BookInput) -> AppResult<Book> {
        shelf_count(&input)?;
        let book = self.resolve(id, &input, input.stock).await?;
        self.store
            .update_book(&book)
            .await?
            .ok_or(AppError::NotFound(Entity::Book))
    }

    pub async fn delete_book(&self, id: Uuid) -> AppResult<Book> {
        let book = self
            .store
            .delete_book(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Book))?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(book)
    }

    async fn resolve(&self, id: Uuid, input: &BookInput, available: u32) -> AppResult<Book> {
        let author = self.get_author(input.author_id).await?;
        let category = self.get_category(input.category_id).await?;
        let publisher = self.get_publisher(input.publisher_id).await?;

        Ok(Book {
            id,
            title: input.title.clone(),
            author: AuthorSnapshot::from(&author),
            category,
            publisher,
            stock: input.stock,
            available,
        })
    }
}

fn shelf_count(input: &BookInput) -> AppResult<u32> {
    let available = input.available.unwrap_or(input.stock);
    if available > input.stock {
        return Err(AppError::Validation(
            "available cannot exceed stock".to_string(),
        ));
    }
    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    async fn service_with_refs() -> (CatalogService, Author, Category, Publisher) {
        let service = CatalogService::new(Arc::new(MemoryStore::new()));
        let author = service
            .create_author(AuthorInput {
                first_name: "Karl".into(),
                middle_name: None,
                last_name: "Popper".into(),
            })
            .await
            .unwrap();
        let category = service
            .create_category(CategoryInput {
                name: "Philosophy".into(),
            })
            .await
            .unwrap();
        let publisher = service
            .create_publisher(PublisherInput {
                name: "Routledge".into(),
            })
            .await
            .unwrap();
        (service, author, category, publisher)
    }

    fn input(author: &Author, category: &Category, publisher: &Publisher, stock: u32) -> BookInput {
        BookInput {
            title: "The Open Society and Its Enemies".into(),
            author_id: author.id,
            category_id: category.id,
            publisher_id: publisher.id,
            stock,
            available: None,
        }
    }

    #[tokio::test]
    async fn new_book_embeds_snapshots_and_starts_fully_available() {
        let (service, author, category, publisher) = service_with_refs().await;

        let book = service
            .create_book(input(&author, &category, &publisher, 4))
            .await
            .unwrap();

        assert_eq!(book.available, 4);
        assert_eq!(book.author.last_name, "Popper");
        assert_eq!(book.category, category);
        assert_eq!(book.publisher, publisher);
    }

    #[tokio::test]
    async fn book_with_unknown_author_is_rejected() {
        let (service, _, category, publisher) = service_with_refs().await;
        let ghost = Author {
            id: Uuid::new_v4(),
            first_name: "Nobody".into(),
            middle_name: None,
            last_name: "Known".into(),
        };

        let result = service.create_book(input(&ghost, &category, &publisher, 1)).await;
        assert!(matches!(result, Err(AppError::NotFound(Entity::Author))));
    }

    #[tokio::test]
    async fn available_above_stock_is_rejected() {
        let (service, author, category, publisher) = service_with_refs().await;
        let mut request = input(&author, &category, &publisher, 2);
        request.available = Some(3);

        assert!(matches!(
            service.create_book(request).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_available_above_stock() {
        let (service, author, category, publisher) = service_with_refs().await;
        let book = service
            .create_book(input(&author, &category, &publisher, 2))
            .await
            .unwrap();

        let mut request = input(&author, &category, &publisher, 2);
        request.available = Some(5);
        assert!(matches!(
            service.update_book(book.id, request).await,
            Err(AppError::Validation(_))
        ));

        // Within stock, the shelf count still comes from the copies on loan
        let mut request = input(&author, &category, &publisher, 3);
        request.available = Some(1);
        let updated = service.update_book(book.id, request).await.unwrap();
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.available, 3);
    }

    #[tokio::test]
    async fn update_of_missing_category_is_not_found() {
        let (service, ..) = service_with_refs().await;
        let result = service
            .update_category(
                Uuid::new_v4(),
                CategoryInput {
                    name: "Journalism".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(Entity::Category))));
    }

    #[tokio::test]
    async fn authors_are_listed_by_last_name() {
        let (service, ..) = service_with_refs().await;
        service
            .create_author(AuthorInput {
                first_name: "Hannah".into(),
                middle_name: None,
                last_name: "Arendt".into(),
            })
            .await
            .unwrap();

        let names: Vec<_> = service
            .list_authors()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.last_name)
            .collect();
        assert_eq!(names, vec!["Arendt", "Popper"]);
    }
}
