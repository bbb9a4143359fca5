//! Demo catalog loaded at startup when `storage.seed_demo_data` is set

use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{
        author::AuthorInput, book::BookInput, category::CategoryInput, publisher::PublisherInput,
    },
    services::catalog::CatalogService,
};

const CATEGORIES: &[&str] = &["Philosophy", "Politics", "Journalism"];

const AUTHORS: &[(&str, &str)] = &[
    ("Karl", "Popper"),
    ("Hannah", "Arendt"),
    ("Carl", "Schmitt"),
    ("Chantal", "Mouffe"),
];

const PUBLISHERS: &[&str] = &["Routledge", "Taylor & Francis", "Penguin Classics"];

struct SeedBook {
    title: &'static str,
    author: &'static str,
    category: &'static str,
    publisher: &'static str,
    stock: u32,
    available: u32,
}

const BOOKS: &[SeedBook] = &[
    SeedBook { title: "The Open Society and Its Enemies", author: "Popper", category: "Philosophy", publisher: "Routledge", stock: 6, available: 5 },
    SeedBook { title: "Eichmann in Jerusalem", author: "Arendt", category: "Journalism", publisher: "Penguin Classics", stock: 5, available: 5 },
    SeedBook { title: "The Concept of the Political", author: "Schmitt", category: "Politics", publisher: "Routledge", stock: 10, available: 4 },
    SeedBook { title: "All Life is Problem Solving", author: "Popper", category: "Philosophy", publisher: "Penguin Classics", stock: 5, available: 1 },
    SeedBook { title: "Love and Saint Augustine", author: "Arendt", category: "Journalism", publisher: "Taylor & Francis", stock: 5, available: 5 },
    SeedBook { title: "Political Theology", author: "Schmitt", category: "Politics", publisher: "Taylor & Francis", stock: 15, available: 15 },
    SeedBook { title: "The Challenge of Carl Schmitt", author: "Mouffe", category: "Journalism", publisher: "Taylor & Francis", stock: 9, available: 6 },
    SeedBook { title: "The Democratic Paradox", author: "Mouffe", category: "Philosophy", publisher: "Routledge", stock: 6, available: 1 },
    SeedBook { title: "The Open Universe", author: "Popper", category: "Philosophy", publisher: "Routledge", stock: 10, available: 10 },
];

/// Insert the demo categories, authors, publishers and books.
///
/// Does nothing when the catalog already has books, so restarting a seeded
/// Postgres instance is harmless.
pub async fn seed_demo_catalog(catalog: &CatalogService) -> AppResult<()> {
    if !catalog.list_books().await?.is_empty() {
        tracing::info!("Catalog already populated, skipping demo data");
        return Ok(());
    }

    let mut categories = HashMap::new();
    for name in CATEGORIES {
        let category = catalog
            .create_category(CategoryInput { name: name.to_string() })
            .await?;
        categories.insert(*name, category.id);
    }

    let mut authors = HashMap::new();
    for (first_name, last_name) in AUTHORS {
        let author = catalog
            .create_author(AuthorInput {
                first_name: first_name.to_string(),
                middle_name: None,
                last_name: last_name.to_string(),
            })
            .await?;
        authors.insert(*last_name, author.id);
    }

    let mut publishers = HashMap::new();
    for name in PUBLISHERS {
        let publisher = catalog
            .create_publisher(PublisherInput { name: name.to_string() })
            .await?;
        publishers.insert(*name, publisher.id);
    }

    for book in BOOKS {
        catalog
            .create_book(BookInput {
                title: book.title.to_string(),
                author_id: authors[book.author],
                category_id: categories[book.category],
                publisher_id: publishers[book.publisher],
                stock: book.stock,
                available: Some(book.available),
            })
            .await?;
    }

    tracing::info!(books = BOOKS.len(), "Demo catalog seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let catalog = CatalogService::new(Arc::new(MemoryStore::new()));

        seed_demo_catalog(&catalog).await.unwrap();
        seed_demo_catalog(&catalog).await.unwrap();

        let books = catalog.list_books().await.unwrap();
        assert_eq!(books.len(), BOOKS.len());
        assert_eq!(catalog.list_authors().await.unwrap().len(), AUTHORS.len());

        let paradox = books
            .iter()
            .find(|b| b.title == "The Democratic Paradox")
            .unwrap();
        assert_eq!(paradox.author.last_name, "Mouffe");
        assert_eq!((paradox.stock, paradox.available), (6, 1));
    }
}
