//! Customer management

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, Entity},
    models::{customer::CustomerInput, Customer},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CustomersService {
    store: Arc<dyn CatalogStore>,
}

impl CustomersService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        self.store.list_customers().await
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Customer))
    }

    pub async fn create_customer(&self, input: CustomerInput) -> AppResult<Customer> {
        let customer = Customer::new(input);
        self.store.insert_customer(&customer).await?;
        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Change name and phone. The holding flag belongs to the lending
    /// lifecycle and is kept as stored.
    pub async fn update_customer(&self, id: Uuid, input: CustomerInput) -> AppResult<Customer> {
        let customer = Customer {
            id,
            ..Customer::new(input)
        };
        self.store
            .update_customer(&customer)
            .await?
            .ok_or(AppError::NotFound(Entity::Customer))
    }

    pub async fn delete_customer(&self, id: Uuid) -> AppResult<Customer> {
        let customer = self
            .store
            .delete_customer(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Customer))?;
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn input(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.into(),
            phone: "0612345678".into(),
        }
    }

    #[tokio::test]
    async fn update_keeps_holding_flag() {
        let store = MemoryStore::new();
        let held = Customer {
            has_book: true,
            ..Customer::new(input("Rosa Luxemburg"))
        };
        store.insert_customer(&held).await.unwrap();
        let service = CustomersService::new(Arc::new(store));

        let updated = service
            .update_customer(held.id, input("Rosa Luxembourg"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Rosa Luxembourg");
        assert!(updated.has_book);
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let service = CustomersService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.get_customer(Uuid::new_v4()).await,
            Err(AppError::NotFound(Entity::Customer))
        ));
        assert!(matches!(
            service.delete_customer(Uuid::new_v4()).await,
            Err(AppError::NotFound(Entity::Customer))
        ));
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let service = CustomersService::new(Arc::new(MemoryStore::new()));
        service.create_customer(input("Simone Weil")).await.unwrap();
        service.create_customer(input("Albert Camus")).await.unwrap();

        let names: Vec<_> = service
            .list_customers()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Albert Camus", "Simone Weil"]);
    }
}
