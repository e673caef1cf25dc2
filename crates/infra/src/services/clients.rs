//! Seller-scoped client registry.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use sellerdesk_auth::ensure_owner;
use sellerdesk_clients::{Client, ClientPatch, NewClient};
use sellerdesk_core::{ClientId, DomainError, SellerId};

use crate::error::ServiceResult;
use crate::store::ClientStore;

#[derive(Clone)]
pub struct ClientRegistry {
    store: Arc<dyn ClientStore>,
}

impl ClientRegistry {
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Register a client owned by `caller`. `AlreadyExists` if the email is taken.
    #[instrument(skip(self, input), fields(seller_id = %caller), err)]
    pub async fn create(&self, caller: SellerId, input: NewClient) -> ServiceResult<Client> {
        let client = Client::register(ClientId::new(), caller, input, Utc::now())?;
        self.store.insert(client.clone()).await?;
        tracing::info!(client_id = %client.id, seller_id = %caller, "client registered");
        Ok(client)
    }

    /// Fetch a client and check that `caller` owns it.
    ///
    /// A missing client is `NotFound`; one owned by another seller is `Forbidden`
    /// and its data never leaves this function.
    pub async fn resolve_owned(&self, caller: SellerId, id: ClientId) -> ServiceResult<Client> {
        let client = self
            .store
            .get(id)
            .await?
            .ok_or(DomainError::not_found("client"))?;
        ensure_owner(&client, caller, "client")?;
        Ok(client)
    }

    pub async fn get(&self, caller: SellerId, id: ClientId) -> ServiceResult<Client> {
        self.resolve_owned(caller, id).await
    }

    #[instrument(skip(self, patch), fields(seller_id = %caller, client_id = %id), err)]
    pub async fn update(
        &self,
        caller: SellerId,
        id: ClientId,
        patch: ClientPatch,
    ) -> ServiceResult<Client> {
        let current = self.resolve_owned(caller, id).await?;
        let next = current.patched(patch)?;
        if !self.store.replace(next.clone()).await? {
            return Err(DomainError::not_found("client").into());
        }
        tracing::info!(client_id = %id, seller_id = %caller, "client updated");
        Ok(next)
    }

    #[instrument(skip(self), fields(seller_id = %caller, client_id = %id), err)]
    pub async fn delete(&self, caller: SellerId, id: ClientId) -> ServiceResult<()> {
        self.resolve_owned(caller, id).await?;
        if !self.store.delete(id).await? {
            return Err(DomainError::not_found("client").into());
        }
        tracing::info!(client_id = %id, seller_id = %caller, "client deleted");
        Ok(())
    }

    /// Every client in the registry (administrative listing).
    pub async fn list_all(&self) -> ServiceResult<Vec<Client>> {
        Ok(self.store.list().await?)
    }

    pub async fn list_mine(&self, caller: SellerId) -> ServiceResult<Vec<Client>> {
        Ok(self.store.list_by_seller(caller).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryClientStore;

    fn registry() -> ClientRegistry {
        ClientRegistry::new(Arc::new(InMemoryClientStore::new()))
    }

    fn new_client(email: &str) -> NewClient {
        NewClient {
            name: "Maria".to_string(),
            last_name: "Lopez".to_string(),
            company: Some("Acme".to_string()),
            email: email.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn owner_reads_other_seller_is_forbidden() {
        let registry = registry();
        let (alice, bob) = (SellerId::new(), SellerId::new());
        let client = registry.create(alice, new_client("m@acme.io")).await.unwrap();

        assert_eq!(registry.get(alice, client.id).await.unwrap(), client);

        let err = registry.get(bob, client.id).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::forbidden("client")));

        let err = registry.get(bob, ClientId::new()).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::not_found("client")));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let registry = registry();
        let first = registry
            .create(SellerId::new(), new_client("Dup@Example.com"))
            .await
            .unwrap();
        let err = registry
            .create(SellerId::new(), new_client("  dup@example.COM "))
            .await
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::AlreadyExists(_))));
        assert_eq!(registry.list_all().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn other_seller_cannot_update_or_delete() {
        let registry = registry();
        let (alice, bob) = (SellerId::new(), SellerId::new());
        let client = registry.create(alice, new_client("a@b.co")).await.unwrap();

        let patch = ClientPatch {
            name: Some("Mallory".to_string()),
            ..ClientPatch::default()
        };
        let err = registry.update(bob, client.id, patch.clone()).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::forbidden("client")));
        let err = registry.delete(bob, client.id).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::forbidden("client")));
        assert_eq!(registry.get(alice, client.id).await.unwrap(), client);

        let updated = registry.update(alice, client.id, patch).await.unwrap();
        assert_eq!(updated.name, "Mallory");
        assert_eq!(updated.seller(), alice);

        registry.delete(alice, client.id).await.unwrap();
        assert!(registry.list_mine(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_mine_only_returns_own_clients() {
        let registry = registry();
        let (alice, bob) = (SellerId::new(), SellerId::new());
        registry.create(alice, new_client("1@x.io")).await.unwrap();
        registry.create(bob, new_client("2@x.io")).await.unwrap();
        registry.create(alice, new_client("3@x.io")).await.unwrap();

        let mine = registry.list_mine(alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|c| c.seller() == alice));
        assert_eq!(registry.list_all().await.unwrap().len(), 3);
    }
}
