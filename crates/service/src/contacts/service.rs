use std::{path::PathBuf, sync::Arc};

use serde_json::Value;
use tracing::{info, instrument};

use super::domain::{body_fields, Contact};
use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;

/// Contact list operations over the JSON file store.
#[derive(Clone)]
pub struct ContactsService {
    store: Arc<JsonListStore<Contact>>,
}

impl ContactsService {
    /// Open (or create) the contacts file.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let store = JsonListStore::<Contact>::new(path).await?;
        Ok(Self { store })
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ServiceError> {
        self.store.list().await
    }

    pub async fn get_contact_by_id(&self, id: &str) -> Result<Option<Contact>, ServiceError> {
        self.store.find(|c| c.id == id).await
    }

    /// Append `{ id, ...body }`; a client-supplied `id` is ignored.
    #[instrument(skip_all)]
    pub async fn add_contact(&self, body: Value) -> Result<Contact, ServiceError> {
        let contact = Contact::new(body_fields(body)?);
        let created = contact.clone();
        self.store
            .update_list(move |items| {
                items.push(contact);
                Ok((true, ()))
            })
            .await?;
        info!(id = %created.id, "contact_added");
        Ok(created)
    }

    /// Remove by id; returns the removed record. The file is not rewritten on a miss.
    #[instrument(skip(self))]
    pub async fn remove_contact(&self, id: &str) -> Result<Option<Contact>, ServiceError> {
        let removed = self
            .store
            .update_list(|items| {
                let removed = items.iter().position(|c| c.id == id).map(|idx| items.remove(idx));
                Ok((removed.is_some(), removed))
            })
            .await?;
        if removed.is_some() {
            info!("contact_removed");
        }
        Ok(removed)
    }

    /// Shallow-merge `body` into the record with `id`.
    #[instrument(skip(self, body))]
    pub async fn update_contact(&self, id: &str, body: Value) -> Result<Option<Contact>, ServiceError> {
        let patch = body_fields(body)?;
        self.store
            .update_list(|items| match items.iter_mut().find(|c| c.id == id) {
                Some(contact) => {
                    contact.merge(patch);
                    Ok((true, Some(contact.clone())))
                }
                None => Ok((false, None)),
            })
            .await
    }
}
