//! Typed access to the singleton content document.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::content::defaults::default_document;
use crate::content::model::ContentDocument;
use crate::content::store::{DocumentCollection, StoreError};

/// Field name a client or driver may use as a document identifier.
const ID_FIELD: &str = "_id";

/// Reads, replaces and clears the one portfolio document.
#[derive(Clone)]
pub struct ContentAccessor {
    collection: Arc<dyn DocumentCollection>,
}

impl ContentAccessor {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }

    /// The stored document, if one has been written.
    pub async fn find(&self) -> Result<Option<ContentDocument>, StoreError> {
        match self.collection.find_one().await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// The stored document, or the built-in default when nothing is stored.
    pub async fn read(&self) -> Result<ContentDocument, StoreError> {
        Ok(self.find().await?.unwrap_or_else(default_document))
    }

    /// Overwrite the document, stamping `updatedAt` with the current time.
    pub async fn replace(&self, mut doc: ContentDocument) -> Result<ContentDocument, StoreError> {
        doc.updated_at = Some(Utc::now());

        let mut value = serde_json::to_value(&doc)?;
        if let Value::Object(map) = &mut value {
            map.remove(ID_FIELD);
        }

        self.collection.replace_one(value).await?;
        Ok(doc)
    }

    /// Remove every stored document. Subsequent reads return the default.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        self.collection.delete_many().await
    }
}
