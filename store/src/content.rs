//! Content store trait and the product document stored in it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Lookup, SourceError};
use veritag_types::{ContentHash, ManufacturerId, ProductCategory, ProductSnapshot, Timestamp};

/// Content-addressed blob storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put(&self, blob: Vec<u8>) -> Result<ContentHash, SourceError>;

    async fn get(&self, hash: &ContentHash) -> Result<Lookup<Vec<u8>>, SourceError>;
}

/// Document type tag written into every product document.
pub const PRODUCT_DOCUMENT_KIND: &str = "product";

/// Current product document version.
pub const PRODUCT_DOCUMENT_VERSION: &str = "1.0";

/// The JSON document stored for a product at registration time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub product: DocumentFields,
}

/// Product fields as captured in the content store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    pub batch_number: String,
    pub category: ProductCategory,
    pub manufacturer_id: ManufacturerId,
    pub manufacturing_date: Timestamp,
}

impl ProductDocument {
    pub fn from_snapshot(snapshot: &ProductSnapshot) -> Self {
        Self {
            kind: PRODUCT_DOCUMENT_KIND.to_string(),
            version: PRODUCT_DOCUMENT_VERSION.to_string(),
            product: DocumentFields {
                product_name: snapshot.name.clone(),
                product_description: snapshot.description.clone(),
                batch_number: snapshot.batch_number.clone(),
                category: snapshot.category,
                manufacturer_id: snapshot.manufacturer_id,
                manufacturing_date: snapshot.manufacturing_date,
            },
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Names of the fields on which this document and the registry disagree.
    pub fn diverging_fields(&self, snapshot: &ProductSnapshot) -> Vec<&'static str> {
        let doc = &self.product;
        let mut fields = Vec::new();
        if doc.product_name != snapshot.name {
            fields.push("product name");
        }
        if doc.batch_number != snapshot.batch_number {
            fields.push("batch number");
        }
        if doc.product_description != snapshot.description {
            fields.push("description");
        }
        if doc.category != snapshot.category {
            fields.push("category");
        }
        if doc.manufacturer_id != snapshot.manufacturer_id {
            fields.push("manufacturer");
        }
        if doc.manufacturing_date != snapshot.manufacturing_date {
            fields.push("manufacturing date");
        }
        fields
    }
}
