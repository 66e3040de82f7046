//! Product and manufacturer records as the registry exposes them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::hash::ContentHash;
use crate::time::Timestamp;
use crate::TypesError;

/// Registry identifier of a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry identifier of a manufacturer account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManufacturerId(u64);

impl ManufacturerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ManufacturerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the ledger assigned when the product was registered on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerId(u64);

impl LedgerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Pharmaceuticals,
    Electronics,
    LuxuryGoods,
    Clothing,
    Food,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pharmaceuticals => "pharmaceuticals",
            Self::Electronics => "electronics",
            Self::LuxuryGoods => "luxury_goods",
            Self::Clothing => "clothing",
            Self::Food => "food",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pharmaceuticals" => Ok(Self::Pharmaceuticals),
            "electronics" => Ok(Self::Electronics),
            "luxury_goods" => Ok(Self::LuxuryGoods),
            "clothing" => Ok(Self::Clothing),
            "food" => Ok(Self::Food),
            "other" => Ok(Self::Other),
            other => Err(TypesError::UnknownCategory(other.to_string())),
        }
    }
}

/// Canonical product fields owned by the product registry.
///
/// The verification engine only ever reads a snapshot; it is taken once per
/// attempt and shared read-only between all checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub manufacturing_date: Timestamp,
    pub batch_number: String,
    pub category: ProductCategory,
    pub manufacturer_id: ManufacturerId,
    /// QR hash assigned at creation (SHA-256 hex).
    pub qr_hash: String,
    /// Address of the product document in the content store, if it was stored.
    #[serde(default)]
    pub content_hash: Option<ContentHash>,
    /// Ledger id, if the product was registered on the ledger.
    #[serde(default)]
    pub ledger_id: Option<LedgerId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A manufacturer account as seen by the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub is_active: bool,
    /// Trust flag: set once the manufacturer's credentials have been checked.
    pub is_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "Luxury_Goods".parse::<ProductCategory>(),
            Ok(ProductCategory::LuxuryGoods)
        );
        assert!("weapons".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn snapshot_defaults_optional_fields() {
        let json = r#"{
            "id": 7,
            "name": "Aspirin",
            "manufacturing_date": 1700000000,
            "batch_number": "B-100",
            "category": "pharmaceuticals",
            "manufacturer_id": 3,
            "qr_hash": "00"
        }"#;
        let snapshot: ProductSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.id, ProductId::new(7));
        assert!(snapshot.is_active);
        assert!(snapshot.content_hash.is_none());
        assert!(snapshot.ledger_id.is_none());
        assert!(snapshot.description.is_empty());
    }
}
