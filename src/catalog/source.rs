//! Snapshot sources
//!
//! The engine never fetches records itself. A [`SnapshotSource`] hands it a
//! consistent [`Catalog`] at the start of a request; failures here are data
//! access errors, never "zero results".

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::CatalogError;
use super::snapshot::Catalog;
use super::types::{Category, Product, ProductTag, Supplier, Tag};

/// Snapshot loading errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Backing store could not be read
    #[error("Snapshot unavailable: {0}")]
    Unavailable(String),

    /// Snapshot content is not a valid document
    #[error("Snapshot malformed: {0}")]
    Malformed(String),

    /// Snapshot content breaks a catalog invariant
    #[error("Snapshot inconsistent: {0}")]
    Inconsistent(#[from] CatalogError),
}

/// Provides the record snapshot for one request
pub trait SnapshotSource {
    fn load(&self) -> Result<Arc<Catalog>, SourceError>;
}

/// Serialized form of a full catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub product_tags: Vec<ProductTag>,
}

impl CatalogDocument {
    /// Builds a catalog, enforcing every invariant
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let mut builder = Catalog::builder();
        for tag in self.tags {
            builder.tag(tag)?;
        }
        for supplier in self.suppliers {
            builder.supplier(supplier)?;
        }
        for category in self.categories {
            builder.category(category)?;
        }
        for product in self.products {
            builder.product(product)?;
        }
        for link in self.product_tags {
            builder.link(link.product_id, link.tag_id)?;
        }
        builder.build()
    }

    /// Captures a catalog back into document form
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            tags: catalog.tags().to_vec(),
            suppliers: catalog.suppliers().to_vec(),
            categories: catalog.categories().to_vec(),
            products: catalog.products().to_vec(),
            product_tags: catalog.product_tags().to_vec(),
        }
    }
}

/// Serves an already-built catalog; every load shares the same snapshot
#[derive(Debug, Clone)]
pub struct MemorySource {
    catalog: Arc<Catalog>,
}

impl MemorySource {
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }
}

impl SnapshotSource for MemorySource {
    fn load(&self) -> Result<Arc<Catalog>, SourceError> {
        Ok(Arc::clone(&self.catalog))
    }
}

/// Reads a [`CatalogDocument`] from a JSON file on every load
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonFileSource {
    fn load(&self) -> Result<Arc<Catalog>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            SourceError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let document: CatalogDocument = serde_json::from_str(&content)
            .map_err(|e| SourceError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        Ok(Arc::new(document.into_catalog()?))
    }
}
