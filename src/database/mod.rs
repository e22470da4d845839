//! Data access subsystem.
//!
//! # Data Flow
//! ```text
//! startup → Database::open (+ seed.rs when configured)
//!     → cloned handle captured by every product handler
//!     → product rows + sale rows, aggregated on read
//! ```
//!
//! # Design Decisions
//! - The handle is a cheap clone over shared concurrent maps
//! - Handlers share the handle read-only; the maps do their own locking
//! - Sales are stored as rows and summed per product on read, the way a
//!   `LEFT JOIN ... GROUP BY` would

pub mod seed;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::products::{NewProduct, Product};

/// A stored product without its sales aggregates.
#[derive(Debug, Clone)]
struct ProductRow {
    id: Uuid,
    name: String,
    cost: i64,
    quantity: i64,
    /// Insertion order, used to list products stably.
    sequence: u64,
}

/// A recorded sale of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub paid: i64,
}

/// Error type for data access.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("product {0} not found")]
    ProductNotFound(Uuid),
}

#[derive(Debug, Default)]
struct Tables {
    products: DashMap<Uuid, ProductRow>,
    sales: DashMap<Uuid, Sale>,
    sequence: AtomicU64,
}

/// Shared handle to the product and sale tables.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: Arc<Tables>,
}

impl Database {
    /// Open an empty database.
    pub fn open() -> Self {
        Self::default()
    }

    /// All products with their sales aggregates, in creation order.
    pub fn list_products(&self) -> Vec<Product> {
        let mut rows: Vec<ProductRow> = self
            .tables
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.sequence);
        rows.into_iter().map(|row| self.with_sales(row)).collect()
    }

    /// A single product with its sales aggregates.
    pub fn get_product(&self, id: Uuid) -> Option<Product> {
        let row = self.tables.products.get(&id)?.value().clone();
        Some(self.with_sales(row))
    }

    /// Insert a new product under a fresh id.
    pub fn create_product(&self, new: NewProduct) -> Product {
        self.insert_product(Uuid::new_v4(), new)
    }

    /// Insert a product under a caller-chosen id, replacing any existing row.
    pub fn insert_product(&self, id: Uuid, new: NewProduct) -> Product {
        let row = ProductRow {
            id,
            name: new.name,
            cost: new.cost,
            quantity: new.quantity,
            sequence: self.tables.sequence.fetch_add(1, Ordering::Relaxed),
        };
        self.tables.products.insert(id, row.clone());
        self.with_sales(row)
    }

    /// Record a sale against an existing product.
    pub fn add_sale(
        &self,
        id: Uuid,
        product_id: Uuid,
        quantity: i64,
        paid: i64,
    ) -> Result<Sale, DatabaseError> {
        if !self.tables.products.contains_key(&product_id) {
            return Err(DatabaseError::ProductNotFound(product_id));
        }
        let sale = Sale {
            id,
            product_id,
            quantity,
            paid,
        };
        self.tables.sales.insert(id, sale);
        Ok(sale)
    }

    /// Number of stored products.
    pub fn product_count(&self) -> usize {
        self.tables.products.len()
    }

    fn with_sales(&self, row: ProductRow) -> Product {
        let (sold, revenue) = self
            .tables
            .sales
            .iter()
            .filter(|sale| sale.product_id == row.id)
            .fold((0, 0), |(sold, revenue), sale| {
                (sold + sale.quantity, revenue + sale.paid)
            });

        Product {
            id: row.id,
            name: row.name,
            cost: row.cost,
            quantity: row.quantity,
            sold,
            revenue,
        }
    }
}
