//! Development data set.

use uuid::{uuid, Uuid};

use crate::database::{Database, DatabaseError};
use crate::products::NewProduct;

const COMIC_BOOKS: Uuid = uuid!("a2b0639f-2cc6-44b8-b97b-15d69dbb511e");
const MCDONALDS_TOYS: Uuid = uuid!("72f8b983-3eb4-48db-9ed0-e45cc6bd716b");

/// (sale id, product id, quantity, paid)
const SALES: [(Uuid, Uuid, i64, i64); 3] = [
    (uuid!("98b6d4b8-f04b-4c79-8c2e-a0aef46854b7"), COMIC_BOOKS, 2, 100),
    (uuid!("85f6fb09-eb05-4874-ae39-82d1a30fe0d7"), COMIC_BOOKS, 5, 250),
    (uuid!("a235be9e-ab5d-44e6-a987-fa1c749264c7"), MCDONALDS_TOYS, 3, 225),
];

/// Load the fixed development products and sales.
pub fn seed(db: &Database) -> Result<(), DatabaseError> {
    db.insert_product(
        COMIC_BOOKS,
        NewProduct {
            name: "Comic Books".into(),
            cost: 50,
            quantity: 42,
        },
    );
    db.insert_product(
        MCDONALDS_TOYS,
        NewProduct {
            name: "McDonalds Toys".into(),
            cost: 75,
            quantity: 120,
        },
    );

    for (id, product_id, quantity, paid) in SALES {
        db.add_sale(id, product_id, quantity, paid)?;
    }

    tracing::info!(products = db.product_count(), sales = SALES.len(), "Database seeded");
    Ok(())
}
