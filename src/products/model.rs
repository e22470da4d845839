//! Product types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::{FieldError, WebError};

/// An item for sale, with totals from its recorded sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub cost: i64,
    pub quantity: i64,
    pub sold: i64,
    pub revenue: i64,
}

/// What a client sends to create a product.
///
/// Missing fields decode to their zero value and are caught by [`NewProduct::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub name: String,
    pub cost: i64,
    pub quantity: i64,
}

impl NewProduct {
    /// Check every field, reporting all violations at once.
    pub fn validate(&self) -> Result<(), WebError> {
        let mut fields = Vec::new();

        if self.name.trim().is_empty() {
            fields.push(FieldError::new("name", "name is a required field"));
        }
        if self.cost < 0 {
            fields.push(FieldError::new("cost", "cost must be 0 or greater"));
        }
        if self.quantity < 1 {
            fields.push(FieldError::new("quantity", "quantity must be 1 or greater"));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(WebError::bad_request("field validation error").with_fields(fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_product_passes() {
        let new = NewProduct {
            name: "Comic Books".into(),
            cost: 0,
            quantity: 1,
        };
        assert!(new.validate().is_ok());
    }

    #[test]
    fn empty_body_reports_name_and_quantity() {
        let new: NewProduct = serde_json::from_str("{}").unwrap();
        let err = new.validate().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["name", "quantity"]);
    }

    #[test]
    fn negative_cost_and_blank_name_rejected() {
        let new = NewProduct {
            name: "   ".into(),
            cost: -1,
            quantity: 3,
        };
        let err = new.validate().unwrap_err();
        assert_eq!(err.fields().len(), 2);
        assert_eq!(err.message(), "field validation error");
    }
}
