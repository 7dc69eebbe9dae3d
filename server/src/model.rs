//! Record shape and create-time validation.
//!
//! `CreateItem` is the statically declared input schema. Every field is read
//! leniently (a missing `name` deserializes to `None`) so that `validate` can
//! report *which* field is wrong instead of a generic parse failure.

use serde::{Deserialize, Serialize};

pub const NAME_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// One row of the `items` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// Body of `POST /items` as received.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// A create request that passed validation and may be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: Option<i64>,
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl CreateItem {
    /// Check field constraints in declaration order; the first violation wins.
    pub fn validate(self) -> Result<NewItem, FieldError> {
        let name = self
            .name
            .ok_or_else(|| FieldError::new("name", "is required"))?;
        if name.trim().is_empty() {
            return Err(FieldError::new("name", "must not be blank"));
        }
        if name.chars().count() > NAME_MAX_CHARS {
            return Err(FieldError::new(
                "name",
                format!("must be at most {NAME_MAX_CHARS} characters"),
            ));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_CHARS {
                return Err(FieldError::new(
                    "description",
                    format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
                ));
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(FieldError::new("quantity", "must not be negative"));
            }
        }
        Ok(NewItem {
            name,
            description: self.description,
            quantity: self.quantity,
        })
    }
}
