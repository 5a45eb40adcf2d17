use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::cart::MAX_QUANTITY;

const MAX_QUANTITY_VALIDATOR: i64 = MAX_QUANTITY as i64;

/// Quantity used when the add-to-cart form omits it.
const DEFAULT_ADD_QUANTITY: i32 = 1;

/// Result type returned by the cart form helpers.
pub type CartFormResult<T> = Result<T, CartFormError>;

/// Errors that can occur while processing cart forms.
#[derive(Debug, Error)]
pub enum CartFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The form did not carry a quantity.
    #[error("quantity is required")]
    MissingQuantity,
    /// The quantity could not be parsed as an integer.
    #[error("invalid quantity `{value}`")]
    InvalidQuantity { value: String },
}

impl CartFormError {
    /// Field-keyed error messages suitable for a JSON `errors` payload.
    pub fn field_errors(&self) -> Value {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();

        match self {
            CartFormError::Validation(errors) => {
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|error| match &error.message {
                            Some(message) => message.to_string(),
                            None => error.code.to_string(),
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
            }
            CartFormError::MissingQuantity => {
                fields.insert("quantity".to_string(), vec!["This field is required.".to_string()]);
            }
            CartFormError::InvalidQuantity { .. } => {
                fields.insert(
                    "quantity".to_string(),
                    vec!["Enter a whole number.".to_string()],
                );
            }
        }

        serde_json::to_value(fields).unwrap_or(Value::Null)
    }
}

/// Form payload submitted by the "Add to cart" button.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    /// Requested quantity; defaults to one when omitted or blank.
    #[serde(default)]
    pub quantity: Option<String>,
}

#[derive(Debug, Validate)]
struct AddQuantity {
    #[validate(range(
        min = 1,
        max = MAX_QUANTITY_VALIDATOR,
        message = "Quantity must be between 1 and 999."
    ))]
    quantity: i64,
}

impl AddToCartForm {
    /// Validates the payload and returns the quantity to add.
    pub fn into_quantity(self) -> CartFormResult<i32> {
        let quantity = match non_blank(self.quantity) {
            Some(raw) => parse_quantity(&raw)?,
            None => return Ok(DEFAULT_ADD_QUANTITY),
        };

        let input = AddQuantity { quantity };
        input.validate()?;

        narrow(input.quantity)
    }
}

/// Form payload submitted when editing the quantity of a cart line.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCartItemForm {
    /// New quantity for the line. Zero removes the line. There is no upper
    /// bound beyond `i32`, since repeated adds may merge past the per-add cap.
    #[serde(default)]
    pub quantity: Option<String>,
}

#[derive(Debug, Validate)]
struct UpdateQuantity {
    #[validate(range(min = 0, message = "Quantity must not be negative."))]
    quantity: i64,
}

impl UpdateCartItemForm {
    /// Validates the payload and returns the replacement quantity.
    pub fn into_quantity(self) -> CartFormResult<i32> {
        let raw = non_blank(self.quantity).ok_or(CartFormError::MissingQuantity)?;

        let input = UpdateQuantity {
            quantity: parse_quantity(&raw)?,
        };
        input.validate()?;

        narrow(input.quantity)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_quantity(raw: &str) -> CartFormResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| CartFormError::InvalidQuantity {
            value: raw.to_string(),
        })
}

fn narrow(quantity: i64) -> CartFormResult<i32> {
    i32::try_from(quantity).map_err(|_| CartFormError::InvalidQuantity {
        value: quantity.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form(quantity: Option<&str>) -> AddToCartForm {
        AddToCartForm {
            quantity: quantity.map(str::to_string),
        }
    }

    fn update_form(quantity: Option<&str>) -> UpdateCartItemForm {
        UpdateCartItemForm {
            quantity: quantity.map(str::to_string),
        }
    }

    #[test]
    fn add_form_defaults_to_one() {
        assert_eq!(add_form(None).into_quantity().unwrap(), 1);
        assert_eq!(add_form(Some("  ")).into_quantity().unwrap(), 1);
    }

    #[test]
    fn add_form_accepts_trimmed_positive_quantity() {
        assert_eq!(add_form(Some(" 3 ")).into_quantity().unwrap(), 3);
    }

    #[test]
    fn add_form_rejects_zero_and_negative_quantities() {
        assert!(matches!(
            add_form(Some("0")).into_quantity(),
            Err(CartFormError::Validation(_))
        ));
        assert!(matches!(
            add_form(Some("-2")).into_quantity(),
            Err(CartFormError::Validation(_))
        ));
    }

    #[test]
    fn add_form_rejects_non_numeric_quantity() {
        match add_form(Some("two")).into_quantity() {
            Err(CartFormError::InvalidQuantity { value }) => assert_eq!(value, "two"),
            other => panic!("expected invalid quantity, got {other:?}"),
        }
    }

    #[test]
    fn add_form_rejects_quantity_above_limit() {
        assert!(matches!(
            add_form(Some("1000")).into_quantity(),
            Err(CartFormError::Validation(_))
        ));
    }

    #[test]
    fn update_form_accepts_zero() {
        assert_eq!(update_form(Some("0")).into_quantity().unwrap(), 0);
    }

    #[test]
    fn update_form_accepts_quantities_above_the_add_limit() {
        assert_eq!(update_form(Some("1998")).into_quantity().unwrap(), 1998);
        assert!(matches!(
            update_form(Some("3000000000")).into_quantity(),
            Err(CartFormError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn update_form_requires_quantity() {
        assert!(matches!(
            update_form(None).into_quantity(),
            Err(CartFormError::MissingQuantity)
        ));
    }

    #[test]
    fn update_form_rejects_negative_and_fractional_values() {
        assert!(matches!(
            update_form(Some("-1")).into_quantity(),
            Err(CartFormError::Validation(_))
        ));
        assert!(matches!(
            update_form(Some("2.5")).into_quantity(),
            Err(CartFormError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn field_errors_are_keyed_by_field() {
        let err = add_form(Some("0")).into_quantity().unwrap_err();
        let errors = err.field_errors();

        let messages = errors
            .get("quantity")
            .and_then(Value::as_array)
            .expect("quantity errors");
        assert_eq!(
            messages[0].as_str(),
            Some("Quantity must be between 1 and 999.")
        );

        let err = update_form(Some("abc")).into_quantity().unwrap_err();
        assert!(err.field_errors().get("quantity").is_some());
    }
}
