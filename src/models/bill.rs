use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse line item classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medicine,
    Diagnostic,
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Medicine, Category::Diagnostic, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Medicine => "medicine",
            Category::Diagnostic => "diagnostic",
            Category::Other => "other",
        }
    }

    /// Labels outside the three known categories (the analysis endpoint also
    /// emits `room` and `procedure`) fold into `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "medicine" => Category::Medicine,
            "diagnostic" => Category::Diagnostic,
            _ => Category::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("item '{name}': unit price must not be negative")]
    NegativeUnitPrice { name: String },

    #[error("item '{name}': total price must not be negative")]
    NegativeTotalPrice { name: String },

    #[error("item '{name}': quantity must be at least 1, got {quantity}")]
    InvalidQuantity { name: String, quantity: i64 },

    #[error("line {index} does not exist")]
    UnknownLine { index: usize },
}

/// One row of the bill entry form, as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemDraft {
    #[serde(default, alias = "item_name")]
    pub name: String,
    #[serde(default)]
    pub unit_price: Option<BigDecimal>,
    /// Signed so that negative input reaches validation
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Entered by hand; derived from price and quantity when absent
    #[serde(default)]
    pub total_price: Option<BigDecimal>,
    /// User override of the inferred category
    #[serde(default)]
    pub category: Option<Category>,
}

impl LineItemDraft {
    pub fn new(name: impl Into<String>, unit_price: BigDecimal, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price: Some(unit_price),
            quantity: Some(i64::from(quantity)),
            ..Default::default()
        }
    }

    /// Rows the user left without a name never reach submission.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// A validated, categorized bill line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillLineItem {
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: u32,
    pub total_price: BigDecimal,
    pub category: Category,
}

impl BillLineItem {
    /// Validate a draft, default the quantity to 1, derive the total and pick
    /// a category. `infer` is only consulted when the draft carries no override.
    pub fn from_draft(
        draft: &LineItemDraft,
        infer: impl Fn(&str) -> Category,
    ) -> Result<Self, ValidationError> {
        let name = draft.name.trim().to_string();
        let unit_price = draft
            .unit_price
            .as_ref()
            .map(BigDecimal::normalized)
            .unwrap_or_else(BigDecimal::zero);
        if unit_price < BigDecimal::zero() {
            return Err(ValidationError::NegativeUnitPrice { name });
        }

        let requested = draft.quantity.unwrap_or(1);
        let quantity = match u32::try_from(requested) {
            Ok(q) if q >= 1 => q,
            _ => {
                return Err(ValidationError::InvalidQuantity {
                    name,
                    quantity: requested,
                })
            }
        };

        let total_price = match &draft.total_price {
            Some(total) if *total < BigDecimal::zero() => {
                return Err(ValidationError::NegativeTotalPrice { name });
            }
            Some(total) => total.normalized(),
            None => &unit_price * BigDecimal::from(quantity),
        };

        let category = draft.category.unwrap_or_else(|| infer(&name));

        Ok(Self {
            name,
            unit_price,
            quantity,
            total_price,
            category,
        })
    }

    pub fn computed_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// Two-decimal rendering used for every amount shown to the user
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}
