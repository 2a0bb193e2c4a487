use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::models::bill::Category;
use crate::models::history::AnalysisStatus;

/// Subtotal of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub item_count: usize,
    pub total: BigDecimal,
}

/// Derived figures shown next to the anomaly list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    pub item_count: usize,
    pub grand_total: BigDecimal,
    /// Always one entry per category, in `Category::ALL` order
    pub subtotals: Vec<CategoryTotal>,
    pub flagged_count: usize,
    pub flagged_items: Vec<String>,
    pub status: AnalysisStatus,
    pub declared_total: Option<BigDecimal>,
    /// `declared_total - grand_total`
    pub declared_difference: Option<BigDecimal>,
}

impl BillSummary {
    pub fn subtotal(&self, category: Category) -> BigDecimal {
        self.subtotals
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.total.clone())
            .unwrap_or_else(BigDecimal::zero)
    }
}
