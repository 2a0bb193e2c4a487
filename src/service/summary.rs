use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexSet;

use crate::models::{AnalysisStatus, Anomaly, BillLineItem, BillSummary, Category, CategoryTotal};

/// Totals per category and overall, plus the distinct items the analysis flagged.
pub fn summarize(
    items: &[BillLineItem],
    anomalies: &[Anomaly],
    declared_total: Option<&BigDecimal>,
) -> BillSummary {
    let grand_total = items
        .iter()
        .fold(BigDecimal::zero(), |acc, item| acc + &item.total_price);

    let subtotals = Category::ALL
        .iter()
        .map(|&category| {
            let (item_count, total) = items
                .iter()
                .filter(|i| i.category == category)
                .fold((0usize, BigDecimal::zero()), |(n, sum), i| {
                    (n + 1, sum + &i.total_price)
                });
            CategoryTotal {
                category,
                item_count,
                total,
            }
        })
        .collect();

    let flagged: IndexSet<&str> = anomalies.iter().map(|a| a.item.as_str()).collect();
    let flagged_items: Vec<String> = flagged.into_iter().map(str::to_string).collect();

    let status = if flagged_items.is_empty() {
        AnalysisStatus::Completed
    } else {
        AnalysisStatus::NeedsReview
    };

    let declared_difference = declared_total.map(|declared| declared - &grand_total);

    BillSummary {
        item_count: items.len(),
        grand_total,
        subtotals,
        flagged_count: flagged_items.len(),
        flagged_items,
        status,
        declared_total: declared_total.cloned(),
        declared_difference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DisplayLevel, Severity};
    use std::str::FromStr;

    fn item(name: &str, total: &str, category: Category) -> BillLineItem {
        let total = BigDecimal::from_str(total).unwrap();
        BillLineItem {
            name: name.to_string(),
            unit_price: total.clone(),
            quantity: 1,
            total_price: total,
            category,
        }
    }

    fn anomaly(item: &str) -> Anomaly {
        Anomaly {
            item: item.to_string(),
            severity: Severity::Medium,
            level: DisplayLevel::Warning,
            message: "Same item billed multiple times.".to_string(),
            title: Some("Duplicate charge".to_string()),
            kind: Some("D1".to_string()),
        }
    }

    #[test]
    fn empty_bill_sums_to_zero() {
        let summary = summarize(&[], &[], None);
        assert_eq!(summary.grand_total, BigDecimal::zero());
        assert_eq!(summary.flagged_count, 0);
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.status, AnalysisStatus::Completed);
        assert_eq!(summary.subtotals.len(), 3);
    }

    #[test]
    fn subtotals_partition_grand_total() {
        let items = vec![
            item("Paracetamol Tablet", "20", Category::Medicine),
            item("Cough Syrup", "85.50", Category::Medicine),
            item("Blood Test", "50", Category::Diagnostic),
            item("Consultation Fee", "200", Category::Other),
            item("Room Rent", "1499.99", Category::Other),
        ];

        let summary = summarize(&items, &[], None);
        assert_eq!(summary.grand_total, BigDecimal::from_str("1855.49").unwrap());
        assert_eq!(summary.subtotal(Category::Medicine), BigDecimal::from_str("105.5").unwrap());
        assert_eq!(summary.subtotal(Category::Diagnostic), BigDecimal::from(50));
        assert_eq!(summary.subtotal(Category::Other), BigDecimal::from_str("1699.99").unwrap());

        let sum = summary
            .subtotals
            .iter()
            .fold(BigDecimal::zero(), |acc, s| acc + &s.total);
        assert_eq!(sum, summary.grand_total);
        assert_eq!(summary.subtotals[1].item_count, 1);
    }

    #[test]
    fn flagged_items_are_distinct_and_ordered() {
        let items = vec![
            item("Syrup", "10", Category::Medicine),
            item("MRI Scan", "3000", Category::Diagnostic),
        ];
        let anomalies = vec![anomaly("MRI Scan"), anomaly("Syrup"), anomaly("MRI Scan")];

        let summary = summarize(&items, &anomalies, None);
        assert_eq!(summary.flagged_count, 2);
        assert_eq!(summary.flagged_items, ["MRI Scan", "Syrup"]);
        assert_eq!(summary.status, AnalysisStatus::NeedsReview);
    }

    #[test]
    fn declared_total_difference() {
        let items = vec![item("Consultation Fee", "200", Category::Other)];
        let declared = BigDecimal::from(250);

        let summary = summarize(&items, &[], Some(&declared));
        assert_eq!(summary.declared_total, Some(BigDecimal::from(250)));
        assert_eq!(summary.declared_difference, Some(BigDecimal::from(50)));
    }
}
