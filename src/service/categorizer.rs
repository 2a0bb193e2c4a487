use crate::models::{BillLineItem, Category, LineItemDraft, ValidationError};

const MEDICINE_KEYWORDS: &[&str] = &["tablet", "capsule", "syrup", "injection", "medicine"];

const DIAGNOSTIC_KEYWORDS: &[&str] = &[
    "test",
    "scan",
    "x-ray",
    "blood",
    "urine",
    "ultrasound",
    "mri",
    "ct",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Guess a category from the item name. Medicine keywords are checked first,
/// so a name matching both lexicons is medicine. Plain substring match.
pub fn infer_category(name: &str) -> Category {
    let name = name.to_lowercase();

    if contains_any(&name, MEDICINE_KEYWORDS) {
        Category::Medicine
    } else if contains_any(&name, DIAGNOSTIC_KEYWORDS) {
        Category::Diagnostic
    } else {
        Category::Other
    }
}

/// Drop blank rows, then validate and categorize the rest in entry order.
pub fn categorize(drafts: &[LineItemDraft]) -> Result<Vec<BillLineItem>, ValidationError> {
    let items = drafts
        .iter()
        .filter(|d| !d.is_blank())
        .map(|d| BillLineItem::from_draft(d, infer_category))
        .collect::<Result<Vec<_>, _>>()?;

    let skipped = drafts.len() - items.len();
    if skipped > 0 {
        tracing::debug!("Dropped {} blank bill rows", skipped);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[test]
    fn medicine_keywords() {
        for name in ["Paracetamol Tablet", "Amoxicillin CAPSULE", "cough syrup", "Insulin Injection", "Medicine charges"] {
            assert_eq!(infer_category(name), Category::Medicine, "{name}");
        }
    }

    #[test]
    fn diagnostic_keywords() {
        for name in ["Blood Test", "Chest X-Ray", "Urine routine", "Ultrasound abdomen", "MRI brain", "CT head", "Thyroid scan"] {
            assert_eq!(infer_category(name), Category::Diagnostic, "{name}");
        }
    }

    #[test]
    fn medicine_wins_over_diagnostic() {
        assert_eq!(infer_category("Test dose injection"), Category::Medicine);
        assert_eq!(infer_category("Blood thinner tablet"), Category::Medicine);
    }

    #[test]
    fn everything_else_is_other() {
        for name in ["Consultation Fee", "Room Rent", "Nursing charges", ""] {
            assert_eq!(infer_category(name), Category::Other, "{name}");
        }
    }

    #[test]
    fn blank_rows_are_dropped() {
        let drafts = vec![
            LineItemDraft::new("Paracetamol Tablet", BigDecimal::from(10), 2),
            LineItemDraft::new("   ", BigDecimal::from(99), 1),
            LineItemDraft::default(),
            LineItemDraft::new("Blood Test", BigDecimal::from(50), 1),
        ];

        let items = categorize(&drafts).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Paracetamol Tablet", "Blood Test"]);
        assert_eq!(items[0].category, Category::Medicine);
        assert_eq!(items[0].total_price, BigDecimal::from(20));
        assert_eq!(items[1].category, Category::Diagnostic);
    }

    #[test]
    fn invalid_row_fails_the_batch() {
        let drafts = vec![
            LineItemDraft::new("Consultation Fee", BigDecimal::from(200), 1),
            LineItemDraft::new("Bandage", BigDecimal::from(5), 0),
        ];
        assert!(categorize(&drafts).is_err());
    }
}
