use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::bill::{BillLineItem, Category};

/// Line item as the analysis endpoint expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireItem {
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

impl From<&BillLineItem> for WireItem {
    fn from(item: &BillLineItem) -> Self {
        Self {
            item_name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_f64().unwrap_or_default(),
            total_price: item.total_price.to_f64().unwrap_or_default(),
        }
    }
}

/// Request body for `POST /analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub items: Vec<WireItem>,
}

/// Anomaly severity tag as reported by the analysis endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
    #[serde(other)]
    Unknown,
}

/// How an anomaly is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLevel {
    Alert,
    Warning,
    Info,
}

impl Severity {
    pub fn display_level(&self) -> DisplayLevel {
        match self {
            Severity::High => DisplayLevel::Alert,
            Severity::Medium => DisplayLevel::Warning,
            Severity::Low | Severity::Info | Severity::Unknown => DisplayLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub item_name: String,
    pub quantity: Option<BigDecimal>,
    pub unit_price: Option<BigDecimal>,
    pub total_price: Option<BigDecimal>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub item: String,
    pub severity: Severity,
    pub level: DisplayLevel,
    pub message: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Validated analysis reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub classified_items: Vec<ClassifiedItem>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("classified item #{index} has no item_name")]
    MissingItemName { index: usize },

    #[error("anomaly #{index} does not reference an item")]
    MissingAnomalyItem { index: usize },

    #[error("anomaly #{index} has no issue, explanation or title")]
    MissingAnomalyMessage { index: usize },
}

/// Reply exactly as it comes off the wire. Field presence varies across
/// endpoint revisions, so everything is optional until `validate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysisResponse {
    #[serde(default)]
    pub classified_items: Vec<RawClassifiedItem>,
    #[serde(default)]
    pub anomalies: Vec<RawAnomaly>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassifiedItem {
    pub item_name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnomaly {
    pub item: Option<String>,
    pub severity: Option<Severity>,
    pub issue: Option<String>,
    pub explanation: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn decimal(value: Option<f64>) -> Option<BigDecimal> {
    value.and_then(BigDecimal::from_f64).map(|d| d.normalized())
}

impl RawAnalysisResponse {
    pub fn validate(self) -> Result<AnalysisResult, SchemaError> {
        let classified_items = self
            .classified_items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| -> Result<ClassifiedItem, SchemaError> {
                let item_name =
                    non_empty(raw.item_name).ok_or(SchemaError::MissingItemName { index })?;
                Ok(ClassifiedItem {
                    item_name,
                    quantity: decimal(raw.quantity),
                    unit_price: decimal(raw.unit_price),
                    total_price: decimal(raw.total_price),
                    category: raw.category.as_deref().map(Category::from_label),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let anomalies = self
            .anomalies
            .into_iter()
            .enumerate()
            .map(|(index, raw)| -> Result<Anomaly, SchemaError> {
                let item = non_empty(raw.item).ok_or(SchemaError::MissingAnomalyItem { index })?;
                let title = non_empty(raw.title);
                let message = non_empty(raw.issue)
                    .or_else(|| non_empty(raw.explanation))
                    .or_else(|| title.clone())
                    .ok_or(SchemaError::MissingAnomalyMessage { index })?;
                let severity = raw.severity.unwrap_or(Severity::Unknown);
                Ok(Anomaly {
                    item,
                    severity,
                    level: severity.display_level(),
                    message,
                    title,
                    kind: non_empty(raw.kind),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AnalysisResult {
            classified_items,
            anomalies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<AnalysisResult, SchemaError> {
        serde_json::from_value::<RawAnalysisResponse>(value)
            .unwrap()
            .validate()
    }

    #[test]
    fn message_prefers_issue_then_explanation_then_title() {
        let result = parse(json!({
            "classified_items": [],
            "anomalies": [
                { "item": "A", "severity": "low", "issue": "issue text", "explanation": "x", "title": "t" },
                { "item": "B", "severity": "medium", "explanation": "explained", "title": "Duplicate charge", "type": "D1" },
                { "item": "C", "severity": "high", "title": "Price above MRP" }
            ]
        }))
        .unwrap();

        let messages: Vec<_> = result.anomalies.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, ["issue text", "explained", "Price above MRP"]);
        assert_eq!(result.anomalies[1].kind.as_deref(), Some("D1"));
        assert_eq!(result.anomalies[1].title.as_deref(), Some("Duplicate charge"));
    }

    #[test]
    fn severity_maps_to_display_level() {
        assert_eq!(Severity::High.display_level(), DisplayLevel::Alert);
        assert_eq!(Severity::Medium.display_level(), DisplayLevel::Warning);
        assert_eq!(Severity::Low.display_level(), DisplayLevel::Info);
        assert_eq!(Severity::Info.display_level(), DisplayLevel::Info);

        let result = parse(json!({
            "anomalies": [{ "item": "X", "severity": "critical", "title": "?" }]
        }))
        .unwrap();
        assert_eq!(result.anomalies[0].severity, Severity::Unknown);
        assert_eq!(result.anomalies[0].level, DisplayLevel::Info);
    }

    #[test]
    fn anomaly_without_message_is_rejected() {
        let err = parse(json!({
            "anomalies": [{ "item": "X", "severity": "high" }]
        }))
        .unwrap_err();
        assert_eq!(err, SchemaError::MissingAnomalyMessage { index: 0 });
    }

    #[test]
    fn classified_item_needs_a_name() {
        let err = parse(json!({
            "classified_items": [{ "item_name": "", "quantity": 1 }]
        }))
        .unwrap_err();
        assert_eq!(err, SchemaError::MissingItemName { index: 0 });
    }

    #[test]
    fn classified_item_categories_are_folded() {
        let result = parse(json!({
            "classified_items": [
                { "item_name": "ICU Room", "quantity": 2, "unit_price": 1500.0, "total_price": 3000.0, "category": "room" },
                { "item_name": "Syrup", "category": "medicine" }
            ]
        }))
        .unwrap();
        assert_eq!(result.classified_items[0].category, Some(Category::Other));
        assert_eq!(result.classified_items[0].total_price, Some(BigDecimal::from(3000)));
        assert_eq!(result.classified_items[1].category, Some(Category::Medicine));
        assert_eq!(result.classified_items[1].quantity, None);
    }

    #[test]
    fn classified_amounts_are_normalized() {
        let result = parse(json!({
            "classified_items": [{ "item_name": "Syrup", "unit_price": 12.3, "total_price": 36.9 }]
        }))
        .unwrap();
        let value = serde_json::to_value(&result.classified_items[0]).unwrap();
        assert_eq!(value["unit_price"], "12.3");
        assert_eq!(value["total_price"], "36.9");
    }

    #[test]
    fn wire_item_carries_numbers() {
        let item = BillLineItem {
            name: "Blood Test".to_string(),
            unit_price: BigDecimal::from(50),
            quantity: 1,
            total_price: BigDecimal::from(50),
            category: Category::Diagnostic,
        };
        let value = serde_json::to_value(WireItem::from(&item)).unwrap();
        assert_eq!(
            value,
            json!({ "item_name": "Blood Test", "quantity": 1, "unit_price": 50.0, "total_price": 50.0 })
        );
    }
}
