pub mod account;
pub mod analysis;
pub mod bill;
pub mod history;
pub mod summary;

pub use account::{find_plan, Account, PricingPlan, PRICING_PLANS};
pub use analysis::{
    AnalysisResult, AnalyzeRequest, Anomaly, ClassifiedItem, DisplayLevel, RawAnalysisResponse,
    SchemaError, Severity, WireItem,
};
pub use bill::{format_amount, BillLineItem, Category, LineItemDraft, ValidationError};
pub use history::{AnalysisStatus, HistoryRecord};
pub use summary::{BillSummary, CategoryTotal};
