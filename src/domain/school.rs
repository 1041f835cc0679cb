// ==========================================
// School Infrastructure Compliance DSS - School Reference Entity
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// School - identity record
// ==========================================
// Immutable reference data, created once by ingestion.
// school_category encodes the grade span (1-11) and selects the
// capacity norms; unmapped categories fall back to the most
// conservative norm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub school_id: String,
    pub school_name: String,
    pub district: String,
    pub block: Option<String>,
    pub school_category: i64,
    pub management_type: Option<String>,
}
