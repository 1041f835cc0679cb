// ==========================================
// School Infrastructure Compliance DSS - Importer Layer
// ==========================================
// Responsibility: load the externally prepared fact extracts. The
// importer never touches computed columns; the pipeline owns those.
// ==========================================

pub mod error;
pub mod fact_importer;

pub use error::{ImporterError, ImporterResult};
pub use fact_importer::{FactImporter, ImportReport};
