//! Output generation boundary.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainResult, OutputFormat};

use crate::invoice::Invoice;

/// A rendered invoice document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Serialization collaborator (UBL, CII, Facturae, FatturaPA, PDF/hybrid).
///
/// Implemented outside the domain core; `Invoice::generate_output` enforces
/// the FINALIZED gate before delegating here, so implementations may assume a
/// complete, arithmetically consistent document.
pub trait FormatService {
    fn render(&self, invoice: &Invoice, format: OutputFormat) -> DomainResult<Document>;
}
