//! Canonical code enumerations shared by the aggregates, the mapping layer
//! and the validation pipeline.
//!
//! These are the *domain* vocabulary; per-standard wire codes (UNTDID 1001,
//! UNCL5305, EAS, …) are produced by the mapping layer.

use serde::{Deserialize, Serialize};

/// Document type of an invoice (UNTDID 1001 subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceTypeCode {
    /// Commercial invoice (380).
    Invoice,
    /// Credit note (381).
    CreditNote,
    /// Debit note (383).
    DebitNote,
    /// Corrected invoice (384).
    Corrected,
    /// Prepayment invoice (386).
    Prepayment,
    /// Self-billed invoice (389).
    SelfBilled,
    /// Partial invoice (326).
    Partial,
}

impl InvoiceTypeCode {
    /// The UNTDID 1001 numeric code.
    pub fn untdid_code(&self) -> &'static str {
        match self {
            InvoiceTypeCode::Invoice => "380",
            InvoiceTypeCode::CreditNote => "381",
            InvoiceTypeCode::DebitNote => "383",
            InvoiceTypeCode::Corrected => "384",
            InvoiceTypeCode::Prepayment => "386",
            InvoiceTypeCode::SelfBilled => "389",
            InvoiceTypeCode::Partial => "326",
        }
    }

    pub fn from_untdid(code: &str) -> Option<Self> {
        match code {
            "380" => Some(InvoiceTypeCode::Invoice),
            "381" => Some(InvoiceTypeCode::CreditNote),
            "383" => Some(InvoiceTypeCode::DebitNote),
            "384" => Some(InvoiceTypeCode::Corrected),
            "386" => Some(InvoiceTypeCode::Prepayment),
            "389" => Some(InvoiceTypeCode::SelfBilled),
            "326" => Some(InvoiceTypeCode::Partial),
            _ => None,
        }
    }

    /// Whether amounts on this document credit the buyer.
    pub fn is_credit(&self) -> bool {
        matches!(self, InvoiceTypeCode::CreditNote)
    }
}

/// Output serialization requested from the format collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// UBL 2.1 XML.
    UblXml,
    /// UN/CEFACT Cross-Industry Invoice XML.
    CiiXml,
    /// Spanish Facturae XML.
    Facturae,
    /// Italian FatturaPA XML.
    FatturaPa,
    /// Plain PDF rendering.
    Pdf,
    /// Hybrid PDF with embedded XML (ZUGFeRD/Factur-X style).
    HybridPdf,
}

/// Scheme of an electronic address (EAS code family).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectronicAddressScheme {
    /// Plain e-mail endpoint (EAS "EM").
    Email,
    /// GS1 Global Location Number (EAS 0088).
    Gln,
    /// Dun & Bradstreet DUNS number (EAS 0060).
    Duns,
    /// National VAT registration number.
    VatNumber,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untdid_codes_round_trip() {
        for code in [
            InvoiceTypeCode::Invoice,
            InvoiceTypeCode::CreditNote,
            InvoiceTypeCode::DebitNote,
            InvoiceTypeCode::Corrected,
            InvoiceTypeCode::Prepayment,
            InvoiceTypeCode::SelfBilled,
            InvoiceTypeCode::Partial,
        ] {
            assert_eq!(InvoiceTypeCode::from_untdid(code.untdid_code()), Some(code));
        }
        assert_eq!(InvoiceTypeCode::from_untdid("999"), None);
    }
}
