//! The per-standard code mapping contract.

use clearbill_core::{ElectronicAddressScheme, InvoiceTypeCode, OutputFormat, TaxCategory};

/// Bidirectional code mapping between the canonical domain vocabulary and one
/// target standard.
///
/// Forward mappings are total: implementations return their documented
/// default code (and log the fallback) for values the standard cannot
/// express. Reverse mappings of unknown codes return
/// `InvoiceTypeCode::Invoice` / `TaxCategory::Standard`.
pub trait StandardMapper: Send + Sync {
    /// Stable registry key of the standard (e.g. `"en16931"`).
    fn standard(&self) -> &'static str;

    fn map_invoice_type(&self, type_code: InvoiceTypeCode) -> &'static str;

    fn map_tax_category(&self, category: &TaxCategory) -> &'static str;

    fn map_address_scheme(&self, scheme: ElectronicAddressScheme) -> &'static str;

    fn map_output_format(&self, format: OutputFormat) -> &'static str;

    fn reverse_map_invoice_type(&self, code: &str) -> InvoiceTypeCode;

    fn reverse_map_tax_category(&self, code: &str) -> TaxCategory;
}
