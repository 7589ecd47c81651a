//! Peppol BIS Billing 3.0 mapper.

use clearbill_core::{ElectronicAddressScheme, InvoiceTypeCode, OutputFormat, TaxCategory};

use crate::en16931::En16931Mapper;
use crate::mapper::StandardMapper;

/// Peppol BIS Billing 3.0 — EN 16931 code lists with the BIS restrictions.
///
/// BIS only admits type codes 380, 381, 384, 386 and 326; debit notes and
/// self-billed invoices fall back to 380 (documented round-trip exceptions).
/// The only BIS syntax is UBL, so every output format maps to `ubl-xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeppolBisMapper {
    base: En16931Mapper,
}

impl PeppolBisMapper {
    pub fn new() -> Self {
        Self {
            base: En16931Mapper::new(),
        }
    }
}

impl StandardMapper for PeppolBisMapper {
    fn standard(&self) -> &'static str {
        "peppol-bis"
    }

    fn map_invoice_type(&self, type_code: InvoiceTypeCode) -> &'static str {
        match type_code {
            InvoiceTypeCode::Invoice
            | InvoiceTypeCode::CreditNote
            | InvoiceTypeCode::Corrected
            | InvoiceTypeCode::Prepayment
            | InvoiceTypeCode::Partial => type_code.untdid_code(),
            other => {
                tracing::warn!(?other, "invoice type not admitted by Peppol BIS, using 380");
                "380"
            }
        }
    }

    fn map_tax_category(&self, category: &TaxCategory) -> &'static str {
        self.base.map_tax_category(category)
    }

    fn map_address_scheme(&self, scheme: ElectronicAddressScheme) -> &'static str {
        self.base.map_address_scheme(scheme)
    }

    fn map_output_format(&self, format: OutputFormat) -> &'static str {
        if format != OutputFormat::UblXml {
            tracing::debug!(?format, "Peppol BIS carries UBL only, using ubl-xml");
        }
        "ubl-xml"
    }

    fn reverse_map_invoice_type(&self, code: &str) -> InvoiceTypeCode {
        self.base.reverse_map_invoice_type(code)
    }

    fn reverse_map_tax_category(&self, code: &str) -> TaxCategory {
        self.base.reverse_map_tax_category(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admitted_types_round_trip() {
        let mapper = PeppolBisMapper::new();
        for type_code in [
            InvoiceTypeCode::Invoice,
            InvoiceTypeCode::CreditNote,
            InvoiceTypeCode::Corrected,
            InvoiceTypeCode::Prepayment,
            InvoiceTypeCode::Partial,
        ] {
            assert_eq!(
                mapper.reverse_map_invoice_type(mapper.map_invoice_type(type_code)),
                type_code
            );
        }
    }

    #[test]
    fn inadmissible_types_collapse_to_380() {
        let mapper = PeppolBisMapper::new();
        assert_eq!(mapper.map_invoice_type(InvoiceTypeCode::DebitNote), "380");
        assert_eq!(mapper.map_invoice_type(InvoiceTypeCode::SelfBilled), "380");
    }

    #[test]
    fn every_format_is_carried_as_ubl() {
        let mapper = PeppolBisMapper::new();
        assert_eq!(mapper.map_output_format(OutputFormat::Pdf), "ubl-xml");
        assert_eq!(mapper.map_output_format(OutputFormat::UblXml), "ubl-xml");
    }
}
