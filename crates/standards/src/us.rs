//! US-style mapper.

use clearbill_core::{ElectronicAddressScheme, InvoiceTypeCode, OutputFormat, TaxCategory};

use crate::mapper::StandardMapper;

/// US-style invoicing codes (sales tax, no VAT).
///
/// Round-trip exceptions: corrected, self-billed, prepayment and partial
/// invoices collapse to `INV`; reduced/special/reverse-charge categories have
/// no US counterpart and collapse to `TAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsStandardMapper;

impl UsStandardMapper {
    pub fn new() -> Self {
        Self
    }
}

impl StandardMapper for UsStandardMapper {
    fn standard(&self) -> &'static str {
        "us"
    }

    fn map_invoice_type(&self, type_code: InvoiceTypeCode) -> &'static str {
        match type_code {
            InvoiceTypeCode::Invoice => "INV",
            InvoiceTypeCode::CreditNote => "CM",
            InvoiceTypeCode::DebitNote => "DM",
            other => {
                tracing::debug!(?other, "no US document type, using INV");
                "INV"
            }
        }
    }

    fn map_tax_category(&self, category: &TaxCategory) -> &'static str {
        match category {
            TaxCategory::Standard => "TAX",
            TaxCategory::Zero => "ZERO",
            TaxCategory::Exempt => "EXEMPT",
            TaxCategory::NotApplicable => "NONTAX",
            other => {
                tracing::debug!(category = other.as_str(), "no US tax category, using TAX");
                "TAX"
            }
        }
    }

    fn map_address_scheme(&self, scheme: ElectronicAddressScheme) -> &'static str {
        match scheme {
            ElectronicAddressScheme::Email => "EM",
            ElectronicAddressScheme::Gln => "0088",
            ElectronicAddressScheme::Duns => "0060",
            // Taxpayer identification number stands in for VAT registration.
            ElectronicAddressScheme::VatNumber => "TIN",
        }
    }

    fn map_output_format(&self, format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::UblXml => "ubl-xml",
            OutputFormat::CiiXml => "cii-xml",
            OutputFormat::Pdf | OutputFormat::HybridPdf => "pdf",
            other => {
                tracing::debug!(?other, "no US rendition for format, using pdf");
                "pdf"
            }
        }
    }

    fn reverse_map_invoice_type(&self, code: &str) -> InvoiceTypeCode {
        match code {
            "INV" => InvoiceTypeCode::Invoice,
            "CM" => InvoiceTypeCode::CreditNote,
            "DM" => InvoiceTypeCode::DebitNote,
            other => {
                tracing::debug!(code = other, "unknown US document type, using INV");
                InvoiceTypeCode::Invoice
            }
        }
    }

    fn reverse_map_tax_category(&self, code: &str) -> TaxCategory {
        match code {
            "TAX" => TaxCategory::Standard,
            "ZERO" => TaxCategory::Zero,
            "EXEMPT" => TaxCategory::Exempt,
            "NONTAX" => TaxCategory::NotApplicable,
            other => {
                tracing::debug!(code = other, "unknown US tax category, using TAX");
                TaxCategory::Standard
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_document_types_round_trip() {
        let mapper = UsStandardMapper::new();
        for type_code in [
            InvoiceTypeCode::Invoice,
            InvoiceTypeCode::CreditNote,
            InvoiceTypeCode::DebitNote,
        ] {
            assert_eq!(
                mapper.reverse_map_invoice_type(mapper.map_invoice_type(type_code)),
                type_code
            );
        }
    }

    #[test]
    fn european_specialities_collapse_to_inv() {
        let mapper = UsStandardMapper::new();
        assert_eq!(mapper.map_invoice_type(InvoiceTypeCode::Corrected), "INV");
        assert_eq!(mapper.map_invoice_type(InvoiceTypeCode::SelfBilled), "INV");
    }

    #[test]
    fn vat_only_categories_collapse_to_tax() {
        let mapper = UsStandardMapper::new();
        assert_eq!(mapper.map_tax_category(&TaxCategory::ReverseCharge), "TAX");
        assert_eq!(mapper.map_tax_category(&TaxCategory::Export), "TAX");
    }
}
