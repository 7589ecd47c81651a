//! EN 16931 core mapper (UNTDID 1001 / UNCL5305 / EAS code lists).

use clearbill_core::{ElectronicAddressScheme, InvoiceTypeCode, OutputFormat, TaxCategory};

use crate::mapper::StandardMapper;

/// The European semantic model itself — the registry default.
///
/// Round-trip exceptions: `Reduced` shares the `S` category code with
/// `Standard` (EN 16931 distinguishes them by rate, not code) and custom
/// categories fall back to `S`; both reverse-map to `Standard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct En16931Mapper;

impl En16931Mapper {
    pub fn new() -> Self {
        Self
    }
}

impl StandardMapper for En16931Mapper {
    fn standard(&self) -> &'static str {
        "en16931"
    }

    fn map_invoice_type(&self, type_code: InvoiceTypeCode) -> &'static str {
        type_code.untdid_code()
    }

    fn map_tax_category(&self, category: &TaxCategory) -> &'static str {
        match category {
            TaxCategory::Standard => "S",
            TaxCategory::Reduced => "S",
            TaxCategory::Zero => "Z",
            TaxCategory::Exempt => "E",
            TaxCategory::ReverseCharge => "AE",
            TaxCategory::Export => "G",
            TaxCategory::NotApplicable => "O",
            TaxCategory::Special => "L",
            TaxCategory::Custom(code) => {
                tracing::debug!(code = %code, "no UNCL5305 code for custom tax category, using S");
                "S"
            }
        }
    }

    fn map_address_scheme(&self, scheme: ElectronicAddressScheme) -> &'static str {
        match scheme {
            ElectronicAddressScheme::Email => "EM",
            ElectronicAddressScheme::Gln => "0088",
            ElectronicAddressScheme::Duns => "0060",
            ElectronicAddressScheme::VatNumber => "9930",
        }
    }

    fn map_output_format(&self, format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::UblXml => "ubl-xml",
            OutputFormat::CiiXml => "cii-xml",
            OutputFormat::HybridPdf => "hybrid-pdf",
            other => {
                tracing::debug!(?other, "format is not an EN 16931 syntax, using ubl-xml");
                "ubl-xml"
            }
        }
    }

    fn reverse_map_invoice_type(&self, code: &str) -> InvoiceTypeCode {
        InvoiceTypeCode::from_untdid(code).unwrap_or_else(|| {
            tracing::debug!(code, "unknown UNTDID 1001 code, using 380");
            InvoiceTypeCode::Invoice
        })
    }

    fn reverse_map_tax_category(&self, code: &str) -> TaxCategory {
        match code {
            "S" => TaxCategory::Standard,
            "Z" => TaxCategory::Zero,
            "E" => TaxCategory::Exempt,
            "AE" => TaxCategory::ReverseCharge,
            "G" | "K" => TaxCategory::Export,
            "O" => TaxCategory::NotApplicable,
            "L" | "M" => TaxCategory::Special,
            other => {
                tracing::debug!(code = other, "unknown UNCL5305 code, using S");
                TaxCategory::Standard
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_TRIP_TYPES: [InvoiceTypeCode; 7] = [
        InvoiceTypeCode::Invoice,
        InvoiceTypeCode::CreditNote,
        InvoiceTypeCode::DebitNote,
        InvoiceTypeCode::Corrected,
        InvoiceTypeCode::Prepayment,
        InvoiceTypeCode::SelfBilled,
        InvoiceTypeCode::Partial,
    ];

    #[test]
    fn invoice_types_round_trip() {
        let mapper = En16931Mapper::new();
        for type_code in ROUND_TRIP_TYPES {
            assert_eq!(
                mapper.reverse_map_invoice_type(mapper.map_invoice_type(type_code)),
                type_code
            );
        }
    }

    #[test]
    fn tax_categories_round_trip_except_documented_collapses() {
        let mapper = En16931Mapper::new();
        for category in [
            TaxCategory::Standard,
            TaxCategory::Zero,
            TaxCategory::Exempt,
            TaxCategory::ReverseCharge,
            TaxCategory::Export,
            TaxCategory::NotApplicable,
            TaxCategory::Special,
        ] {
            assert_eq!(
                mapper.reverse_map_tax_category(mapper.map_tax_category(&category)),
                category
            );
        }

        // Documented exceptions: Reduced and custom categories collapse to S.
        assert_eq!(
            mapper.reverse_map_tax_category(mapper.map_tax_category(&TaxCategory::Reduced)),
            TaxCategory::Standard
        );
        let custom = TaxCategory::Custom("margin-scheme".into());
        assert_eq!(
            mapper.reverse_map_tax_category(mapper.map_tax_category(&custom)),
            TaxCategory::Standard
        );
    }

    #[test]
    fn unknown_codes_fall_back_to_the_canonical_defaults() {
        let mapper = En16931Mapper::new();
        assert_eq!(mapper.reverse_map_invoice_type("999"), InvoiceTypeCode::Invoice);
        assert_eq!(mapper.reverse_map_tax_category("??"), TaxCategory::Standard);
    }

    #[test]
    fn national_formats_fall_back_to_ubl() {
        let mapper = En16931Mapper::new();
        assert_eq!(mapper.map_output_format(OutputFormat::Facturae), "ubl-xml");
        assert_eq!(mapper.map_output_format(OutputFormat::CiiXml), "cii-xml");
    }
}
