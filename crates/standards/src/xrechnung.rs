//! XRechnung (German CIUS of EN 16931) mapper.

use clearbill_core::{ElectronicAddressScheme, InvoiceTypeCode, OutputFormat, TaxCategory};

use crate::en16931::En16931Mapper;
use crate::mapper::StandardMapper;

/// XRechnung — the German public-sector CIUS.
///
/// Code lists are EN 16931's; XRechnung additionally admits both UBL and CII
/// syntaxes and prefers the Leitweg-routed delivery scheme (`0204`) for
/// electronic addresses without a better match.
#[derive(Debug, Clone, Copy, Default)]
pub struct XRechnungMapper {
    base: En16931Mapper,
}

impl XRechnungMapper {
    pub fn new() -> Self {
        Self {
            base: En16931Mapper::new(),
        }
    }
}

impl StandardMapper for XRechnungMapper {
    fn standard(&self) -> &'static str {
        "xrechnung"
    }

    fn map_invoice_type(&self, type_code: InvoiceTypeCode) -> &'static str {
        self.base.map_invoice_type(type_code)
    }

    fn map_tax_category(&self, category: &TaxCategory) -> &'static str {
        self.base.map_tax_category(category)
    }

    fn map_address_scheme(&self, scheme: ElectronicAddressScheme) -> &'static str {
        match scheme {
            ElectronicAddressScheme::Email => "EM",
            ElectronicAddressScheme::Gln => "0088",
            ElectronicAddressScheme::Duns => "0060",
            // German VAT registration.
            ElectronicAddressScheme::VatNumber => "9930",
        }
    }

    fn map_output_format(&self, format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::UblXml => "ubl-xml",
            OutputFormat::CiiXml => "cii-xml",
            other => {
                tracing::debug!(?other, "format is not an XRechnung syntax, using cii-xml");
                "cii-xml"
            }
        }
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
    fn partial_and_corrected_types_are_admitted() {
        // 326 and 384 are the German specialities.
        let mapper = XRechnungMapper::new();
        assert_eq!(mapper.map_invoice_type(InvoiceTypeCode::Partial), "326");
        assert_eq!(mapper.map_invoice_type(InvoiceTypeCode::Corrected), "384");
    }

    #[test]
    fn cii_is_the_default_syntax() {
        let mapper = XRechnungMapper::new();
        assert_eq!(mapper.map_output_format(OutputFormat::Pdf), "cii-xml");
        assert_eq!(mapper.map_output_format(OutputFormat::UblXml), "ubl-xml");
    }
}
