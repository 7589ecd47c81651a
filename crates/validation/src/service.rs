//! The staged validation service.

use clearbill_core::ValidationResult;
use clearbill_invoicing::Invoice;

use crate::profile::ValidationProfile;
use crate::rules;

/// Runs the four-stage pipeline against an invoice.
pub trait ValidationService {
    /// Validate one invoice against one profile.
    ///
    /// Stage order is fixed: structural → business rules → profile/CIUS →
    /// custom. A structural error returns immediately; later stages
    /// accumulate their issues even when earlier non-structural stages
    /// already produced errors.
    fn validate(&self, invoice: &Invoice, profile: &ValidationProfile) -> ValidationResult;

    /// Standards the registered profiles cover.
    fn supported_standards(&self) -> Vec<String>;

    /// Names of the registered profiles.
    fn supported_profiles(&self) -> Vec<String>;
}

/// Default pipeline with the EN 16931 / Peppol BIS / XRechnung / US profiles
/// registered.
#[derive(Debug, Default)]
pub struct InvoiceValidator {
    profiles: Vec<ValidationProfile>,
}

impl InvoiceValidator {
    /// An empty validator; register profiles before introspecting.
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    /// The validator with the built-in default profiles.
    pub fn with_default_profiles() -> Self {
        let mut validator = Self::new();
        validator.register_profile(ValidationProfile::new("EN 16931 core", "en16931"));
        validator.register_profile(ValidationProfile::new("Peppol BIS Billing 3.0", "peppol-bis"));
        validator.register_profile(ValidationProfile::new("XRechnung 3.0", "xrechnung"));
        validator.register_profile(ValidationProfile::new("US commercial", "us"));
        validator
    }

    pub fn register_profile(&mut self, profile: ValidationProfile) {
        self.profiles.push(profile);
    }

    /// Look up a registered profile by name.
    pub fn profile(&self, name: &str) -> Option<&ValidationProfile> {
        self.profiles.iter().find(|profile| profile.name() == name)
    }

    /// Validate and append the outcome to the invoice's history (emits the
    /// invoice's validated event). Validation never blocks further mutation
    /// by itself; `finalize` is the gate.
    pub fn validate_and_record(
        &self,
        invoice: &mut Invoice,
        profile: &ValidationProfile,
    ) -> ValidationResult {
        let result = self.validate(invoice, profile);
        invoice.record_validation(result.clone());
        result
    }
}

impl ValidationService for InvoiceValidator {
    fn validate(&self, invoice: &Invoice, profile: &ValidationProfile) -> ValidationResult {
        let mut result = ValidationResult::new(profile.name());

        let structural = rules::structural(invoice);
        if !structural.is_empty() {
            tracing::debug!(
                profile = profile.name(),
                issues = structural.len(),
                "structural validation failed, skipping later stages"
            );
            result.extend(structural);
            return result;
        }

        result.extend(rules::business_rules(invoice));
        result.extend(rules::cius_rules(invoice, profile.standard()));
        for rule in profile.rules() {
            result.extend(rule.evaluate(invoice));
        }

        result
    }

    fn supported_standards(&self) -> Vec<String> {
        let mut standards: Vec<String> = self
            .profiles
            .iter()
            .map(|profile| profile.standard().to_string())
            .collect();
        standards.sort_unstable();
        standards.dedup();
        standards
    }

    fn supported_profiles(&self) -> Vec<String> {
        self.profiles
            .iter()
            .map(|profile| profile.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::custom_rule;
    use chrono::NaiveDate;
    use clearbill_core::{
        Currency, ElectronicAddressScheme, InvoiceTypeCode, Money, Percentage, Quantity, Severity,
        TaxCategory,
    };
    use clearbill_invoicing::{
        DocumentReference, InvoiceFactory, InvoiceLineItem, InvoiceNumberSequence,
        PaymentInstructions, PaymentMeans, ReferenceKind,
    };
    use clearbill_parties::{Address, ElectronicAddress, PartyFactory, PartySnapshot};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::from_code("EUR").unwrap()).unwrap()
    }

    fn snapshot(name: &str, endpoint: bool) -> PartySnapshot {
        let mut party = PartyFactory::new().create(name).unwrap();
        party.add_address(Address::new("Berlin", "10115", "DE").unwrap());
        if endpoint {
            party.set_electronic_address(Some(
                ElectronicAddress::new(ElectronicAddressScheme::Email, "billing@example.com")
                    .unwrap(),
            ));
        }
        party.create_snapshot().unwrap()
    }

    fn base_invoice(endpoints: bool) -> Invoice {
        let mut factory =
            InvoiceFactory::new(InvoiceNumberSequence::new("RE-", 2026).unwrap());
        let mut invoice = factory
            .draft(InvoiceTypeCode::Invoice, Currency::from_code("EUR").unwrap())
            .unwrap();
        invoice.set_seller(snapshot("ACME GmbH", endpoints)).unwrap();
        invoice.set_buyer(snapshot("Kunde AG", endpoints)).unwrap();
        invoice
            .set_issue_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .unwrap();
        invoice
            .set_due_date(Some(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()))
            .unwrap();
        invoice
            .add_line_item(
                InvoiceLineItem::new(
                    "Consulting",
                    Quantity::new(dec!(2), "HUR").unwrap(),
                    eur(dec!(100.00)),
                    TaxCategory::Standard,
                    Percentage::new(dec!(20)).unwrap(),
                    None,
                )
                .unwrap(),
            )
            .unwrap();
        invoice
    }

    fn en16931() -> ValidationProfile {
        ValidationProfile::new("EN 16931 core", "en16931")
    }

    #[test]
    fn a_complete_invoice_passes_the_core_profile() {
        let validator = InvoiceValidator::with_default_profiles();
        let result = validator.validate(&base_invoice(false), &en16931());
        assert!(result.is_valid(), "unexpected issues: {:?}", result.issues());
    }

    #[test]
    fn structural_failure_short_circuits() {
        let mut factory =
            InvoiceFactory::new(InvoiceNumberSequence::new("RE-", 2026).unwrap());
        let invoice = factory
            .draft(InvoiceTypeCode::Invoice, Currency::from_code("EUR").unwrap())
            .unwrap();

        let validator = InvoiceValidator::with_default_profiles();
        let result = validator.validate(&invoice, &en16931());

        assert!(!result.is_valid());
        // Only SCHEMA-codes: later stages never ran.
        assert!(result.issues().iter().all(|i| i.code().starts_with("SCHEMA-")));
        assert_eq!(result.errors().count(), 4);
    }

    #[test]
    fn later_stage_issues_accumulate() {
        // Valid shape, but: no due date/terms (BR-CO-25) and a Peppol
        // profile without endpoints (R010/R020/R003).
        let mut invoice = base_invoice(false);
        invoice.set_due_date(None).unwrap();

        let validator = InvoiceValidator::with_default_profiles();
        let profile = ValidationProfile::new("Peppol BIS Billing 3.0", "peppol-bis");
        let result = validator.validate(&invoice, &profile);

        let codes: Vec<&str> = result.errors().map(|i| i.code()).collect();
        assert!(codes.contains(&"BR-CO-25"));
        assert!(codes.contains(&"PEPPOL-EN16931-R003"));
        assert!(codes.contains(&"PEPPOL-EN16931-R010"));
        assert!(codes.contains(&"PEPPOL-EN16931-R020"));
    }

    #[test]
    fn peppol_accepts_addressable_referenced_invoices() {
        let mut invoice = base_invoice(true);
        invoice.set_buyer_reference(Some("PO-4711".into())).unwrap();

        let validator = InvoiceValidator::with_default_profiles();
        let profile = ValidationProfile::new("Peppol BIS Billing 3.0", "peppol-bis");
        let result = validator.validate(&invoice, &profile);
        assert!(result.is_valid(), "unexpected issues: {:?}", result.issues());
    }

    #[test]
    fn direct_debit_without_mandate_is_a_peppol_error() {
        let mut invoice = base_invoice(true);
        invoice.set_buyer_reference(Some("PO-4711".into())).unwrap();
        invoice
            .set_payment_instructions(Some(PaymentInstructions::new(
                PaymentMeans::SepaDirectDebit,
            )))
            .unwrap();

        let validator = InvoiceValidator::with_default_profiles();
        let profile = ValidationProfile::new("Peppol BIS Billing 3.0", "peppol-bis");
        let result = validator.validate(&invoice, &profile);
        assert!(
            result
                .errors()
                .any(|issue| issue.code() == "PEPPOL-EN16931-R061")
        );
    }

    #[test]
    fn credit_note_without_preceding_reference_warns() {
        let mut factory =
            InvoiceFactory::new(InvoiceNumberSequence::new("CN-", 2026).unwrap());
        let mut invoice = factory
            .draft(InvoiceTypeCode::CreditNote, Currency::from_code("EUR").unwrap())
            .unwrap();
        invoice.set_seller(snapshot("ACME GmbH", false)).unwrap();
        invoice.set_buyer(snapshot("Kunde AG", false)).unwrap();
        invoice
            .set_issue_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .unwrap();
        invoice
            .set_due_date(Some(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()))
            .unwrap();
        invoice
            .add_line_item(
                InvoiceLineItem::new(
                    "Refund",
                    Quantity::pieces(1),
                    eur(dec!(50.00)),
                    TaxCategory::Standard,
                    Percentage::new(dec!(20)).unwrap(),
                    None,
                )
                .unwrap(),
            )
            .unwrap();

        let validator = InvoiceValidator::with_default_profiles();
        let result = validator.validate(&invoice, &en16931());
        assert!(result.is_valid());
        assert!(result.warnings().any(|issue| issue.code() == "BR-55"));

        invoice
            .add_reference(
                DocumentReference::new("RE-2026-00001", ReferenceKind::PrecedingInvoice).unwrap(),
            )
            .unwrap();
        let result = validator.validate(&invoice, &en16931());
        assert!(!result.warnings().any(|issue| issue.code() == "BR-55"));
    }

    #[test]
    fn one_violated_custom_rule_yields_exactly_one_error_with_its_code() {
        let profile = en16931().with_rule(custom_rule(
            "ORG-42",
            Severity::Error,
            "orders above 100 EUR need a buyer reference",
            |invoice| {
                invoice.totals().payable().amount() <= dec!(100.00)
                    || invoice.buyer_reference().is_some()
            },
        ));

        let validator = InvoiceValidator::with_default_profiles();
        let result = validator.validate(&base_invoice(false), &profile);

        assert!(!result.is_valid());
        assert_eq!(result.errors().count(), 1);
        assert_eq!(result.errors().next().unwrap().code(), "ORG-42");
    }

    #[test]
    fn xrechnung_demands_leitweg_and_payment_instructions() {
        let validator = InvoiceValidator::with_default_profiles();
        let profile = ValidationProfile::new("XRechnung 3.0", "xrechnung");
        let result = validator.validate(&base_invoice(false), &profile);

        let codes: Vec<&str> = result.errors().map(|i| i.code()).collect();
        assert!(codes.contains(&"BR-DE-15"));
        assert!(codes.contains(&"BR-DE-01"));
        assert!(codes.contains(&"BR-DE-02"));
    }

    #[test]
    fn introspection_reports_registered_profiles_and_standards() {
        let validator = InvoiceValidator::with_default_profiles();
        assert_eq!(
            validator.supported_standards(),
            vec!["en16931", "peppol-bis", "us", "xrechnung"]
        );
        assert_eq!(validator.supported_profiles().len(), 4);
    }

    #[test]
    fn validate_and_record_appends_to_the_invoice_history() {
        let validator = InvoiceValidator::with_default_profiles();
        let mut invoice = base_invoice(false);
        let result = validator.validate_and_record(&mut invoice, &en16931());

        assert!(result.is_valid());
        assert_eq!(invoice.validation_history().len(), 1);
    }
}
