//! Built-in rule sets: document shape, EN 16931 business-rule equivalents,
//! and the per-CIUS narrowings.

use clearbill_core::{TaxCategory, ValidationIssue};
use clearbill_invoicing::{Invoice, ReferenceKind};

/// Stage 1 — document shape.
///
/// The counterpart of schema validation for an in-memory aggregate: the
/// pieces without which no downstream rule can be evaluated sensibly. Any
/// error here short-circuits the pipeline.
pub(crate) fn structural(invoice: &Invoice) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if invoice.seller().is_none() {
        issues.push(
            ValidationIssue::error("SCHEMA-01", "invoice has no seller")
                .with_path("seller")
                .with_business_term("BG-4"),
        );
    }
    if invoice.buyer().is_none() {
        issues.push(
            ValidationIssue::error("SCHEMA-02", "invoice has no buyer")
                .with_path("buyer")
                .with_business_term("BG-7"),
        );
    }
    if invoice.issue_date().is_none() {
        issues.push(
            ValidationIssue::error("SCHEMA-03", "invoice has no issue date")
                .with_path("issue_date")
                .with_business_term("BT-2"),
        );
    }
    if invoice.lines().is_empty() {
        issues.push(
            ValidationIssue::error("SCHEMA-04", "invoice has no line items")
                .with_path("lines")
                .with_business_term("BG-25")
                .with_suggestion("add at least one line item"),
        );
    }
    for line in invoice.lines() {
        if line.unit_price().currency() != invoice.currency() {
            issues.push(
                ValidationIssue::error(
                    "SCHEMA-05",
                    format!(
                        "line {} is priced in {} but the document currency is {}",
                        line.line_number(),
                        line.unit_price().currency().code(),
                        invoice.currency().code()
                    ),
                )
                .with_path(format!("lines[{}].unit_price", line.line_number())),
            );
        }
    }

    issues
}

/// Stage 2 — EN 16931 business-rule equivalents.
///
/// Rule violations are errors; advisory checks are warnings. Issues
/// accumulate — nothing in this stage short-circuits.
pub(crate) fn business_rules(invoice: &Invoice) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if invoice.profile().trim().is_empty() {
        issues.push(
            ValidationIssue::error("BR-01", "invoice has no specification identifier")
                .with_business_term("BT-24"),
        );
    }

    arithmetic(invoice, &mut issues);

    // BR-S-05: standard- or reduced-rated lines need a positive rate.
    for line in invoice.lines() {
        let standard_rated = matches!(
            line.tax_category(),
            TaxCategory::Standard | TaxCategory::Reduced
        );
        if standard_rated && line.tax_rate().is_zero() {
            issues.push(
                ValidationIssue::error(
                    "BR-S-05",
                    format!("line {} is standard-rated with a zero rate", line.line_number()),
                )
                .with_path(format!("lines[{}].tax_rate", line.line_number()))
                .with_suggestion("use the zero-rated category for 0% supplies"),
            );
        }
    }

    // BR-AE: reverse charge requires both parties' tax registrations.
    let has_reverse_charge = invoice
        .lines()
        .iter()
        .any(|line| *line.tax_category() == TaxCategory::ReverseCharge);
    if has_reverse_charge {
        if invoice.seller().is_some_and(|s| s.tax_number().is_none()) {
            issues.push(
                ValidationIssue::error("BR-AE-02", "reverse charge requires the seller's VAT identifier")
                    .with_path("seller.tax_number"),
            );
        }
        if invoice.buyer().is_some_and(|b| b.tax_number().is_none()) {
            issues.push(
                ValidationIssue::error("BR-AE-03", "reverse charge requires the buyer's VAT identifier")
                    .with_path("buyer.tax_number"),
            );
        }
    }

    // BR-33/BR-38: allowances and charges should state their reason.
    for (index, entry) in invoice.document_allowance_charges().iter().enumerate() {
        if entry.reason().is_none() {
            issues.push(
                ValidationIssue::warning(
                    "BR-33",
                    "document-level allowance/charge does not state a reason",
                )
                .with_path(format!("allowance_charges[{index}]")),
            );
        }
    }

    // BR-CO-25: a positive payable needs a due date or payment terms.
    if invoice.totals().payable().is_positive()
        && invoice.due_date().is_none()
        && invoice.payment_instructions().is_none()
    {
        issues.push(
            ValidationIssue::error(
                "BR-CO-25",
                "a payable amount requires a due date or payment terms",
            )
            .with_path("due_date"),
        );
    }

    if let (Some(issue_date), Some(due_date)) = (invoice.issue_date(), invoice.due_date()) {
        if due_date < issue_date {
            issues.push(
                ValidationIssue::warning("ADV-01", "due date lies before the issue date")
                    .with_path("due_date")
                    .with_value(due_date.to_string()),
            );
        }
    }

    // BR-55: corrective documents should reference what they correct.
    let corrective = invoice.type_code().is_credit()
        || invoice.type_code() == clearbill_core::InvoiceTypeCode::Corrected;
    if corrective
        && !invoice
            .references()
            .iter()
            .any(|r| r.kind() == ReferenceKind::PrecedingInvoice)
    {
        issues.push(
            ValidationIssue::warning(
                "BR-55",
                "corrective invoice does not reference the preceding invoice",
            )
            .with_path("references")
            .with_suggestion("add a preceding-invoice reference"),
        );
    }

    issues
}

/// Arithmetic cross-checks (the BR-CO family). These hold by construction
/// for aggregates built through the factories, and catch imported or
/// hand-assembled state.
pub(crate) fn arithmetic(invoice: &Invoice, issues: &mut Vec<ValidationIssue>) {
    let totals = invoice.totals();

    let mut line_sum = clearbill_core::Money::zero(invoice.currency().clone());
    let mut sum_ok = true;
    for line in invoice.lines() {
        match line.net_amount().and_then(|net| line_sum.add(&net)) {
            Ok(sum) => line_sum = sum,
            Err(e) => {
                sum_ok = false;
                issues.push(
                    ValidationIssue::error("BR-CO-10", format!("line net amounts cannot be summed: {e}"))
                        .with_path(format!("lines[{}]", line.line_number())),
                );
            }
        }
    }
    if sum_ok && &line_sum != totals.line_net() {
        issues.push(
            ValidationIssue::error(
                "BR-CO-10",
                format!(
                    "sum of line nets {} does not equal the line net total {}",
                    line_sum.amount(),
                    totals.line_net().amount()
                ),
            )
            .with_business_term("BT-106"),
        );
    }

    let exclusive_ok = totals
        .line_net()
        .subtract(totals.allowance_total())
        .and_then(|m| m.add(totals.charge_total()))
        .map(|expected| &expected == totals.tax_exclusive())
        .unwrap_or(false);
    if !exclusive_ok {
        issues.push(
            ValidationIssue::error("BR-CO-13", "tax-exclusive total does not reconcile")
                .with_business_term("BT-109"),
        );
    }

    let inclusive_ok = totals
        .tax_exclusive()
        .add(totals.tax_total())
        .map(|expected| &expected == totals.tax_inclusive())
        .unwrap_or(false);
    if !inclusive_ok {
        issues.push(
            ValidationIssue::error("BR-CO-15", "tax-inclusive total does not reconcile")
                .with_business_term("BT-112"),
        );
    }

    let payable_ok = totals
        .tax_inclusive()
        .subtract(totals.prepaid())
        .and_then(|m| m.add(totals.rounding()))
        .map(|expected| &expected == totals.payable())
        .unwrap_or(false);
    if !payable_ok {
        issues.push(
            ValidationIssue::error("BR-CO-16", "payable amount does not reconcile")
                .with_business_term("BT-115"),
        );
    }

    // BR-CO-14: tax total equals the sum of the per-category breakdowns.
    let mut breakdown_sum = clearbill_core::Money::zero(invoice.currency().clone());
    let mut breakdown_ok = true;
    for breakdown in invoice.tax_breakdowns() {
        match breakdown_sum.add(breakdown.tax_amount()) {
            Ok(sum) => breakdown_sum = sum,
            Err(_) => breakdown_ok = false,
        }
    }
    if !breakdown_ok || &breakdown_sum != totals.tax_total() {
        issues.push(
            ValidationIssue::error(
                "BR-CO-14",
                "tax total does not equal the sum of the tax breakdowns",
            )
            .with_business_term("BT-110"),
        );
    }
}

/// Stage 3 — profile/CIUS narrowings, selected by the profile's standard.
///
/// These only ever add to stage 2, never contradict it.
pub(crate) fn cius_rules(invoice: &Invoice, standard: &str) -> Vec<ValidationIssue> {
    match standard {
        "peppol-bis" => peppol_rules(invoice),
        "xrechnung" => xrechnung_rules(invoice),
        _ => Vec::new(),
    }
}

fn peppol_rules(invoice: &Invoice) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // PEPPOL-EN16931-R003: buyer reference or purchase-order reference.
    let has_order_reference = invoice
        .references()
        .iter()
        .any(|r| r.kind() == ReferenceKind::PurchaseOrder);
    if invoice.buyer_reference().is_none() && !has_order_reference {
        issues.push(
            ValidationIssue::error(
                "PEPPOL-EN16931-R003",
                "buyer reference or purchase order reference is required",
            )
            .with_path("buyer_reference"),
        );
    }

    // R020/R010: both endpoints must be addressable on the network.
    if invoice
        .seller()
        .is_some_and(|s| s.electronic_address().is_none() && s.network_id().is_none())
    {
        issues.push(
            ValidationIssue::error(
                "PEPPOL-EN16931-R020",
                "seller electronic address (endpoint) is required",
            )
            .with_path("seller.electronic_address"),
        );
    }
    if invoice
        .buyer()
        .is_some_and(|b| b.electronic_address().is_none() && b.network_id().is_none())
    {
        issues.push(
            ValidationIssue::error(
                "PEPPOL-EN16931-R010",
                "buyer electronic address (endpoint) is required",
            )
            .with_path("buyer.electronic_address"),
        );
    }

    // R061: direct debit needs a mandate reference.
    if let Some(instructions) = invoice.payment_instructions() {
        if instructions.means().is_direct_debit() && instructions.mandate_reference().is_none() {
            issues.push(
                ValidationIssue::error(
                    "PEPPOL-EN16931-R061",
                    "direct debit requires a mandate reference",
                )
                .with_path("payment_instructions.mandate_reference"),
            );
        }
    }

    issues
}

fn xrechnung_rules(invoice: &Invoice) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // BR-DE-15: the Leitweg-ID travels in the buyer reference.
    if invoice.buyer_reference().is_none() {
        issues.push(
            ValidationIssue::error("BR-DE-15", "buyer reference (Leitweg-ID) is required")
                .with_path("buyer_reference"),
        );
    }

    // BR-DE-01: payment instructions are mandatory.
    if invoice.payment_instructions().is_none() {
        issues.push(
            ValidationIssue::error("BR-DE-01", "payment instructions are required")
                .with_path("payment_instructions"),
        );
    }

    // BR-DE-02: a seller contact must be given.
    if invoice.seller().is_some_and(|s| s.contact().is_none()) {
        issues.push(
            ValidationIssue::error("BR-DE-02", "seller contact is required")
                .with_path("seller.contact"),
        );
    }

    issues
}
