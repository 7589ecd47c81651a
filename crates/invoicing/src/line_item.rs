//! Invoice line items.

use core::str::FromStr;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clearbill_core::{
    DomainError, DomainResult, Entity, Money, Percentage, Quantity, TaxCategory,
};

use crate::allowance::AllowanceCharge;

/// Identifier of a line item within its owning invoice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for LineItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("LineItemId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Item classification under a scheme such as CPV or UNSPSC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemClassification {
    pub scheme: String,
    pub code: String,
}

/// The period of service a line bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "billing period is inverted: {start}..{end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Partial update for a line item; `None` keeps the existing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemUpdate {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<Quantity>,
    pub unit_price: Option<Money>,
}

/// Entity: one position on an invoice.
///
/// Owned exclusively by its invoice; the invoice assigns and maintains the
/// sequential `line_number` and re-derives totals after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    id: LineItemId,
    line_number: u32,
    item_name: String,
    description: Option<String>,
    quantity: Quantity,
    unit_price: Money,
    tax_category: TaxCategory,
    tax_rate: Percentage,
    tax_exemption_reason: Option<String>,
    allowances: Vec<AllowanceCharge>,
    classifications: Vec<ItemClassification>,
    period: Option<BillingPeriod>,
}

impl InvoiceLineItem {
    pub fn new(
        item_name: impl Into<String>,
        quantity: Quantity,
        unit_price: Money,
        tax_category: TaxCategory,
        tax_rate: Percentage,
        tax_exemption_reason: Option<String>,
    ) -> DomainResult<Self> {
        let item_name = item_name.into();
        if item_name.trim().is_empty() {
            return Err(DomainError::validation("line item name cannot be empty"));
        }
        if !tax_category.requires_rate() && !tax_rate.is_zero() {
            return Err(DomainError::invariant(format!(
                "tax category {} forbids a rate, got {tax_rate}",
                tax_category.as_str()
            )));
        }
        if tax_category.requires_exemption_reason()
            && tax_exemption_reason
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
        {
            return Err(DomainError::invariant(format!(
                "tax category {} requires an exemption reason",
                tax_category.as_str()
            )));
        }
        Ok(Self {
            id: LineItemId::new(),
            line_number: 0,
            item_name,
            description: None,
            quantity,
            unit_price,
            tax_category,
            tax_rate,
            tax_exemption_reason,
            allowances: Vec::new(),
            classifications: Vec::new(),
            period: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_classification(mut self, classification: ItemClassification) -> Self {
        self.classifications.push(classification);
        self
    }

    pub fn with_period(mut self, period: BillingPeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Attach a line-level allowance or charge in the line's currency.
    pub fn with_allowance_charge(mut self, entry: AllowanceCharge) -> DomainResult<Self> {
        if entry.amount().currency() != self.unit_price.currency() {
            return Err(DomainError::currency_mismatch(
                self.unit_price.currency().code(),
                entry.amount().currency().code(),
            ));
        }
        self.allowances.push(entry);
        Ok(self)
    }

    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub(crate) fn set_line_number(&mut self, number: u32) {
        self.line_number = number;
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    pub fn unit_price(&self) -> &Money {
        &self.unit_price
    }

    pub fn tax_category(&self) -> &TaxCategory {
        &self.tax_category
    }

    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    pub fn tax_exemption_reason(&self) -> Option<&str> {
        self.tax_exemption_reason.as_deref()
    }

    pub fn allowance_charges(&self) -> &[AllowanceCharge] {
        &self.allowances
    }

    pub fn classifications(&self) -> &[ItemClassification] {
        &self.classifications
    }

    pub fn period(&self) -> Option<&BillingPeriod> {
        self.period.as_ref()
    }

    /// Apply a partial update; `None` fields keep their current values.
    pub(crate) fn apply_update(&mut self, update: LineItemUpdate) -> DomainResult<()> {
        if let Some(item_name) = update.item_name {
            if item_name.trim().is_empty() {
                return Err(DomainError::validation("line item name cannot be empty"));
            }
            self.item_name = item_name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = update.unit_price {
            if unit_price.currency() != self.unit_price.currency() {
                return Err(DomainError::currency_mismatch(
                    self.unit_price.currency().code(),
                    unit_price.currency().code(),
                ));
            }
            self.unit_price = unit_price;
        }
        Ok(())
    }

    /// Net amount: `round(quantity × unit price)` plus signed line
    /// allowances/charges.
    pub fn net_amount(&self) -> DomainResult<Money> {
        let mut net = self.unit_price.multiply(self.quantity.value())?;
        for entry in &self.allowances {
            net = net.add(&entry.signed_amount())?;
        }
        Ok(net)
    }
}

impl Entity for InvoiceLineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
