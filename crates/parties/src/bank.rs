//! Bank accounts for payment instructions.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ValueObject};

/// A bank account a party can be paid into.
///
/// Unique within a party by account number. When an IBAN is given it must pass
/// the ISO 13616 mod-97 checksum; a BIC must have the ISO 9362 shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    holder: Option<String>,
    account_number: String,
    iban: Option<String>,
    bic: Option<String>,
    bank_name: Option<String>,
}

impl BankAccount {
    pub fn new(account_number: impl Into<String>) -> DomainResult<Self> {
        let account_number = account_number.into();
        if account_number.trim().is_empty() {
            return Err(DomainError::validation("account number cannot be empty"));
        }
        Ok(Self {
            holder: None,
            account_number,
            iban: None,
            bic: None,
            bank_name: None,
        })
    }

    /// Construct from an IBAN, using it as the account number too.
    pub fn from_iban(iban: impl Into<String>) -> DomainResult<Self> {
        let iban = normalize_iban(iban.into());
        check_iban(&iban)?;
        Ok(Self {
            holder: None,
            account_number: iban.clone(),
            iban: Some(iban),
            bic: None,
            bank_name: None,
        })
    }

    pub fn with_iban(mut self, iban: impl Into<String>) -> DomainResult<Self> {
        let iban = normalize_iban(iban.into());
        check_iban(&iban)?;
        self.iban = Some(iban);
        Ok(self)
    }

    pub fn with_bic(mut self, bic: impl Into<String>) -> DomainResult<Self> {
        let bic = bic.into().to_ascii_uppercase();
        check_bic(&bic)?;
        self.bic = Some(bic);
        Ok(self)
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    pub fn with_bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = Some(bank_name.into());
        self
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn iban(&self) -> Option<&str> {
        self.iban.as_deref()
    }

    pub fn bic(&self) -> Option<&str> {
        self.bic.as_deref()
    }

    pub fn bank_name(&self) -> Option<&str> {
        self.bank_name.as_deref()
    }
}

impl ValueObject for BankAccount {}

fn normalize_iban(raw: String) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// ISO 13616 structural + mod-97 checksum validation.
fn check_iban(iban: &str) -> DomainResult<()> {
    if iban.len() < 15 || iban.len() > 34 {
        return Err(DomainError::validation(format!(
            "IBAN length must be 15-34 characters, got {}",
            iban.len()
        )));
    }
    let bytes = iban.as_bytes();
    if !bytes[..2].iter().all(|b| b.is_ascii_uppercase())
        || !bytes[2..4].iter().all(|b| b.is_ascii_digit())
    {
        return Err(DomainError::validation(format!(
            "IBAN must start with a country code and two check digits, got {iban:?}"
        )));
    }
    if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
        return Err(DomainError::validation("IBAN may only contain letters and digits"));
    }

    // Rearranged mod-97: move the first four characters to the end, expand
    // letters to two-digit numbers, remainder must be 1.
    let rearranged = iban[4..].bytes().chain(iban[..4].bytes());
    let mut remainder: u32 = 0;
    for b in rearranged {
        if b.is_ascii_digit() {
            remainder = (remainder * 10 + u32::from(b - b'0')) % 97;
        } else {
            let n = u32::from(b - b'A') + 10;
            remainder = (remainder * 100 + n) % 97;
        }
    }
    if remainder != 1 {
        return Err(DomainError::validation(format!("IBAN checksum failed for {iban:?}")));
    }
    Ok(())
}

/// ISO 9362 shape: 8 or 11 characters, bank + country + location (+ branch).
fn check_bic(bic: &str) -> DomainResult<()> {
    if bic.len() != 8 && bic.len() != 11 {
        return Err(DomainError::validation(format!(
            "BIC must be 8 or 11 characters, got {}",
            bic.len()
        )));
    }
    let bytes = bic.as_bytes();
    if !bytes[..6].iter().all(|b| b.is_ascii_uppercase())
        || !bytes[6..].iter().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(DomainError::validation(format!("BIC shape invalid: {bic:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ibans_pass_the_checksum() {
        assert!(BankAccount::from_iban("DE89 3704 0044 0532 0130 00").is_ok());
        assert!(BankAccount::from_iban("GB29 NWBK 6016 1331 9268 19").is_ok());
        assert!(BankAccount::from_iban("FR14 2004 1010 0505 0001 3M02 606").is_ok());
    }

    #[test]
    fn corrupted_iban_fails_the_checksum() {
        let err = BankAccount::from_iban("DE89 3704 0044 0532 0130 01").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn bic_shape_is_enforced() {
        let account = BankAccount::new("0532013000").unwrap();
        assert!(account.clone().with_bic("COBADEFFXXX").is_ok());
        assert!(account.clone().with_bic("COBADEFF").is_ok());
        assert!(account.clone().with_bic("COBADE").is_err());
        assert!(account.with_bic("C0BADEFF").is_err());
    }

    #[test]
    fn empty_account_number_is_rejected() {
        assert!(BankAccount::new("  ").is_err());
    }
}
