//! Contact persons attached to a party.

use serde::{Deserialize, Serialize};

use clearbill_core::{DomainError, DomainResult, ValueObject};

/// A named contact with at least one way to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    name: String,
    email: Option<String>,
    phone: Option<String>,
    role: Option<String>,
}

impl ContactPerson {
    pub fn new(
        name: impl Into<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("contact name cannot be empty"));
        }
        if email.is_none() && phone.is_none() {
            return Err(DomainError::validation(
                "contact needs at least one of email or phone",
            ));
        }
        if let Some(ref email) = email {
            if !email.contains('@') {
                return Err(DomainError::validation(format!(
                    "contact email must contain '@', got {email:?}"
                )));
            }
        }
        Ok(Self {
            name,
            email,
            phone,
            role: None,
        })
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

impl ValueObject for ContactPerson {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_name_and_a_reachable_channel() {
        assert!(ContactPerson::new(" ", Some("a@b.de".into()), None).is_err());
        assert!(ContactPerson::new("Jo Doe", None, None).is_err());
        assert!(ContactPerson::new("Jo Doe", None, Some("+49 30 1234".into())).is_ok());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(ContactPerson::new("Jo Doe", Some("not-an-email".into()), None).is_err());
    }
}
