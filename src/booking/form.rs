use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Contact and payment fields collected on the payment tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentForm {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1), custom(function = "has_at_sign"))]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 1))]
    pub card_number: String,
    #[validate(length(min = 1))]
    pub expiry_date: String,
    #[validate(length(min = 1))]
    pub cvv: String,
    pub billing_address: String,
}

fn has_at_sign(email: &str) -> Result<(), ValidationError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(ValidationError::new("missing_at_sign"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
    CardNumber,
    ExpiryDate,
    Cvv,
    BillingAddress,
}

impl FormField {
    /// Mandatory fields, in the order they are checked.
    pub const REQUIRED: [FormField; 6] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::CardNumber,
        FormField::ExpiryDate,
        FormField::Cvv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::FirstName => "firstName",
            FormField::LastName => "lastName",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::CardNumber => "cardNumber",
            FormField::ExpiryDate => "expiryDate",
            FormField::Cvv => "cvv",
            FormField::BillingAddress => "billingAddress",
        }
    }

    // validator reports errors under the Rust field name
    fn struct_field(&self) -> &'static str {
        match self {
            FormField::FirstName => "first_name",
            FormField::LastName => "last_name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::CardNumber => "card_number",
            FormField::ExpiryDate => "expiry_date",
            FormField::Cvv => "cvv",
            FormField::BillingAddress => "billing_address",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            FormField::FirstName,
            FormField::LastName,
            FormField::Email,
            FormField::Phone,
            FormField::CardNumber,
            FormField::ExpiryDate,
            FormField::Cvv,
            FormField::BillingAddress,
        ]
        .into_iter()
        .find(|field| field.as_str() == s)
        .ok_or_else(|| format!("unknown form field '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in {0}")]
    Missing(FormField),
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

impl PaymentForm {
    /// Stores a field value with surrounding whitespace removed, so a blank
    /// entry counts as missing.
    pub fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::CardNumber => &mut self.card_number,
            FormField::ExpiryDate => &mut self.expiry_date,
            FormField::Cvv => &mut self.cvv,
            FormField::BillingAddress => &mut self.billing_address,
        };
        *slot = value.trim().to_string();
    }

    /// Reports the first missing mandatory field, then a malformed email.
    pub fn check(&self) -> Result<(), FormError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let fields = errors.field_errors();

        for field in FormField::REQUIRED {
            let missing = fields
                .get(field.struct_field())
                .is_some_and(|errs| errs.iter().any(|e| e.code == "length"));
            if missing {
                return Err(FormError::Missing(field));
            }
        }

        if fields.contains_key("email") {
            return Err(FormError::InvalidEmail);
        }
        Ok(())
    }

    /// Card number with all but the last four digits hidden.
    pub fn masked_card(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        let tail: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
        format!("**** **** **** {tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> PaymentForm {
        PaymentForm {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@doe.com".into(),
            phone: String::new(),
            card_number: "4111 1111 1111 1234".into(),
            expiry_date: "12/27".into(),
            cvv: "123".into(),
            billing_address: String::new(),
        }
    }

    #[test]
    fn complete_form_passes_without_optional_fields() {
        assert_eq!(filled().check(), Ok(()));
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let mut form = filled();
        form.email = "john.doe.example.com".into();
        assert_eq!(form.check(), Err(FormError::InvalidEmail));
    }

    #[test]
    fn first_missing_field_is_reported_in_order() {
        let mut form = filled();
        form.cvv.clear();
        form.last_name.clear();
        assert_eq!(form.check(), Err(FormError::Missing(FormField::LastName)));
        assert_eq!(FormError::Missing(FormField::LastName).to_string(), "Please fill in lastName");
    }

    #[test]
    fn empty_email_is_missing_not_invalid() {
        let mut form = filled();
        form.email.clear();
        assert_eq!(form.check(), Err(FormError::Missing(FormField::Email)));
    }

    #[test]
    fn fields_round_trip_through_names() {
        for name in ["firstName", "cardNumber", "billingAddress", "cvv"] {
            let field: FormField = name.parse().unwrap();
            assert_eq!(field.to_string(), name);
        }
        let mut form = PaymentForm::default();
        form.set("expiryDate".parse().unwrap(), "01/30".into());
        assert_eq!(form.expiry_date, "01/30");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut form = filled();
        form.set(FormField::FirstName, "   ".into());
        assert_eq!(form.check(), Err(FormError::Missing(FormField::FirstName)));
        form.set(FormField::FirstName, "  Jane ".into());
        assert_eq!(form.first_name, "Jane");
        assert_eq!(form.check(), Ok(()));
    }

    #[test]
    fn card_is_masked() {
        assert_eq!(filled().masked_card(), "**** **** **** 1234");
    }
}
