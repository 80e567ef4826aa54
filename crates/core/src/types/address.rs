//! Checkout form validation and the shipping address stored on orders.

use serde::{Deserialize, Serialize};

use super::{Email, EmailError};

/// Country used when the checkout form leaves it blank.
pub const DEFAULT_COUNTRY: &str = "Philippines";

/// Errors raised while validating a [`CheckoutForm`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutFormError {
    #[error("Please fill in all required fields")]
    MissingRequiredFields,
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Shipping details as submitted at checkout.
///
/// `full_name`, `email`, `address` and `city` are required; everything else
/// may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// Snapshot of where an order ships, persisted as JSON on the order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

impl CheckoutForm {
    /// Trim every field and check the required ones.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutFormError::MissingRequiredFields`] when any required
    /// field is blank, or [`CheckoutFormError::InvalidEmail`] when the email
    /// does not parse.
    pub fn validate(&self) -> Result<ShippingAddress, CheckoutFormError> {
        let required = [&self.full_name, &self.email, &self.address, &self.city];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(CheckoutFormError::MissingRequiredFields);
        }

        let optional = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_owned()
        };

        let country = optional(&self.country);

        Ok(ShippingAddress {
            name: self.full_name.trim().to_owned(),
            email: Email::parse(&self.email)?,
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: optional(&self.state),
            zip: optional(&self.zip),
            country: if country.is_empty() {
                DEFAULT_COUNTRY.to_owned()
            } else {
                country
            },
            phone: optional(&self.phone),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> CheckoutForm {
        CheckoutForm {
            full_name: " Maria Santos ".into(),
            email: "maria@example.ph".into(),
            address: "12 Rizal St".into(),
            city: "Quezon City".into(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_valid_form_defaults_country() {
        let address = filled().validate().unwrap();
        assert_eq!(address.name, "Maria Santos");
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert_eq!(address.phone, "");
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let form = CheckoutForm {
            city: "   ".into(),
            ..filled()
        };
        assert_eq!(
            form.validate(),
            Err(CheckoutFormError::MissingRequiredFields)
        );
        assert_eq!(
            CheckoutFormError::MissingRequiredFields.to_string(),
            "Please fill in all required fields"
        );
    }

    #[test]
    fn test_bad_email_rejected() {
        let form = CheckoutForm {
            email: "maria-at-example".into(),
            ..filled()
        };
        assert!(matches!(
            form.validate(),
            Err(CheckoutFormError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_explicit_country_kept() {
        let form = CheckoutForm {
            country: Some(" Singapore ".into()),
            ..filled()
        };
        assert_eq!(form.validate().unwrap().country, "Singapore");
    }
}
