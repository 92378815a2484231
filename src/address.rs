//! Physical service address.

use std::fmt;

use serde::Serialize;

/// A service location, compared by value.
///
/// # Examples
///
/// ```
/// use utility_billing::address::Address;
///
/// let a = Address::new("12 Canal St", "Lahore", "54000");
/// assert_eq!(a.to_string(), "12 Canal St, Lahore 54000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    street: String,
    city: String,
    zip: String,
}

impl Address {
    /// Creates a new address.
    pub fn new(street: impl Into<String>, city: impl Into<String>, zip: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            zip: zip.into(),
        }
    }

    /// Street line.
    pub fn street(&self) -> &str {
        &self.street
    }

    /// City name.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Postal code.
    pub fn zip(&self) -> &str {
        &self.zip
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} {}", self.street, self.city, self.zip)
    }
}
