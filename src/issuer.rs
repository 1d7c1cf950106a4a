//! Issuer identity and payment details, injected per call.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The party issuing the invoice.
///
/// Loaded from JSON, e.g.
///
/// ```json
/// {
///   "name": "Ana Gómez",
///   "tax_id": "1020304050",
///   "phone": "+57 300 000 0000",
///   "email": "ana@example.com",
///   "city": "Cartagena, Colombia",
///   "bank_account": "00000000000",
///   "mobile_payment": "3000000000"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub bank_account: String,
    #[serde(default = "IssuerProfile::default_bank_account_label")]
    pub bank_account_label: String,
    pub mobile_payment: String,
    #[serde(default = "IssuerProfile::default_mobile_payment_label")]
    pub mobile_payment_label: String,
}

impl IssuerProfile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn default_bank_account_label() -> String {
        "Cuenta de ahorros Bancolombia".to_string()
    }

    fn default_mobile_payment_label() -> String {
        "Nequi / Daviplata".to_string()
    }
}

impl Default for IssuerProfile {
    /// Sample profile. Real deployments pass their own JSON profile.
    fn default() -> Self {
        Self {
            name: "Nombre del Emisor".to_string(),
            tax_id: "0000000000".to_string(),
            phone: "+57 300 000 0000".to_string(),
            email: "facturacion@example.com".to_string(),
            city: "Cartagena, Colombia".to_string(),
            bank_account: "00000000000".to_string(),
            bank_account_label: Self::default_bank_account_label(),
            mobile_payment: "3000000000".to_string(),
            mobile_payment_label: Self::default_mobile_payment_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_default_when_omitted() {
        let issuer = IssuerProfile::from_json(
            r#"{"name":"Ana","tax_id":"1","phone":"2","email":"a@b.co","city":"Bogotá",
                "bank_account":"3","mobile_payment":"4"}"#,
        )
        .unwrap();
        assert_eq!(issuer.city, "Bogotá");
        assert_eq!(issuer.bank_account_label, "Cuenta de ahorros Bancolombia");
        assert_eq!(issuer.mobile_payment_label, "Nequi / Daviplata");
    }

    #[test]
    fn missing_field_is_an_error() {
        assert!(IssuerProfile::from_json(r#"{"name":"Ana"}"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = IssuerProfile::from_json_file(Path::new("/nonexistent/issuer.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/issuer.json"));
    }
}
