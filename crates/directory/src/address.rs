use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firmdex_auth::TenantScoped;
use firmdex_core::{AddressId, CompanyId, DomainResult, TenantId};

use crate::validators;

/// Address kind. At most one `Billing` address may exist per company; all
/// other kinds are unrestricted in count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Office,
    #[default]
    Billing,
    Shipping,
    Warehouse,
    Factory,
    HeadOffice,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Office => "office",
            AddressType::Billing => "billing",
            AddressType::Shipping => "shipping",
            AddressType::Warehouse => "warehouse",
            AddressType::Factory => "factory",
            AddressType::HeadOffice => "head_office",
            AddressType::Other => "other",
        }
    }
}

impl core::fmt::Display for AddressType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Countries supported in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    #[default]
    Poland,
    Germany,
    France,
    Spain,
    Italy,
    Uk,
    Usa,
    Austria,
    Belgium,
    Netherlands,
    Switzerland,
    CzechRepublic,
    Slovakia,
    Hungary,
    Slovenia,
    Croatia,
    Bulgaria,
    Romania,
    Portugal,
    Sweden,
    Finland,
    Denmark,
    Norway,
    Ireland,
}

impl Country {
    /// Human-readable label used in formatted addresses.
    pub fn label(&self) -> &'static str {
        match self {
            Country::Poland => "Poland",
            Country::Germany => "Germany",
            Country::France => "France",
            Country::Spain => "Spain",
            Country::Italy => "Italy",
            Country::Uk => "United Kingdom",
            Country::Usa => "United States",
            Country::Austria => "Austria",
            Country::Belgium => "Belgium",
            Country::Netherlands => "Netherlands",
            Country::Switzerland => "Switzerland",
            Country::CzechRepublic => "Czech Republic",
            Country::Slovakia => "Slovakia",
            Country::Hungary => "Hungary",
            Country::Slovenia => "Slovenia",
            Country::Croatia => "Croatia",
            Country::Bulgaria => "Bulgaria",
            Country::Romania => "Romania",
            Country::Portugal => "Portugal",
            Country::Sweden => "Sweden",
            Country::Finland => "Finland",
            Country::Denmark => "Denmark",
            Country::Norway => "Norway",
            Country::Ireland => "Ireland",
        }
    }
}

/// A company address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(rename = "type")]
    pub kind: AddressType,
    pub company: CompanyId,
    /// Identifier for the address ("HQ", "North warehouse", …).
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: Country,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-settable fields for address creation.
///
/// `company` is deliberately absent: the owning company is forced to the
/// creator's tenant, never taken from the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressDraft {
    #[serde(rename = "type", default)]
    pub kind: AddressType,
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default)]
    pub country: Country,
}

impl AddressDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(firmdex_core::DomainError::validation("address name is required"));
        }
        // Postal-code shape is only constrained for Polish addresses.
        if self.country == Country::Poland {
            validators::validate_postal_code(&self.postal_code)?;
        }
        Ok(())
    }
}

/// Partial update for an address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    #[serde(rename = "type")]
    pub kind: Option<AddressType>,
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<Country>,
}

impl Address {
    /// Build a validated address owned by `company`.
    pub fn create(draft: AddressDraft, company: CompanyId) -> DomainResult<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: AddressId::new(),
            kind: draft.kind,
            company,
            name: draft.name,
            street: draft.street,
            city: draft.city,
            postal_code: draft.postal_code,
            country: draft.country,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, re-validating the postal code when it or the
    /// country changes. The owning company is not patchable.
    pub fn apply(&mut self, patch: AddressPatch) -> DomainResult<()> {
        let country = patch.country.unwrap_or(self.country);
        let postal_code = patch.postal_code.as_deref().unwrap_or(&self.postal_code);
        if country == Country::Poland {
            validators::validate_postal_code(postal_code)?;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(street) = patch.street {
            self.street = street;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(postal_code) = patch.postal_code {
            self.postal_code = postal_code;
        }
        if let Some(country) = patch.country {
            self.country = country;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Formatted multi-line address.
    pub fn full_address(&self) -> String {
        format!(
            "{}\n{} {}\n{}",
            self.street,
            self.postal_code,
            self.city,
            self.country.label()
        )
    }
}

impl TenantScoped for Address {
    fn tenant(&self) -> Option<TenantId> {
        Some(self.company.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: AddressType) -> AddressDraft {
        AddressDraft {
            kind,
            name: "HQ".to_string(),
            street: "ul. Prosta 51".to_string(),
            city: "Warszawa".to_string(),
            postal_code: "00-838".to_string(),
            country: Country::Poland,
        }
    }

    #[test]
    fn create_sets_owning_company() {
        let company = CompanyId::new();
        let address = Address::create(draft(AddressType::Office), company).unwrap();
        assert_eq!(address.company, company);
        assert_eq!(address.tenant(), Some(company.into()));
    }

    #[test]
    fn polish_postal_code_shape_is_enforced() {
        let mut bad = draft(AddressType::Billing);
        bad.postal_code = "00838".to_string();
        assert!(Address::create(bad, CompanyId::new()).is_err());

        let mut abroad = draft(AddressType::Billing);
        abroad.country = Country::Germany;
        abroad.postal_code = "10115".to_string();
        assert!(Address::create(abroad, CompanyId::new()).is_ok());
    }

    #[test]
    fn full_address_includes_country_label() {
        let address = Address::create(draft(AddressType::Office), CompanyId::new()).unwrap();
        assert_eq!(address.full_address(), "ul. Prosta 51\n00-838 Warszawa\nPoland");
    }

    #[test]
    fn address_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AddressType::HeadOffice).unwrap(),
            "\"head_office\""
        );
    }
}
