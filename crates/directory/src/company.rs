use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firmdex_auth::TenantScoped;
use firmdex_core::{CompanyId, DomainResult, PrincipalId, TenantId};

use crate::validators;

/// A company record.
///
/// The company is the tenant boundary: its id *is* the tenant id of every
/// resource scoped under it. The `owner` principal is a protected reference —
/// the owning principal cannot be deleted while the company exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// Tax identification number (NIP), unique.
    pub tax_id: String,
    /// Statistical number (REGON).
    pub statistical_number: String,
    /// National court register number (KRS), unique.
    pub national_court_register: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub owner: PrincipalId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-settable fields for company creation.
///
/// `owner` is deliberately absent: it is forced to the creating principal.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    pub tax_id: String,
    pub statistical_number: String,
    pub national_court_register: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

impl CompanyDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(firmdex_core::DomainError::validation("company name is required"));
        }
        if !self.email.contains('@') {
            return Err(firmdex_core::DomainError::validation("enter a valid email address"));
        }
        validators::validate_nip(&self.tax_id)?;
        validators::validate_regon(&self.statistical_number)?;
        validators::validate_krs(&self.national_court_register)?;
        validators::validate_phone(&self.phone)?;
        Ok(())
    }
}

/// Partial update for a company.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub statistical_number: Option<String>,
    pub national_court_register: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl Company {
    /// Build a validated company. `owner` comes from the creating principal,
    /// never from the client payload.
    pub fn create(draft: CompanyDraft, owner: PrincipalId) -> DomainResult<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: CompanyId::new(),
            name: draft.name,
            tax_id: draft.tax_id,
            statistical_number: draft.statistical_number,
            national_court_register: draft.national_court_register,
            email: draft.email,
            phone: draft.phone,
            website: draft.website,
            owner,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, re-validating changed fields.
    pub fn apply(&mut self, patch: CompanyPatch) -> DomainResult<()> {
        if let Some(tax_id) = &patch.tax_id {
            validators::validate_nip(tax_id)?;
        }
        if let Some(regon) = &patch.statistical_number {
            validators::validate_regon(regon)?;
        }
        if let Some(krs) = &patch.national_court_register {
            validators::validate_krs(krs)?;
        }
        if let Some(phone) = &patch.phone {
            validators::validate_phone(phone)?;
        }
        if let Some(email) = &patch.email {
            if !email.contains('@') {
                return Err(firmdex_core::DomainError::validation("enter a valid email address"));
            }
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(tax_id) = patch.tax_id {
            self.tax_id = tax_id;
        }
        if let Some(regon) = patch.statistical_number {
            self.statistical_number = regon;
        }
        if let Some(krs) = patch.national_court_register {
            self.national_court_register = krs;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(website) = patch.website {
            self.website = website;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The tenant this company constitutes.
    pub fn tenant_id(&self) -> TenantId {
        self.id.into()
    }
}

impl TenantScoped for Company {
    fn tenant(&self) -> Option<TenantId> {
        Some(self.tenant_id())
    }
}
