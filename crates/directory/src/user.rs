use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firmdex_auth::{Role, TenantScoped};
use firmdex_core::{CompanyId, DomainResult, PrincipalId, TenantId};

use crate::validators;

/// A user profile scoped to a company.
///
/// The `company` reference is nullable — a principal may be unaffiliated —
/// and protected: a company with affiliated users cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: PrincipalId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub company: Option<CompanyId>,
    pub position: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-settable fields for user creation.
///
/// `company` is deliberately absent: a new user is always affiliated with
/// the creator's own company.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
}

impl UserDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.username.trim().is_empty() {
            return Err(firmdex_core::DomainError::validation("username is required"));
        }
        if !self.email.contains('@') {
            return Err(firmdex_core::DomainError::validation("enter a valid email address"));
        }
        if let Some(phone) = &self.phone_number {
            validators::validate_phone(phone)?;
        }
        Ok(())
    }
}

/// Partial update for a user profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub role: Option<Role>,
    pub position: Option<String>,
    pub department: Option<String>,
}

impl UserProfile {
    /// Build a validated profile affiliated with `company`.
    pub fn create(draft: UserDraft, company: Option<CompanyId>) -> DomainResult<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: PrincipalId::new(),
            username: draft.username,
            email: draft.email,
            first_name: draft.first_name,
            last_name: draft.last_name,
            phone_number: draft.phone_number,
            role: draft.role,
            company,
            position: draft.position,
            department: draft.department,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, re-validating changed fields.
    ///
    /// The company affiliation is not patchable through this path.
    pub fn apply(&mut self, patch: UserPatch) -> DomainResult<()> {
        if let Some(email) = &patch.email {
            if !email.contains('@') {
                return Err(firmdex_core::DomainError::validation("enter a valid email address"));
            }
        }
        if let Some(Some(phone)) = &patch.phone_number {
            validators::validate_phone(phone)?;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl TenantScoped for UserProfile {
    fn tenant(&self) -> Option<TenantId> {
        self.company.map(Into::into)
    }
}
