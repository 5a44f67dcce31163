//! Directory record storage: companies, addresses, users.

use std::collections::HashMap;
use std::sync::RwLock;

use firmdex_core::{AddressId, CompanyId, DomainError, DomainResult, PrincipalId};
use firmdex_directory::{Address, AddressType, Company, UserProfile};

/// Storage port for directory records.
///
/// The store owns the instance-set invariants: field-level validation lives
/// in the record constructors, but uniqueness (tax id, billing address) and
/// reference protection need the whole set and are enforced here.
pub trait DirectoryStore: Send + Sync {
    fn insert_company(&self, company: Company) -> DomainResult<Company>;
    fn get_company(&self, id: CompanyId) -> Option<Company>;
    fn list_companies(&self) -> Vec<Company>;
    fn update_company(&self, company: Company) -> DomainResult<Company>;
    /// Rejected while affiliated users exist; cascades the company's addresses.
    fn delete_company(&self, id: CompanyId) -> DomainResult<()>;

    fn insert_address(&self, address: Address) -> DomainResult<Address>;
    fn get_address(&self, id: AddressId) -> Option<Address>;
    fn list_addresses(&self) -> Vec<Address>;
    fn update_address(&self, address: Address) -> DomainResult<Address>;
    fn delete_address(&self, id: AddressId) -> DomainResult<()>;

    fn insert_user(&self, user: UserProfile) -> DomainResult<UserProfile>;
    fn get_user(&self, id: PrincipalId) -> Option<UserProfile>;
    fn list_users(&self) -> Vec<UserProfile>;
    fn update_user(&self, user: UserProfile) -> DomainResult<UserProfile>;
    /// Rejected while the principal owns a company.
    fn delete_user(&self, id: PrincipalId) -> DomainResult<()>;
}

/// In-memory directory store for dev/test.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    inner: RwLock<DirectoryTables>,
}

#[derive(Debug, Default)]
struct DirectoryTables {
    companies: HashMap<CompanyId, Company>,
    addresses: HashMap<AddressId, Address>,
    users: HashMap<PrincipalId, UserProfile>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DirectoryTables {
    fn check_company_uniqueness(&self, candidate: &Company) -> DomainResult<()> {
        for existing in self.companies.values() {
            if existing.id == candidate.id {
                continue;
            }
            if existing.tax_id == candidate.tax_id {
                return Err(DomainError::conflict("a company with this tax id already exists"));
            }
            if existing.email == candidate.email {
                return Err(DomainError::conflict("a company with this email already exists"));
            }
            if existing.national_court_register == candidate.national_court_register {
                return Err(DomainError::conflict("a company with this KRS number already exists"));
            }
        }
        Ok(())
    }

    fn check_billing_uniqueness(&self, candidate: &Address) -> DomainResult<()> {
        if candidate.kind != AddressType::Billing {
            return Ok(());
        }
        let duplicate = self.addresses.values().any(|existing| {
            existing.id != candidate.id
                && existing.company == candidate.company
                && existing.kind == AddressType::Billing
        });
        if duplicate {
            return Err(DomainError::conflict(
                "a billing address already exists for this company",
            ));
        }
        Ok(())
    }

    fn check_user_uniqueness(&self, candidate: &UserProfile) -> DomainResult<()> {
        for existing in self.users.values() {
            if existing.id == candidate.id {
                continue;
            }
            if existing.username == candidate.username {
                return Err(DomainError::conflict("username is taken"));
            }
            if existing.email == candidate.email {
                return Err(DomainError::conflict("a user with this email already exists"));
            }
        }
        Ok(())
    }
}

impl DirectoryStore for InMemoryDirectoryStore {
    fn insert_company(&self, company: Company) -> DomainResult<Company> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.check_company_uniqueness(&company)?;
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    fn get_company(&self, id: CompanyId) -> Option<Company> {
        let tables = self.inner.read().ok()?;
        tables.companies.get(&id).cloned()
    }

    fn list_companies(&self) -> Vec<Company> {
        self.inner
            .read()
            .map(|tables| tables.companies.values().cloned().collect())
            .unwrap_or_default()
    }

    fn update_company(&self, company: Company) -> DomainResult<Company> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.companies.contains_key(&company.id) {
            return Err(DomainError::not_found());
        }
        tables.check_company_uniqueness(&company)?;
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    fn delete_company(&self, id: CompanyId) -> DomainResult<()> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.companies.contains_key(&id) {
            return Err(DomainError::not_found());
        }
        let affiliated = tables.users.values().any(|u| u.company == Some(id));
        if affiliated {
            tracing::debug!(company = %id, "delete rejected: affiliated users exist");
            return Err(DomainError::protected(
                "company still has affiliated users",
            ));
        }
        tables.companies.remove(&id);
        // Addresses belong solely to the company; they go with it.
        tables.addresses.retain(|_, a| a.company != id);
        Ok(())
    }

    fn insert_address(&self, address: Address) -> DomainResult<Address> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.companies.contains_key(&address.company) {
            return Err(DomainError::validation("company does not exist"));
        }
        tables.check_billing_uniqueness(&address)?;
        tables.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    fn get_address(&self, id: AddressId) -> Option<Address> {
        let tables = self.inner.read().ok()?;
        tables.addresses.get(&id).cloned()
    }

    fn list_addresses(&self) -> Vec<Address> {
        self.inner
            .read()
            .map(|tables| tables.addresses.values().cloned().collect())
            .unwrap_or_default()
    }

    fn update_address(&self, address: Address) -> DomainResult<Address> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.addresses.contains_key(&address.id) {
            return Err(DomainError::not_found());
        }
        tables.check_billing_uniqueness(&address)?;
        tables.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    fn delete_address(&self, id: AddressId) -> DomainResult<()> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables
            .addresses
            .remove(&id)
            .map(|_| ())
            .ok_or_else(DomainError::not_found)
    }

    fn insert_user(&self, user: UserProfile) -> DomainResult<UserProfile> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.check_user_uniqueness(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn get_user(&self, id: PrincipalId) -> Option<UserProfile> {
        let tables = self.inner.read().ok()?;
        tables.users.get(&id).cloned()
    }

    fn list_users(&self) -> Vec<UserProfile> {
        self.inner
            .read()
            .map(|tables| tables.users.values().cloned().collect())
            .unwrap_or_default()
    }

    fn update_user(&self, user: UserProfile) -> DomainResult<UserProfile> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.users.contains_key(&user.id) {
            return Err(DomainError::not_found());
        }
        tables.check_user_uniqueness(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn delete_user(&self, id: PrincipalId) -> DomainResult<()> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.users.contains_key(&id) {
            return Err(DomainError::not_found());
        }
        let owns_company = tables.companies.values().any(|c| c.owner == id);
        if owns_company {
            tracing::debug!(user = %id, "delete rejected: principal owns a company");
            return Err(DomainError::protected("principal owns a company"));
        }
        tables.users.remove(&id);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DomainError {
    DomainError::invariant("directory store lock poisoned")
}
