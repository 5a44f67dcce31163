//! `firmdex-directory` — the business-directory domain.
//!
//! Companies, their addresses, and company-scoped user profiles. Records are
//! plain data with validating constructors; instance-set invariants (billing
//! uniqueness, protected references) are enforced by the store that owns the
//! instance set.

pub mod address;
pub mod company;
pub mod user;
pub mod validators;

pub use address::{Address, AddressDraft, AddressPatch, AddressType, Country};
pub use company::{Company, CompanyDraft, CompanyPatch};
pub use user::{UserDraft, UserPatch, UserProfile};
