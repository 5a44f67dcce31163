//! Country-specific identifier format checks.
//!
//! Pure format validation, no checksum arithmetic: the registry numbers are
//! verified for shape only, matching what the upstream registries accept as
//! input.

use std::sync::LazyLock;

use firmdex_core::{DomainError, DomainResult};
use regex::Regex;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?48?\d{9}$").expect("phone pattern"));
static NIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").expect("nip pattern"));
static REGON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9}(\d{5})?$").expect("regon pattern"));
static KRS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").expect("krs pattern"));
static POSTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{3}$").expect("postal pattern"));

/// Polish phone number, e.g. `+48123456789` or `123456789`.
pub fn validate_phone(value: &str) -> DomainResult<()> {
    check(&PHONE_RE, value, "enter a valid Polish phone number")
}

/// Tax identification number (NIP), 10 digits.
pub fn validate_nip(value: &str) -> DomainResult<()> {
    check(&NIP_RE, value, "enter a valid NIP number (10 digits)")
}

/// Statistical number (REGON), 9 or 14 digits.
pub fn validate_regon(value: &str) -> DomainResult<()> {
    check(&REGON_RE, value, "enter a valid REGON number (9 or 14 digits)")
}

/// National court register number (KRS), 10 digits.
pub fn validate_krs(value: &str) -> DomainResult<()> {
    check(&KRS_RE, value, "enter a valid KRS number (10 digits)")
}

/// Polish postal code, e.g. `00-950`.
pub fn validate_postal_code(value: &str) -> DomainResult<()> {
    check(&POSTAL_RE, value, "enter a valid postal code (e.g. 00-000)")
}

fn check(re: &Regex, value: &str, message: &str) -> DomainResult<()> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(DomainError::validation(message))
    }
}
