//! Response shaping.

use serde_json::json;

use firmdex_directory::{Address, Company, UserProfile};

pub fn company_to_json(company: &Company) -> serde_json::Value {
    json!({
        "id": company.id,
        "name": company.name,
        "tax_id": company.tax_id,
        "statistical_number": company.statistical_number,
        "national_court_register": company.national_court_register,
        "email": company.email,
        "phone": company.phone,
        "website": company.website,
        "owner": company.owner,
        "created_at": company.created_at,
        "updated_at": company.updated_at,
    })
}

pub fn address_to_json(address: &Address) -> serde_json::Value {
    json!({
        "id": address.id,
        "type": address.kind,
        "company": address.company,
        "name": address.name,
        "street": address.street,
        "city": address.city,
        "postal_code": address.postal_code,
        "country": address.country,
        "full_address": address.full_address(),
        "created_at": address.created_at,
        "updated_at": address.updated_at,
    })
}

pub fn user_to_json(user: &UserProfile, company_name: Option<&str>) -> serde_json::Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "phone_number": user.phone_number,
        "role": user.role,
        "company": user.company,
        "company_name": company_name,
        "position": user.position,
        "department": user.department,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}
