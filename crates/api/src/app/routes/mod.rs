pub mod addresses;
pub mod common;
pub mod companies;
pub mod me;
pub mod rbac;
pub mod users;
