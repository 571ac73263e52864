//! Well-known role names supplied by the identity gateway.

/// Back-office operator with full access to forms, catalog and reservations.
pub const ROLE_ADMIN: &str = "admin";

/// Regular signed-in client.
pub const ROLE_USER: &str = "user";
