//! Well-known built-in roles.
//!
//! These must match the `roles` list in `seeds/default_access.json`.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MANAGER: &str = "Manager";
pub const ROLE_USER: &str = "User";
pub const ROLE_HR: &str = "HR";

pub const ROLE_ADMIN_ID: DbId = 1;
pub const ROLE_MANAGER_ID: DbId = 2;
pub const ROLE_USER_ID: DbId = 3;
pub const ROLE_HR_ID: DbId = 4;

/// Built-in roles as `(id, name)` pairs, in id order.
pub const BUILT_IN_ROLES: &[(DbId, &str)] = &[
    (ROLE_ADMIN_ID, ROLE_ADMIN),
    (ROLE_MANAGER_ID, ROLE_MANAGER),
    (ROLE_USER_ID, ROLE_USER),
    (ROLE_HR_ID, ROLE_HR),
];
