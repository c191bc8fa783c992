//! Scalar aliases shared by every crate.

/// Row id of roles, modules, employees and tickets. Stored as `BIGSERIAL`;
/// `role_modules` has no id of its own and is keyed by its
/// `(role_id, module_id)` pair.
pub type DbId = i64;

/// `TIMESTAMPTZ` columns such as `created_at` and `assigned_at`, and the
/// due time computed from a ticket's SLA.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
