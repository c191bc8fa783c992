//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Repositories that enforce domain
//! rules before writing return [`DbError`](crate::error::DbError); the rest
//! return `sqlx::Error` directly.

pub mod employee_repo;
pub mod module_repo;
pub mod role_module_repo;
pub mod role_repo;
pub mod ticket_repo;

pub use employee_repo::EmployeeRepo;
pub use module_repo::ModuleRepo;
pub use role_module_repo::RoleModuleRepo;
pub use role_repo::RoleRepo;
pub use ticket_repo::TicketRepo;
