//! Domain logic shared by the database and HTTP layers.
//!
//! Nothing in this crate performs I/O: it defines the id and timestamp
//! types, the error taxonomy, the capability model behind the permission
//! matrix, ticket enumerations, module-tree rules, and the declarative
//! default access configuration loaded by the seed step.

pub mod error;
pub mod module_tree;
pub mod permissions;
pub mod roles;
pub mod seed;
pub mod tickets;
pub mod types;
