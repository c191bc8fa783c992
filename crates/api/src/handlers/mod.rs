pub mod employees;
pub mod modules;
pub mod permissions;
pub mod roles;
pub mod tickets;
