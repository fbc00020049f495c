pub mod admin_operations;
pub mod operation;
