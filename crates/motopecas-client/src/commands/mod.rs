pub(crate) mod common;
pub mod compare;
pub mod dash;
pub mod employee;
pub mod fee;
pub mod import;
pub mod transaction;
