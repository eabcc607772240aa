pub mod account;
pub mod role;
