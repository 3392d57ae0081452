pub mod balance;
pub mod fee;
pub mod transfer;
