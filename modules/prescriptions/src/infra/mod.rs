pub mod interactions;
pub mod storage;
