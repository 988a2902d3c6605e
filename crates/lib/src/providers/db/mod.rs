pub mod memory;
pub mod sqlite;
pub mod storage;
