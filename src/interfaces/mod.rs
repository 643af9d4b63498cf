pub mod backend;
pub mod storage;
pub mod surface;
