pub mod bench;
pub mod classify;
