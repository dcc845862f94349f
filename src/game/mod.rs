pub mod board;
pub mod constants;
pub mod input;
pub mod session;
pub mod types;
