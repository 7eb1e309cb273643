pub mod board;
pub mod led;
