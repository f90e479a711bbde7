pub mod ops;
pub mod wire;
