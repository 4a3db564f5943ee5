pub mod decode;
pub mod error;
pub mod peaks;
pub mod spectrum;
