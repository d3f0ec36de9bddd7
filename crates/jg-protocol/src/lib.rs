pub mod field;
pub mod gelf;

pub use field::*;
pub use gelf::*;
