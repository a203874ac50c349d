mod sor_file;

pub use sor_file::{parse_from_bytes, parse_from_file};
