pub mod error;
pub mod parser;
pub mod predicate;

pub use error::ParseError;
pub use parser::{parse, parse_with_symbols};
pub use predicate::{parse_predicate, Predicate, KNOWN_FLAGS};
