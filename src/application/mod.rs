//! Application layer: parsing, serialization and the configuration facade
//!
//! This layer turns text into domain trees and back, and owns file I/O.

pub mod configuration;
pub mod error;
pub mod error_ext;
pub mod parser;
pub mod registry;
pub mod serializer;

pub use configuration::Configuration;
pub use error::{ApplicationError, ApplicationResult, ParseError, ParseErrorKind};
pub use error_ext::IoResultExt;
pub use parser::{parse_reader, parse_str};
pub use registry::ConfigRegistry;
pub use serializer::serialize;
