//! Domain layer: tree model, paths, fan-out queries and scalar views
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod display;
pub mod error;
pub mod path;
pub mod query;
pub mod value;

pub use arena::{ConfigNode, ConfigTree, NodeData, NodeKind, SectionId, ROOT_NAME};
pub use display::TreeNodeConvert;
pub use error::DomainError;
pub use path::ConfigPath;
pub use value::{leaf_text, ConfigValue};
