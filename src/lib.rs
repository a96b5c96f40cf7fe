//! castor: nested section configuration files.
//!
//! ```text
//! [server]
//!     port = 8080
//!     [route]
//!         path = /a
//!     [!route]
//!     [route]
//!         path = /b
//!     [!route]
//! [!server]
//! ```
//!
//! Sibling sections and keys may repeat, and one query path fans out to
//! every match:
//!
//! ```
//! use castor::Configuration;
//!
//! let text = "[server]\n[route] path = /a [!route]\n[route] path = /b [!route]\n[!server]\n";
//! let config = Configuration::from_content("server.conf", text).unwrap();
//! let paths: Vec<String> = config.get_all("server.route.path").unwrap();
//! assert_eq!(paths, vec!["/a", "/b"]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{
    ApplicationError, ApplicationResult, ConfigRegistry, Configuration, ParseError,
    ParseErrorKind,
};
pub use domain::{ConfigPath, ConfigTree, ConfigValue, DomainError, NodeKind};
