mod error;
pub use error::{Error, IntoError};

pub mod config;
pub use config::Config;

pub mod dialect;
pub use dialect::Dialect;

pub mod registry;
pub use registry::StatementRegistry;

pub mod schema;
pub use schema::Metamodel;

pub mod stmt;

/// A Result type alias that uses tabula's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
