//! Commands for a replicated key-value store that also exposes CRDT data types.
//!
//! Each operation is a [`Command`]: a builder validates the options, the command maps them to a
//! protocol-buffer request, and the reply is decoded into a typed response. Sending the request is
//! left to an [`Executor`], which owns the connection, framing, retries, and node selection.
//!
//! ```ignore
//! use kvdt::crdt::UpdateCounterBuilder;
//!
//! let mut command = UpdateCounterBuilder::new()
//!     .with_bucket_type("counters")
//!     .with_bucket("hits")
//!     .with_increment(1)
//!     .build()?;
//! kvdt::execute(&executor, &mut command).await?;
//! let generated_key = &command.response().expect("decoded").generated_key;
//! ```

// Lints that are enabled for this crate are in Cargo.toml.

mod command;
pub mod crdt;
mod error;
mod executor;
mod internal_macros;
pub mod kv;
mod location;
pub(crate) mod options;
pub mod proto;
mod tracing_shim;

pub use self::command::{Command, RequestDescriptor};
pub use self::error::{Error, ValidationError};
pub use self::executor::{execute, Executor, RawResponse};
pub use self::location::Location;

/// The result of an operation in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
