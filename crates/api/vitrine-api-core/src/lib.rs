//! vitrine-api-core: element keys and DOM writes (core, host-agnostic)
//!
//! Cores never hold DOM nodes. Hosts hand them opaque [`ElementKey`]s and
//! apply the [`WriteBatch`] each tick produces.

pub mod key;
pub mod numeric;
pub mod resolver;
pub mod write_ops;

pub use key::{ElementKey, KeyError};
pub use numeric::{parse_float, parse_int};
pub use resolver::ElementResolver;
pub use write_ops::{DomWrite, WriteBatch, WriteOp};
