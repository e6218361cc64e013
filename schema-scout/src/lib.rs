//! Reads the catalog of a single Postgres schema and turns it into a
//! relationship-aware table model.
//!
//! The address-level entry points open one connection each, always release it,
//! and report unreachable databases as values rather than errors:
//!
//! * [`probe_connection`] - reachability plus the visible schemas.
//! * [`read_tables`] - the tables of one schema.
//! * [`synthesize`] - columns, keys and inferred relationship cardinality for a
//!   batch of tables.

#[cfg(all(test, feature = "pg_tests"))]
mod test_helpers;

mod catalog_reader;
mod connection_prober;
mod error;
mod metadata_synthesizer;
mod models;
mod postgres_client_wrapper;
mod type_normalizer;

pub use catalog_reader::*;
pub use connection_prober::*;
pub use error::*;
pub use metadata_synthesizer::*;
pub use models::*;
pub use postgres_client_wrapper::{FromRow, PostgresClientWrapper};
pub use type_normalizer::normalize;
