//! evograph-core library.
//!
//! An ancestry forest of animals: every node points at zero or one ancestor,
//! nodes with a scientific name are leaf species, and everything else is an
//! intermediate taxon.
//!
//! - [`store`]: the [`AncestryStore`] that owns the nodes and enforces the
//!   forest invariants on every write.
//! - [`graph`]: the stateless query engine (ancestor chains, lowest common
//!   ancestor, graph projection) over any [`graph::AncestryView`].
//! - [`enrichment`]: deferred descriptive enrichment of new species.
//! - [`config`], [`lock`], [`snapshot`]: project configuration, advisory
//!   file locks, and on-disk persistence for the CLI.
//!
//! # Conventions
//!
//! - **Errors**: domain failures are [`AncestryError`]; infrastructure
//!   failures use `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod enrichment;
pub mod error;
pub mod graph;
pub mod lock;
pub mod model;
pub mod snapshot;
pub mod store;

pub use error::{AncestryError, ErrorCode};
pub use model::{AnimalId, AnimalNode, Attributes, NewAnimal};
pub use store::{AncestryStore, CreateOutcome, Deletion, Forest};
