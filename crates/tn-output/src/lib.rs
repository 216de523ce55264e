//! `tn-output` — network sinks.
//!
//! Two backends implement [`NetworkSink`]:
//!
//! | Backend      | Files created                                |
//! |--------------|----------------------------------------------|
//! | [`CsvSink`]  | `nodes.csv`, `edges.csv`, `composition.csv`  |
//! | [`MemorySink`] | none (rows collected in memory)            |
//!
//! Batches are atomic: a backend accepts all rows of a batch or none.

pub mod csv;
pub mod error;
pub mod memory;
pub mod sink;


pub use csv::CsvSink;
pub use error::{SinkError, SinkResult};
pub use memory::MemorySink;
pub use sink::NetworkSink;
