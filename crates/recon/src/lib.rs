//! `avsaudit-recon`: operator/AVS snapshot reconciliation engine.
//!
//! Pure engine crate: loads JSON exports, indexes the reference collection
//! and reports subject records it cannot account for. No CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod load;
pub mod model;

pub use config::{FieldMapping, KeyTransform, ReconConfig};
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use index::GroupIndex;
pub use load::{load_records, load_records_from_path};
pub use model::{Mismatch, MismatchKind, ReconInput, ReconReport, Record};
