//! Core domain types.

pub mod ids;
pub mod records;

pub use ids::{DeliveryId, PrNumber, RepoId};
pub use records::{ChangeStatus, ChangedFile, MergeRecord, ModelChangeRecord};
