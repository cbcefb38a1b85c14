//! Field Schema Domain
//!
//! This crate implements the dynamic field catalog for accounts and related
//! entities. An account is not a fixed row shape: which fields exist, which
//! are required, and how they validate is driven by a static registry loaded
//! once at startup and injected wherever it is needed.
//!
//! # Key Concepts
//!
//! - **FieldDefinition**: one entry in the catalog (name, data type, input
//!   hint, category, required flag, validation rule)
//! - **TargetKind**: the entity kind a field set belongs to (account,
//!   institution, trust, business, individual)
//! - **FieldSchemaRegistry**: the immutable catalog, with shared entity
//!   fields merged into composite kinds
//! - **RequirementResolver**: merges the shared baseline with an account
//!   type's own schema to produce the authoritative required/optional sets

pub mod error;
pub mod fields;
pub mod registry;
pub mod requirements;

pub use error::SchemaError;
pub use fields::{FieldDataType, FieldDefinition, FieldValue};
pub use registry::{FieldSchemaRegistry, TargetKind};
pub use requirements::{FieldPresence, FieldRequirements, RequirementResolver, TypeFieldSchema};
