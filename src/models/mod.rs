//! Model records and the operations over them
//!
//! - `registry`: the in-memory model store and record types
//! - `metadata`: stored metadata and the partial form patch
//! - `version`: `{base}_{seq}` version codec and legacy timestamp versions
//! - `validation`: model form validation
//! - `query`: filter, search and sort for the model table

pub mod metadata;
pub mod query;
pub mod registry;
pub mod validation;
pub mod version;

pub use metadata::{MetadataPatch, ModelMetadata};
pub use query::{FilterSpec, ModelStats, SortDirection, SortField, SortSpec, pin_associated, query};
pub use registry::{Model, ModelFormData, ModelRegistry, ModelStatus, ModelType, VersionStamp};
pub use validation::{FieldError, FormField, FormValidation, validate_model_form};
pub use version::{BaseModel, ParsedVersion, VersionOption};
