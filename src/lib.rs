//! Model Manager - Admin registry for segmentation and detection models
//!
//! Keeps model records and their metadata, versions them with a
//! `{base_model}_{sequence}` scheme, validates edits, and links models to
//! runtime schemes with per-association priorities. Everything is served
//! over a small REST API.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod schemes;
pub mod seed;

pub use config::ManagerConfig;
pub use error::{ManagerError, ManagerResult};
pub use models::{Model, ModelFormData, ModelRegistry, ModelStatus, ModelType};
pub use schemes::{Association, Scheme, SchemeRegistry};
