//! Schemes and model associations

pub mod association;
pub mod registry;

pub use association::{Association, AssociationConfig, check_priority};
pub use registry::{Scheme, SchemeRegistry, SchemeView};
