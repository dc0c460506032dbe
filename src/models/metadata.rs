//! Model metadata
//!
//! `ModelMetadata` is the stored record; `MetadataPatch` is the partial form
//! input that is validated and then merged over it.

use serde::{Deserialize, Serialize};

/// Metadata attached to every model record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    /// Artifact size in bytes
    pub size: u64,

    /// Accuracy in [0, 1]
    pub accuracy: f64,

    /// Framework name (e.g., "PyTorch", "TensorFlow")
    pub framework: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_dataset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_shape: Option<Vec<u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_shape: Option<Vec<u32>>,

    /// Parameter count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<u64>,
}

/// Partial metadata as submitted through the model form
///
/// `size` and `accuracy` stay as raw floats so the validator can reject
/// negative or NaN input before anything is stored. A field left as `None`
/// is "not yet provided" and is neither validated nor merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_dataset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_shape: Option<Vec<u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_shape: Option<Vec<u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<u64>,
}

impl MetadataPatch {
    /// Merge the provided fields over `base`, leaving absent fields untouched
    pub fn apply_to(&self, base: &mut ModelMetadata) {
        if let Some(size) = self.size {
            base.size = size_to_bytes(size);
        }
        if let Some(accuracy) = self.accuracy {
            base.accuracy = accuracy;
        }
        if let Some(ref framework) = self.framework {
            base.framework = framework.clone();
        }
        if self.description.is_some() {
            base.description = self.description.clone();
        }
        if self.author.is_some() {
            base.author = self.author.clone();
        }
        if self.license.is_some() {
            base.license = self.license.clone();
        }
        if self.training_dataset.is_some() {
            base.training_dataset = self.training_dataset.clone();
        }
        if self.input_shape.is_some() {
            base.input_shape = self.input_shape.clone();
        }
        if self.output_shape.is_some() {
            base.output_shape = self.output_shape.clone();
        }
        if self.parameters.is_some() {
            base.parameters = self.parameters;
        }
    }

    /// Build a fresh metadata record; absent size/accuracy/framework become 0/0/""
    pub fn into_metadata(self) -> ModelMetadata {
        let mut metadata = ModelMetadata::default();
        self.apply_to(&mut metadata);
        metadata
    }
}

// The validator has already bounded `size` to [0, 10GiB]; `as` saturates anything else.
fn size_to_bytes(size: f64) -> u64 {
    size.round() as u64
}
