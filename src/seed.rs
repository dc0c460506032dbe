//! Demo data loaded at startup when seeding is enabled

use crate::models::{Model, ModelMetadata, ModelStatus, ModelType};
use crate::schemes::{Association, AssociationConfig, Scheme};
use chrono::{DateTime, TimeZone, Utc};

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

struct SeedMetadata {
    size: u64,
    accuracy: f64,
    framework: &'static str,
    description: &'static str,
    author: &'static str,
    license: &'static str,
    training_dataset: &'static str,
    input_shape: &'static [u32],
    output_shape: &'static [u32],
    parameters: u64,
}

impl From<SeedMetadata> for ModelMetadata {
    fn from(seed: SeedMetadata) -> Self {
        ModelMetadata {
            size: seed.size,
            accuracy: seed.accuracy,
            framework: seed.framework.to_string(),
            description: Some(seed.description.to_string()),
            author: Some(seed.author.to_string()),
            license: Some(seed.license.to_string()),
            training_dataset: Some(seed.training_dataset.to_string()),
            input_shape: Some(seed.input_shape.to_vec()),
            output_shape: Some(seed.output_shape.to_vec()),
            parameters: Some(seed.parameters),
        }
    }
}

/// Eight demo models covering both types and all three statuses
pub fn mock_models() -> Vec<Model> {
    vec![
        Model {
            id: "model-1".to_string(),
            name: "YOLOv8-Segmentation".to_string(),
            model_type: ModelType::Segmentation,
            version: "YOLOv8_1".to_string(),
            timestamp: at(2024, 12, 15, 9, 30),
            tags: tags(&[
                "upper-1",
                "bulk-region",
                "core-region",
                "edge-defect",
                "surface-scratch",
                "bubble",
                "stain",
                "deformation",
                "crack",
                "breakage",
                "color-shift",
                "foreign-matter",
                "dent",
                "bulge",
                "burr",
                "rust",
                "corrosion",
                "wear",
                "fracture",
                "looseness",
                "offset",
                "misalignment",
                "missing-part",
                "excess-part",
                "size-anomaly",
                "shape-anomaly",
                "texture-anomaly",
                "gloss-anomaly",
                "opacity-anomaly",
                "thickness-anomaly",
            ]),
            status: ModelStatus::Active,
            metadata: SeedMetadata {
                size: 52_428_800,
                accuracy: 0.892,
                framework: "PyTorch",
                description: "Instance segmentation built on YOLOv8 for real-time scenes, covers 30 defect types",
                author: "AI Team",
                license: "MIT",
                training_dataset: "COCO 2017",
                input_shape: &[3, 640, 640],
                output_shape: &[8400, 84],
                parameters: 11_173_632,
            }
            .into(),
        },
        Model {
            id: "model-2".to_string(),
            name: "DeepLab-v3-Plus".to_string(),
            model_type: ModelType::Segmentation,
            version: "deeplab_3".to_string(),
            timestamp: at(2024, 12, 10, 16, 45),
            tags: tags(&["upper-2", "lower-1", "edge-region"]),
            status: ModelStatus::Active,
            metadata: SeedMetadata {
                size: 104_857_600,
                accuracy: 0.945,
                framework: "TensorFlow",
                description: "Semantic segmentation network designed for medical imaging",
                author: "Medical AI Lab",
                license: "Apache 2.0",
                training_dataset: "Medical Segmentation Dataset",
                input_shape: &[1, 512, 512, 3],
                output_shape: &[1, 512, 512, 21],
                parameters: 59_342_976,
            }
            .into(),
        },
        Model {
            id: "model-3".to_string(),
            name: "RCNN-Detection-v2".to_string(),
            model_type: ModelType::Detection,
            version: "fasterrcnn_1".to_string(),
            timestamp: at(2024, 12, 8, 11, 20),
            tags: tags(&["upper-3", "lower-2", "key-node"]),
            status: ModelStatus::Active,
            metadata: SeedMetadata {
                size: 78_643_200,
                accuracy: 0.876,
                framework: "PyTorch",
                description: "Improved RCNN object detector for industrial quality inspection",
                author: "Industrial AI Team",
                license: "BSD-3-Clause",
                training_dataset: "Industrial Defect Dataset",
                input_shape: &[3, 800, 800],
                output_shape: &[1000, 5],
                parameters: 41_943_040,
            }
            .into(),
        },
        Model {
            id: "model-4".to_string(),
            name: "MobileNet-SSD".to_string(),
            model_type: ModelType::Detection,
            version: "bisegnet_1".to_string(),
            timestamp: at(2024, 12, 5, 14, 15),
            tags: tags(&["upper-4", "lower-3", "auxiliary-region"]),
            status: ModelStatus::Archived,
            metadata: SeedMetadata {
                size: 26_214_400,
                accuracy: 0.734,
                framework: "TensorFlow Lite",
                description: "Lightweight object detector for mobile devices",
                author: "Mobile AI Team",
                license: "MIT",
                training_dataset: "PASCAL VOC",
                input_shape: &[1, 300, 300, 3],
                output_shape: &[1, 1917, 4],
                parameters: 6_802_816,
            }
            .into(),
        },
        Model {
            id: "model-5".to_string(),
            name: "U-Net-Medical".to_string(),
            model_type: ModelType::Segmentation,
            version: "unet_2".to_string(),
            timestamp: at(2024, 12, 1, 10, 30),
            tags: tags(&["lower-4", "bulk-region", "main-region"]),
            status: ModelStatus::Deprecated,
            metadata: SeedMetadata {
                size: 67_108_864,
                accuracy: 0.912,
                framework: "Keras",
                description: "U-Net dedicated to medical image segmentation",
                author: "Biomedical AI Lab",
                license: "GPL-3.0",
                training_dataset: "Medical Image Segmentation Challenge",
                input_shape: &[1, 256, 256, 1],
                output_shape: &[1, 256, 256, 1],
                parameters: 31_030_337,
            }
            .into(),
        },
        Model {
            id: "model-6".to_string(),
            name: "EfficientDet-D4".to_string(),
            model_type: ModelType::Detection,
            version: "YOLOv11_1".to_string(),
            timestamp: at(2024, 11, 28, 13, 45),
            tags: tags(&["upper-1", "upper-2", "joint-region"]),
            status: ModelStatus::Active,
            metadata: SeedMetadata {
                size: 83_886_080,
                accuracy: 0.901,
                framework: "PyTorch",
                description: "Efficient object detector from the EfficientDet family",
                author: "Vision AI Team",
                license: "Apache 2.0",
                training_dataset: "COCO 2017",
                input_shape: &[3, 1024, 1024],
                output_shape: &[49104, 90],
                parameters: 20_723_616,
            }
            .into(),
        },
        Model {
            id: "model-7".to_string(),
            name: "Mask-RCNN-Instance".to_string(),
            model_type: ModelType::Segmentation,
            version: "maskrcnn_4".to_string(),
            timestamp: at(2024, 11, 25, 8, 20),
            tags: tags(&["lower-1", "lower-2", "transition-region"]),
            status: ModelStatus::Active,
            metadata: SeedMetadata {
                size: 157_286_400,
                accuracy: 0.923,
                framework: "PyTorch",
                description: "Mask R-CNN instance segmentation with multi-object detection",
                author: "Computer Vision Lab",
                license: "MIT",
                training_dataset: "COCO 2017",
                input_shape: &[3, 1024, 1024],
                output_shape: &[100, 81],
                parameters: 44_177_280,
            }
            .into(),
        },
        Model {
            id: "model-8".to_string(),
            name: "YOLO-NAS-Detection".to_string(),
            model_type: ModelType::Detection,
            version: "YOLOv8_5".to_string(),
            timestamp: at(2024, 11, 20, 15, 10),
            tags: tags(&["upper-3", "upper-4", "special-region"]),
            status: ModelStatus::Active,
            metadata: SeedMetadata {
                size: 94_371_840,
                accuracy: 0.887,
                framework: "PyTorch",
                description: "Next-generation YOLO detector found by neural architecture search",
                author: "NAS Research Team",
                license: "Apache 2.0",
                training_dataset: "COCO 2017 + Custom Dataset",
                input_shape: &[3, 640, 640],
                output_shape: &[8400, 84],
                parameters: 47_020_736,
            }
            .into(),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn scheme(
    id: &str,
    name: &str,
    description: &str,
    is_active: bool,
    priority: i32,
    category: &str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Scheme {
    Scheme {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        is_active,
        priority,
        category: Some(category.to_string()),
        created_at,
        updated_at,
    }
}

/// Three demo schemes; `scheme-1` is active
pub fn mock_schemes() -> Vec<Scheme> {
    vec![
        scheme(
            "scheme-1",
            "Electronic Component Inspection A",
            "Full quality inspection of PCB components: missing parts, misplacement, reversed polarity",
            true,
            9,
            "Electronics Manufacturing",
            at(2024, 1, 10, 8, 30),
            at(2024, 1, 15, 14, 20),
        ),
        scheme(
            "scheme-2",
            "Medical Imaging Analysis",
            "Image analysis and lesion detection for medical devices across common imaging formats",
            false,
            8,
            "Medical Imaging",
            at(2024, 1, 5, 10, 15),
            at(2024, 1, 12, 16, 45),
        ),
        scheme(
            "scheme-3",
            "General Defect Detection",
            "Surface defect detection for assorted industrial products: scratches, dents, stains",
            false,
            7,
            "Industrial Inspection",
            at(2023, 12, 20, 9, 0),
            at(2024, 1, 8, 11, 30),
        ),
    ]
}

fn association(
    model_id: &str,
    priority: u8,
    is_enabled: bool,
    associated_at: DateTime<Utc>,
    config: AssociationConfig,
) -> Association {
    Association {
        model_id: model_id.to_string(),
        scheme_id: "scheme-1".to_string(),
        priority,
        is_enabled,
        associated_at,
        config: Some(config),
    }
}

/// Associations of `scheme-1`; the `model-6` row is disabled
pub fn mock_associations() -> Vec<Association> {
    vec![
        association(
            "model-1",
            9,
            true,
            at(2024, 1, 15, 14, 20),
            AssociationConfig {
                weight: Some(0.8),
                threshold: Some(0.75),
                notes: Some("Primary component outline segmentation".to_string()),
            },
        ),
        association(
            "model-3",
            8,
            true,
            at(2024, 1, 15, 14, 25),
            AssociationConfig {
                weight: Some(0.7),
                threshold: Some(0.8),
                notes: Some("Defect detection paired with the segmentation model".to_string()),
            },
        ),
        association(
            "model-6",
            6,
            false,
            at(2024, 1, 15, 14, 30),
            AssociationConfig {
                weight: Some(0.6),
                threshold: Some(0.7),
                notes: Some("Fallback detector, currently disabled".to_string()),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::ModelStats;
    use std::collections::HashSet;

    #[test]
    fn test_mock_model_ids_are_unique() {
        let models = mock_models();
        let ids: HashSet<_> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), models.len());
    }

    #[test]
    fn test_mock_model_mix() {
        let models = mock_models();
        let stats = ModelStats::collect(&models, models.len());
        assert_eq!(stats.total, 8);
        assert_eq!(stats.segmentation, 4);
        assert_eq!(stats.archived, 1);
    }

    #[test]
    fn test_mock_versions_decode() {
        for model in mock_models() {
            assert!(
                crate::models::version::decode(&model.version).is_some(),
                "{} has undecodable version {}",
                model.id,
                model.version
            );
        }
    }

    #[test]
    fn test_single_active_scheme() {
        let active = mock_schemes().iter().filter(|s| s.is_active).count();
        assert_eq!(active, 1);
    }

    #[test]
    fn test_mock_associations_reference_seed_models() {
        let models = mock_models();
        for association in mock_associations() {
            assert!(models.iter().any(|m| m.id == association.model_id));
        }
    }
}
