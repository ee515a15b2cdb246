// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! EAST text detection model
//!
//! Wraps an ONNX export of the frozen EAST graph. The network takes a mean
//! subtracted RGB image whose sides are multiples of 32 and returns two
//! maps at a quarter of the input resolution: a one channel score map and a
//! five channel geometry map.

use ndarray::{Array4, ArrayViewD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::decode::{channel_count, EastOutput, GEOMETRY_CHANNELS};
use super::preprocessing::TensorLayout;
use crate::config::DetectionConfig;
use crate::errors::{Result, ToolkitError};

/// File name of the frozen graph distributed with EAST
pub const FROZEN_GRAPH_FILE: &str = "EAST_text_detection.pb";

fn ort_error<E: std::fmt::Display>(stage: &str) -> impl Fn(E) -> ToolkitError + '_ {
    move |e| ToolkitError::Inference(format!("{stage}: {e}"))
}

/// Loaded EAST network
#[derive(Clone)]
pub struct EastModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    input_name: String,
    layout: TensorLayout,
    input_width: u32,
    input_height: u32,
    model_path: PathBuf,
}

impl std::fmt::Debug for EastModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EastModel")
            .field("input_name", &self.input_name)
            .field("layout", &self.layout)
            .field("input_width", &self.input_width)
            .field("input_height", &self.input_height)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl EastModel {
    /// Load the model described by `config`
    ///
    /// Fails before touching ONNX Runtime when the file is missing:
    /// [`ToolkitError::ModelNeedsConversion`] when only the frozen `.pb`
    /// graph is there, [`ToolkitError::ModelNotFound`] otherwise.
    pub fn load(config: &DetectionConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();
        check_model_file(model_path)?;

        info!("Loading EAST text detection model from {}", model_path.display());

        let session = Session::builder()
            .map_err(ort_error("Failed to create session builder"))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(ort_error("Failed to set CPU execution provider"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_error("Failed to set optimization level"))?
            .with_intra_threads(config.intra_threads)
            .map_err(ort_error("Failed to set thread count"))?
            .commit_from_file(model_path)
            .map_err(|e| {
                ToolkitError::Inference(format!(
                    "Failed to load EAST model from {}: {e}",
                    model_path.display()
                ))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ToolkitError::Inference("EAST model declares no inputs".to_string()))?;

        if session.outputs.len() < 2 {
            return Err(ToolkitError::Inference(format!(
                "EAST model must have score and geometry outputs, found {}",
                session.outputs.len()
            )));
        }

        debug!(
            "EAST model loaded - input: {}, outputs: {:?}",
            input_name,
            session.outputs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>()
        );

        info!("✅ EAST model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            layout: config.input_layout,
            input_width: config.input_width,
            input_height: config.input_height,
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Network input size as (width, height)
    pub fn input_size(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }

    /// Run the network on a preprocessed tensor
    pub fn forward(&self, input: Array4<f32>) -> Result<EastOutput> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ToolkitError::Inference("EAST session lock poisoned".to_string()))?;

        let input_value = Value::from_array(input).map_err(ort_error("Failed to create input tensor"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(ort_error("EAST inference failed"))?;

        let mut scores: Option<ArrayViewD<'_, f32>> = None;
        let mut geometry: Option<ArrayViewD<'_, f32>> = None;

        for idx in 0..outputs.len() {
            let tensor = outputs[idx]
                .try_extract_array::<f32>()
                .map_err(ort_error("Failed to extract output tensor"))?;
            match channel_count(tensor.shape(), self.layout) {
                Some(1) if scores.is_none() => scores = Some(tensor),
                Some(GEOMETRY_CHANNELS) if geometry.is_none() => geometry = Some(tensor),
                _ => debug!("Ignoring EAST output {} with shape {:?}", idx, tensor.shape()),
            }
        }

        match (scores, geometry) {
            (Some(scores), Some(geometry)) => {
                debug!(
                    "EAST output shapes - scores: {:?}, geometry: {:?}",
                    scores.shape(),
                    geometry.shape()
                );
                EastOutput::from_raw(scores, geometry, self.layout)
            }
            _ => Err(ToolkitError::Inference(format!(
                "EAST outputs do not match the {:?} layout (expected 1 and {} channel maps)",
                self.layout, GEOMETRY_CHANNELS
            ))),
        }
    }
}

fn check_model_file(model_path: &Path) -> Result<()> {
    let is_frozen_graph = model_path.extension().is_some_and(|ext| ext == "pb");
    if model_path.is_file() && !is_frozen_graph {
        return Ok(());
    }

    if model_path.is_file() {
        return Err(ToolkitError::ModelNeedsConversion {
            frozen: model_path.to_path_buf(),
            expected: model_path.with_extension("onnx"),
        });
    }

    match find_frozen_graph(model_path) {
        Some(frozen) => Err(ToolkitError::ModelNeedsConversion {
            frozen,
            expected: model_path.to_path_buf(),
        }),
        None => Err(ToolkitError::ModelNotFound {
            path: model_path.to_path_buf(),
        }),
    }
}

/// Frozen graph downloaded next to where the ONNX export is expected
fn find_frozen_graph(model_path: &Path) -> Option<PathBuf> {
    let sibling = model_path.with_extension("pb");
    let standard = model_path.parent().map(|dir| dir.join(FROZEN_GRAPH_FILE));
    [Some(sibling), standard].into_iter().flatten().find(|p| p.is_file())
}
