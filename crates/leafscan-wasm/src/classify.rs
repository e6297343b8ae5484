//! Classification bindings.
//!
//! The model artifact lives on the JavaScript side (TensorFlow.js, ONNX
//! Runtime Web, anything that can score a tensor). [`LeafScanner`] is handed a
//! `loadModel` callback and calls it once, on first use, to obtain a handle:
//!
//! ```typescript
//! const graph = await tf.loadGraphModel('/model/model.json');
//!
//! const scanner = new LeafScanner(() => ({
//!   // data: Uint8Array (raw) or Float32Array (unit_range), shape: [1, 256, 256, 3]
//!   predict: (data, shape) => graph.predict(tf.tensor(data, shape, 'float32')).dataSync(),
//!   signature: { outputWidth: 3 },
//! }));
//!
//! const result = scanner.classify(bytes, 'jpg');
//! console.log(result.summary()); // "Potato - Early Blight (70.00%)"
//! ```
//!
//! The optional `signature` fields `inputShape`, `channelOrder` and
//! `pixelScale` default to what the scanner config produces; when given, they
//! are checked against it before the first prediction.

use crate::types::{to_js_error, JsClassificationResult, JsPixelImage};
use leafscan_core::decode::{ChannelOrder, Upload};
use leafscan_core::display;
use leafscan_core::{
    ClassifyError, InputTensor, LazyModel, LeafModel, LeafPipeline, ModelLoader, ModelSignature,
    PipelineConfig, PixelScale, TensorData,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// What a JS model handle declares about itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelDescriptor {
    pub output_width: usize,
    #[serde(default)]
    pub input_shape: Option<[usize; 4]>,
    #[serde(default)]
    pub channel_order: Option<ChannelOrder>,
    #[serde(default)]
    pub pixel_scale: Option<PixelScale>,
}

impl ModelDescriptor {
    /// Fill the fields the handle left out from `config`.
    pub(crate) fn signature(&self, config: &PipelineConfig) -> ModelSignature {
        let size = config.input_size as usize;
        ModelSignature {
            input_shape: self.input_shape.unwrap_or([1, size, size, 3]),
            channel_order: self.channel_order.unwrap_or(config.channel_order),
            pixel_scale: self.pixel_scale.unwrap_or(config.pixel_scale),
            output_width: self.output_width,
        }
    }
}

/// A model whose forward pass is a JavaScript function.
///
/// `predict` is invoked as a method of `handle`, so it may use `this`.
pub(crate) struct JsModel {
    signature: ModelSignature,
    handle: JsValue,
    predict: js_sys::Function,
}

impl JsModel {
    fn from_handle(handle: &JsValue, config: &PipelineConfig) -> Result<Self, ClassifyError> {
        let predict = js_sys::Reflect::get(handle, &JsValue::from_str("predict"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ClassifyError::Model("model handle has no predict function".into()))?;

        let signature = js_sys::Reflect::get(handle, &JsValue::from_str("signature"))
            .map_err(|e| ClassifyError::Model(js_error_message(&e)))?;
        let descriptor: ModelDescriptor = serde_wasm_bindgen::from_value(signature)
            .map_err(|e| ClassifyError::Model(format!("invalid model signature: {}", e)))?;

        Ok(Self {
            signature: descriptor.signature(config),
            handle: handle.clone(),
            predict,
        })
    }
}

impl LeafModel for JsModel {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, ClassifyError> {
        let data: JsValue = match input.data() {
            TensorData::U8(v) => js_sys::Uint8Array::from(v.as_slice()).into(),
            TensorData::F32(v) => js_sys::Float32Array::from(v.as_slice()).into(),
        };
        let shape: js_sys::Array = input
            .shape()
            .iter()
            .map(|&d| JsValue::from_f64(d as f64))
            .collect();

        let output = self
            .predict
            .call2(&self.handle, &data, &shape)
            .map_err(|e| ClassifyError::Model(format!("predict threw: {}", js_error_message(&e))))?;
        scores_from_js(&output)
    }
}

/// Accepts a `Float32Array`, a plain array of numbers, or either wrapped in a
/// single-element batch array.
fn scores_from_js(output: &JsValue) -> Result<Vec<f32>, ClassifyError> {
    if let Some(typed) = output.dyn_ref::<js_sys::Float32Array>() {
        return Ok(typed.to_vec());
    }
    if !js_sys::Array::is_array(output) {
        return Err(ClassifyError::Model(
            "predict must return a Float32Array or an array of numbers".into(),
        ));
    }

    let array = js_sys::Array::from(output);
    if array.length() == 1 && array.get(0).as_f64().is_none() {
        return scores_from_js(&array.get(0));
    }

    array
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| ClassifyError::Model(format!("score {} is not a number", i)))
        })
        .collect()
}

fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Builds the whole pipeline around the JS model on first use.
struct ScannerLoader {
    config: PipelineConfig,
    load_model: js_sys::Function,
}

impl ModelLoader for ScannerLoader {
    type Model = LeafPipeline<JsModel>;

    fn load(&self) -> Result<Self::Model, ClassifyError> {
        let handle = self.load_model.call0(&JsValue::NULL).map_err(|e| {
            ClassifyError::Model(format!("loadModel threw: {}", js_error_message(&e)))
        })?;
        let model = JsModel::from_handle(&handle, &self.config)?;
        LeafPipeline::new(&self.config, model)
    }

    fn describe(&self) -> String {
        String::from("JS leaf model")
    }
}

fn parse_config(value: JsValue) -> Result<PipelineConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(PipelineConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid scanner config: {}", e)))
}

/// Leaf classifier backed by a lazily loaded JS model.
///
/// Every error thrown by its methods is a JS `Error` whose `name` is one of
/// `DecodeError`, `ShapeError`, `CatalogMismatchError`, `LabelFormatError` or
/// `ModelError`.
#[wasm_bindgen]
pub struct LeafScanner {
    model: LazyModel<ScannerLoader>,
}

#[wasm_bindgen]
impl LeafScanner {
    /// Create a scanner. `config` may be omitted for the stock leaf model
    /// (256x256 raw BGR input, three classes).
    ///
    /// Labels are validated here; the model is not loaded until the first
    /// `classify` or `warm_up`.
    #[wasm_bindgen(constructor)]
    pub fn new(load_model: js_sys::Function, config: JsValue) -> Result<LeafScanner, JsValue> {
        let config = parse_config(config)?;
        config.catalog().map_err(|e| to_js_error(e.into()))?;

        Ok(LeafScanner {
            model: LazyModel::new(ScannerLoader { config, load_model }),
        })
    }

    /// Load the model now rather than on the first classification.
    pub fn warm_up(&self) -> Result<(), JsValue> {
        self.model.get().map(|_| ()).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn is_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Drop the loaded model; the next call loads it again.
    pub fn reload(&mut self) {
        self.model.invalidate();
    }

    /// Class labels in model output order.
    pub fn labels(&self) -> Vec<String> {
        self.model.loader().config.labels.clone()
    }

    /// Decode and classify an upload.
    pub fn classify(&self, bytes: &[u8], extension: &str) -> Result<JsClassificationResult, JsValue> {
        let pipeline = self.model.get().map_err(to_js_error)?;
        pipeline
            .classify_upload(&Upload::new(bytes, extension))
            .map(JsClassificationResult::from)
            .map_err(to_js_error)
    }

    /// Classify an image previously returned by `decode_image`.
    pub fn classify_image(&self, image: &JsPixelImage) -> Result<JsClassificationResult, JsValue> {
        let pipeline = self.model.get().map_err(to_js_error)?;
        pipeline
            .classify_image(&image.to_tensor())
            .map(JsClassificationResult::from)
            .map_err(to_js_error)
    }

    /// Display preview sized by the configured `preview_edge`. Does not load
    /// the model.
    pub fn preview(&self, image: &JsPixelImage) -> Result<JsPixelImage, JsValue> {
        display::display_preview(&image.to_tensor(), self.model.loader().config.preview_edge)
            .map(JsPixelImage::from_tensor)
            .map_err(|e| to_js_error(e.into()))
    }
}
