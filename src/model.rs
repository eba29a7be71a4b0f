use std::path::{Path, PathBuf};

use image::{imageops, imageops::FilterType, DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

use crate::{
    errors::{ImageRestoreError, Result},
    shape::{OutputShape, Size},
    traits::ImageModel,
};

/// An image-to-image model (super resolution, deblurring) backed by an ONNX
/// Runtime session.
///
/// Construction only records the model identifier and resize mode; the output
/// geometry stays zeroed until [`load`](Self::load) inspects the model. With
/// auto-resize enabled, input size adaptation is delegated to the runtime
/// (the image is fed at its own size, for dynamic-input models); otherwise
/// the input is resized to the network's declared input size with explicit
/// image routines before inference.
pub struct ImageProcessingModel {
    model_path: PathBuf,
    use_auto_resize: bool,
    input_size: Size,
    output_shape: OutputShape,
    view_size: Size,
    input_name: String,
    output_name: String,
    session: Option<Mutex<Session>>,
}

impl ImageProcessingModel {
    pub fn new(model_path: impl Into<PathBuf>, use_auto_resize: bool) -> Self {
        Self {
            model_path: model_path.into(),
            use_auto_resize,
            input_size: Size::default(),
            output_shape: OutputShape::default(),
            view_size: Size::default(),
            input_name: String::new(),
            output_name: String::new(),
            session: None,
        }
    }

    /// Overrides the output geometry before loading, for models whose output
    /// shape is dynamic in the model file but known to the caller. A shape
    /// set here is not overwritten by [`load`](Self::load).
    pub fn with_output_shape(mut self, shape: OutputShape) -> Self {
        self.set_output_shape(shape);
        self
    }

    pub fn load(self) -> Result<Self> {
        self.load_with_device(0)
    }

    /// Builds the runtime session and resolves the model geometry.
    pub fn load_with_device(mut self, device_id: i32) -> Result<Self> {
        let session = SessionBuilder::new()
            .map_err(|e| ImageRestoreError::Model {
                operation: "session builder initialization".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| ImageRestoreError::Model {
                operation: "execution provider setup".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| ImageRestoreError::Model {
                operation: "memory pattern setup".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(&self.model_path)
            .map_err(|e| ImageRestoreError::Model {
                operation: format!("model file loading: {}", self.model_path.display()),
                source: Box::new(e),
            })?;

        if session.inputs.len() != 1 {
            return Err(ImageRestoreError::Validation {
                field: "model inputs".to_string(),
                reason: format!("expected exactly 1 input, got {}", session.inputs.len()),
            });
        }
        if session.outputs.len() != 1 {
            return Err(ImageRestoreError::Validation {
                field: "model outputs".to_string(),
                reason: format!("expected exactly 1 output, got {}", session.outputs.len()),
            });
        }

        self.input_name = session.inputs[0].name.clone();
        self.output_name = session.outputs[0].name.clone();

        let input_dims = session.inputs[0]
            .input_type
            .tensor_shape()
            .ok_or_else(|| ImageRestoreError::Model {
                operation: "model input shape inspection".to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "input tensor shape is unavailable",
                )),
            })?;
        self.input_size = OutputShape::from_dims(input_dims)?.view_size();

        let output_dims = session.outputs[0]
            .output_type
            .tensor_shape()
            .ok_or_else(|| ImageRestoreError::Model {
                operation: "model output shape inspection".to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "output tensor shape is unavailable",
                )),
            })?;
        // Geometry is set once during initialization; an explicit override
        // from with_output_shape wins over the model file.
        if self.output_shape.is_empty() {
            let shape = OutputShape::from_dims(output_dims)?;
            self.set_output_shape(shape);
        }

        self.session = Some(Mutex::new(session));
        Ok(self)
    }

    fn set_output_shape(&mut self, shape: OutputShape) {
        self.output_shape = shape;
        if shape.is_static() {
            self.view_size = shape.view_size();
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub const fn uses_auto_resize(&self) -> bool {
        self.use_auto_resize
    }

    pub const fn output_shape(&self) -> OutputShape {
        self.output_shape
    }

    pub const fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let session = self.session.as_ref().ok_or_else(|| ImageRestoreError::Model {
            operation: "inference".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "model is not loaded",
            )),
        })?;
        let mut session = session.lock();
        let outputs = session.run(
            ort::inputs![self.input_name.as_str() => TensorRef::from_array_view(&tensor.as_standard_layout())?],
        )?;
        Ok(outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned())
    }

    fn preprocess(&self, img: &DynamicImage) -> Result<Array4<f32>> {
        let rgb = img.to_rgb8();
        let rgb = if self.use_auto_resize || self.input_size.is_empty() {
            rgb
        } else {
            imageops::resize(
                &rgb,
                self.input_size.width,
                self.input_size.height,
                FilterType::Lanczos3,
            )
        };
        // RGB, NCHW, f32 scaled to [0, 1]
        let tensor = rgb
            .as_ndarray3()
            .slice_move(s![NewAxis, .., .., ..])
            .map(|v| f32::from(*v) / 255.0);
        Ok(tensor)
    }

    fn postprocess(&self, output: Array4<f32>) -> Result<DynamicImage> {
        let (batch, channels, height, width) = output.dim();
        if batch != 1 {
            return Err(ImageRestoreError::Validation {
                field: "inference output".to_string(),
                reason: format!("expected batch size 1, got {batch}"),
            });
        }

        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let img = match channels {
            1 => DynamicImage::ImageLuma8(GrayImage::from_fn(
                width as u32,
                height as u32,
                |x, y| Luma([to_u8(output[[0, 0, y as usize, x as usize]])]),
            )),
            3 => DynamicImage::ImageRgb8(RgbImage::from_fn(width as u32, height as u32, |x, y| {
                let (x, y) = (x as usize, y as usize);
                Rgb([
                    to_u8(output[[0, 0, y, x]]),
                    to_u8(output[[0, 1, y, x]]),
                    to_u8(output[[0, 2, y, x]]),
                ])
            })),
            other => {
                return Err(ImageRestoreError::Validation {
                    field: "inference output".to_string(),
                    reason: format!("expected 1 or 3 channels, got {other}"),
                })
            }
        };

        let tensor_size = Size::new(width as u32, height as u32);
        if !self.view_size.is_empty() && self.view_size != tensor_size {
            return Ok(img.resize_exact(
                self.view_size.width,
                self.view_size.height,
                FilterType::Lanczos3,
            ));
        }
        Ok(img)
    }
}

impl ImageModel for ImageProcessingModel {
    fn process(&self, img: &DynamicImage) -> Result<DynamicImage> {
        let tensor = self.preprocess(img)?;
        let output = self.predict(tensor.view())?;
        self.postprocess(output)
    }

    fn view_size(&self) -> Size {
        self.view_size
    }

    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        Self::predict(self, tensor)
    }
}
