use crate::errors::Result;
use crate::shape::Size;
use image::DynamicImage;
use ndarray::prelude::*;

/// Common capability set of an image-to-image model.
///
/// Concrete models implement this trait instead of inheriting from a base
/// class, so callers can treat any model uniformly through the abstraction.
pub trait ImageModel: Send + Sync {
    /// Runs the full preprocess, inference and postprocess pipeline on one
    /// image.
    fn process(&self, img: &DynamicImage) -> Result<DynamicImage>;

    /// Spatial size of the result view produced by this model. (0, 0) until
    /// the model's output geometry has been resolved.
    fn view_size(&self) -> Size;

    /// Low-level tensor prediction.
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>>;
}
