use crate::errors::Result;
use crate::shape::Size;
use crate::traits::ImageModel;
use image::DynamicImage;
use ndarray::prelude::*;

#[cfg(test)]
use image::GenericImageView;

/// Mock model for tests: identity processing with a fixed view size.
#[derive(Debug, Clone)]
pub struct MockImageModel {
    pub view: Size,
}

impl MockImageModel {
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            view: Size::new(width, height),
        }
    }
}

impl ImageModel for MockImageModel {
    fn process(&self, img: &DynamicImage) -> Result<DynamicImage> {
        Ok(img.clone())
    }

    fn view_size(&self) -> Size {
        self.view
    }

    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let shape = tensor.shape();
        Ok(Array4::<f32>::zeros((
            shape[0], shape[1], shape[2], shape[3],
        )))
    }
}

pub const fn create_mock_model() -> MockImageModel {
    MockImageModel::new(1920, 1080)
}
