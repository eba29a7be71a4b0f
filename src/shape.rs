use crate::errors::{ImageRestoreError, Result};

/// Two-field spatial size record (width, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, i.e. the size has not been resolved yet.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Output geometry of an image-processing network: height, width and channel
/// count of the result tensor. All zeros until the model has been inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputShape {
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

impl OutputShape {
    pub const fn new(height: u32, width: u32, channels: u32) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// True when no dimension has been resolved.
    pub const fn is_empty(&self) -> bool {
        self.height == 0 && self.width == 0 && self.channels == 0
    }

    /// True when every dimension is known.
    pub const fn is_static(&self) -> bool {
        self.height > 0 && self.width > 0 && self.channels > 0
    }

    /// Parses an NCHW tensor shape. Dynamic dimensions (reported as zero or
    /// negative) are kept as zero so they stay distinguishable from resolved
    /// ones.
    pub fn from_dims(dims: &[i64]) -> Result<Self> {
        if dims.len() != 4 {
            return Err(ImageRestoreError::Validation {
                field: "output shape".to_string(),
                reason: format!("expected a 4D NCHW tensor, got {} dimensions", dims.len()),
            });
        }

        let as_dim = |d: i64| if d > 0 { d as u32 } else { 0 };
        Ok(Self {
            channels: as_dim(dims[1]),
            height: as_dim(dims[2]),
            width: as_dim(dims[3]),
        })
    }

    /// The spatial part of the shape as a view size.
    pub const fn view_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_is_zero() {
        let size = Size::default();
        assert_eq!(size, Size::new(0, 0));
        assert!(size.is_empty());
    }

    #[test]
    fn default_output_shape_is_zero() {
        let shape = OutputShape::default();
        assert_eq!(shape.height, 0);
        assert_eq!(shape.width, 0);
        assert_eq!(shape.channels, 0);
        assert!(shape.is_empty());
        assert!(!shape.is_static());
    }

    #[test]
    fn from_dims_parses_static_nchw() -> Result<()> {
        let shape = OutputShape::from_dims(&[1, 3, 1080, 1920])?;
        assert_eq!(shape, OutputShape::new(1080, 1920, 3));
        assert!(shape.is_static());
        assert_eq!(shape.view_size(), Size::new(1920, 1080));
        Ok(())
    }

    #[test]
    fn from_dims_keeps_dynamic_dims_zero() -> Result<()> {
        let shape = OutputShape::from_dims(&[-1, 3, -1, -1])?;
        assert_eq!(shape.channels, 3);
        assert_eq!(shape.height, 0);
        assert_eq!(shape.width, 0);
        assert!(!shape.is_static());
        Ok(())
    }

    #[test]
    fn from_dims_rejects_non_4d() {
        assert!(OutputShape::from_dims(&[1, 3, 224]).is_err());
        assert!(OutputShape::from_dims(&[1, 1, 3, 224, 224]).is_err());
    }
}
