pub mod config;
pub mod errors;
pub mod model;
pub mod shape;
pub mod traits;

pub mod mocks;

use image::ImageFormat;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use config::Config;
pub use errors::{ImageRestoreError, Result};
pub use model::ImageProcessingModel;
pub use shape::{OutputShape, Size};
pub use traits::*;

#[cfg(test)]
pub use mocks::*;

/// Walks an input directory and runs every supported image through a model,
/// mirroring the directory tree into the output directory.
pub struct ImageProcessor<M: ImageModel> {
    model: M,
    config: Config,
}

impl<M: ImageModel> ImageProcessor<M> {
    pub const fn new(model: M, config: Config) -> Self {
        Self { model, config }
    }

    pub fn process_directory(&self) -> Result<()> {
        let input_path = &self.config.input_dir;
        let output_path = &self.config.output_dir;

        if !input_path.exists() {
            return Err(ImageRestoreError::FileSystem {
                path: input_path.clone(),
                operation: "input directory check".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            });
        }

        fs::create_dir_all(output_path).map_err(|e| ImageRestoreError::FileSystem {
            path: output_path.clone(),
            operation: "output directory creation".to_string(),
            source: e,
        })?;

        let image_files = self.collect_image_files(input_path)?;

        if image_files.is_empty() {
            println!("No image files found to process");
            return Ok(());
        }

        let pb = ProgressBar::new(image_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        image_files
            .par_iter()
            .try_for_each(|input_file| -> Result<()> {
                self.process_single_image(input_file, output_path)?;
                pb.inc(1);
                Ok(())
            })?;

        pb.finish_with_message("done");
        Ok(())
    }

    fn collect_image_files(&self, input_path: &Path) -> Result<Vec<PathBuf>> {
        let mut image_files = Vec::new();

        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && self.is_supported_image_format(path) {
                image_files.push(path.to_path_buf());
            }
        }

        Ok(image_files)
    }

    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tiff" | "avif"
            )
        } else {
            false
        }
    }

    fn process_single_image(&self, input_file: &Path, output_dir: &Path) -> Result<()> {
        let img = image::open(input_file).map_err(|e| ImageRestoreError::ImageProcessing {
            path: input_file.display().to_string(),
            operation: "image loading".to_string(),
            source: Box::new(e),
        })?;

        let processed_img =
            self.model
                .process(&img)
                .map_err(|e| ImageRestoreError::ImageProcessing {
                    path: input_file.display().to_string(),
                    operation: "image restoration".to_string(),
                    source: Box::new(e),
                })?;

        let relative_path = self.get_relative_path(input_file)?;
        let output_file = output_dir
            .join(relative_path)
            .with_extension(&self.config.format);

        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent).map_err(|e| ImageRestoreError::FileSystem {
                path: parent.to_path_buf(),
                operation: "output directory creation".to_string(),
                source: e,
            })?;
        }

        let output_format = match self.config.format.as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            "bmp" => ImageFormat::Bmp,
            "gif" => ImageFormat::Gif,
            "tiff" => ImageFormat::Tiff,
            _ => ImageFormat::Png,
        };

        processed_img
            .save_with_format(&output_file, output_format)
            .map_err(|e| ImageRestoreError::ImageProcessing {
                path: output_file.display().to_string(),
                operation: "image saving".to_string(),
                source: Box::new(e),
            })?;

        Ok(())
    }

    pub fn get_relative_path(&self, input_file: &Path) -> Result<PathBuf> {
        let input_dir = &self.config.input_dir;
        input_file
            .strip_prefix(input_dir)
            .map(|p| p.to_path_buf())
            .map_err(|_| ImageRestoreError::FileSystem {
                path: input_file.to_path_buf(),
                operation: "relative path resolution".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "input file is not inside the input directory",
                ),
            })
    }
}

impl ImageProcessor<ImageProcessingModel> {
    pub fn with_onnx_model(config: Config) -> Result<Self> {
        let model = ImageProcessingModel::new(&config.model_path, config.auto_resize)
            .load_with_device(config.device_id)?;
        Ok(Self::new(model, config))
    }
}
