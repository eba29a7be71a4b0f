use anyhow::{ensure, Result};
use image::ImageFormat;
use rayon::ThreadPoolBuilder;

use image_restore_rs::{Config, ImageProcessor};

fn main() -> Result<()> {
    let config = Config::new();

    ensure!(config.model_path.exists(), "Model path does not exist");
    ensure!(config.input_dir.exists(), "Input directory does not exist");
    ensure!(
        ImageFormat::from_extension(&config.format).is_some(),
        "Invalid format"
    );

    ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()?;

    let processor = ImageProcessor::with_onnx_model(config)?;
    processor.process_directory()?;

    Ok(())
}
