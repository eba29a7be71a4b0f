use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use image_restore_rs::{
    Config, ImageModel, ImageProcessingModel, ImageProcessor, OutputShape, Size,
};

// Mock model defined inside the integration test, independent of the crate's
// test helpers.
#[derive(Debug, Clone)]
struct TestMockModel {
    view: Size,
}

impl TestMockModel {
    const fn new(width: u32, height: u32) -> Self {
        Self {
            view: Size::new(width, height),
        }
    }
}

impl ImageModel for TestMockModel {
    fn process(&self, img: &DynamicImage) -> image_restore_rs::Result<DynamicImage> {
        Ok(img.clone())
    }

    fn view_size(&self) -> Size {
        self.view
    }

    fn predict(
        &self,
        tensor: ndarray::ArrayView4<f32>,
    ) -> image_restore_rs::Result<ndarray::Array4<f32>> {
        let shape = tensor.shape();
        Ok(ndarray::Array4::<f32>::zeros((
            shape[0], shape[1], shape[2], shape[3],
        )))
    }
}

fn test_config(input_dir: PathBuf, output_dir: PathBuf) -> Config {
    Config {
        input_dir,
        output_dir,
        model_path: "model.onnx".into(),
        format: "png".to_string(),
        auto_resize: false,
        device_id: 0,
        num_threads: 2,
    }
}

#[test]
fn test_config_values() {
    let config = test_config("input".into(), "output".into());

    assert_eq!(config.format, "png");
    assert_eq!(config.device_id, 0);
    assert!(!config.auto_resize);
}

#[test]
fn test_model_construction_keeps_geometry_zeroed() {
    // Any (path, flag) pair leaves the output geometry untouched until the
    // model is actually loaded.
    for auto_resize in [true, false] {
        let model = ImageProcessingModel::new("some_model.onnx", auto_resize);
        assert_eq!(model.output_shape(), OutputShape::default());
        assert_eq!(model.view_size(), Size::new(0, 0));
        assert_eq!(model.uses_auto_resize(), auto_resize);
    }
}

#[test]
fn test_model_substitutability() {
    // A concrete model must be usable wherever the abstraction is expected.
    fn view_through_abstraction(model: &dyn ImageModel) -> Size {
        model.view_size()
    }

    let concrete = ImageProcessingModel::new("model.onnx", true)
        .with_output_shape(OutputShape::new(720, 1280, 3));
    assert_eq!(view_through_abstraction(&concrete), Size::new(1280, 720));

    let mock = TestMockModel::new(64, 32);
    assert_eq!(view_through_abstraction(&mock), Size::new(64, 32));
}

#[test]
fn test_image_processor_with_mock() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    let processor = ImageProcessor::new(
        TestMockModel::new(0, 0),
        test_config(input_dir, output_dir),
    );

    assert!(processor.is_supported_image_format(&PathBuf::from("test.jpg")));
    assert!(!processor.is_supported_image_format(&PathBuf::from("test.txt")));
}

#[test]
fn test_process_directory_mirrors_tree() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    let subdir = input_dir.join("nested");
    fs::create_dir_all(&subdir).unwrap();

    RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]))
        .save(input_dir.join("top.png"))
        .unwrap();
    RgbImage::from_pixel(4, 4, Rgb([40, 50, 60]))
        .save(subdir.join("inner.png"))
        .unwrap();

    let processor = ImageProcessor::new(
        TestMockModel::new(0, 0),
        test_config(input_dir, output_dir.clone()),
    );
    processor.process_directory().unwrap();

    assert!(output_dir.join("top.png").exists());
    assert!(output_dir.join("nested/inner.png").exists());

    let restored = image::open(output_dir.join("top.png")).unwrap();
    assert_eq!(restored.dimensions(), (8, 8));
}

#[test]
fn test_process_directory_with_no_images() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();
    fs::write(input_dir.join("notes.txt"), b"not an image").unwrap();

    let processor = ImageProcessor::new(
        TestMockModel::new(0, 0),
        test_config(input_dir, output_dir.clone()),
    );
    processor.process_directory().unwrap();

    assert!(!output_dir.join("notes.txt").exists());
    assert!(!output_dir.join("notes.png").exists());
}

#[test]
fn test_relative_path_handling() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();

    let processor = ImageProcessor::new(
        TestMockModel::new(0, 0),
        test_config(input_dir.clone(), "output".into()),
    );

    let inside = input_dir.join("a/b/c.png");
    assert_eq!(
        processor.get_relative_path(&inside).unwrap(),
        Path::new("a/b/c.png")
    );
    assert!(processor
        .get_relative_path(Path::new("/somewhere/else.png"))
        .is_err());
}
