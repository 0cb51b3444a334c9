pub mod camera_utils;

// Re-export main types
pub use camera_utils::{CameraFrame, CameraSection, ImagePlane};
