//! Camera frame construction.
//!
//! Conventions: right-handed world, the canonical camera looks down `-z` with
//! `+y` up. A view direction is described by an azimuth about world `+y`
//! followed by an elevation about the rotated `x` axis; the same rotation
//! carries the canonical `+y` onto the camera's unrolled up vector.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// The `camera` section of a scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSection {
    pub eye: [f64; 3],
    pub target: [f64; 3],
    /// Clockwise roll of the up vector about the view direction, in degrees
    #[serde(default)]
    pub rotate: f64,
    /// Vertical field of view in degrees
    pub fov: f64,
}

/// Orthonormal viewing frame plus projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraFrame {
    pub eye: Vector3<f64>,
    /// Unit view direction
    pub forward: Vector3<f64>,
    /// Unit vector pointing to the right of the image
    pub right: Vector3<f64>,
    /// Unit vector pointing to the top of the image
    pub up: Vector3<f64>,
    pub vertical_fov: Rad<f64>,
    /// `width / height`
    pub aspect: f64,
    pub width: u32,
    pub height: u32,
}

/// Image plane one unit in front of the eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlane {
    pub lower_left: Vector3<f64>,
    /// Full-width span, left to right
    pub horizontal: Vector3<f64>,
    /// Full-height span, bottom to top
    pub vertical: Vector3<f64>,
}

/// Azimuth and elevation that rotate the canonical `-z` onto `dir` (unit length)
pub fn view_angles(dir: Vector3<f64>) -> (Rad<f64>, Rad<f64>) {
    let azimuth = Rad((-dir.x).atan2(-dir.z));
    let elevation = Rad(dir.y.clamp(-1.0, 1.0).asin());
    (azimuth, elevation)
}

/// Rotation by `azimuth` about world `+y`, then `elevation` about the rotated `x`
pub fn azimuth_elevation_rotation(azimuth: Rad<f64>, elevation: Rad<f64>) -> Matrix3<f64> {
    Matrix3::from_angle_y(azimuth) * Matrix3::from_angle_x(elevation)
}

fn check_dimensions(width: i64, height: i64) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(SceneError::InvalidImageDimensions { width, height }),
    }
}

impl CameraFrame {
    /// Builds the frame for `camera` rendering a `width` x `height` image.
    ///
    /// # Errors
    /// * [`SceneError::DegenerateCamera`] if eye and target coincide
    /// * [`SceneError::InvalidCameraFov`] if `fov` is outside `(0, 180)`
    /// * [`SceneError::InvalidImageDimensions`] if a dimension is not positive
    pub fn build(camera: &CameraSection, width: i64, height: i64) -> Result<Self> {
        let eye = Vector3::from(camera.eye);
        let view = Vector3::from(camera.target) - eye;
        if !(view.magnitude2() > 0.0) {
            return Err(SceneError::DegenerateCamera { eye: camera.eye });
        }
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(SceneError::InvalidCameraFov { fov: camera.fov });
        }
        let (width, height) = check_dimensions(width, height)?;

        let forward = view.normalize();
        let (azimuth, elevation) = view_angles(forward);
        let unrolled_up = azimuth_elevation_rotation(azimuth, elevation) * Vector3::unit_y();

        // Seen from the eye, a right-handed turn about `forward` is clockwise.
        let roll = Matrix3::from_axis_angle(forward, Rad::from(Deg(camera.rotate)));
        let up = roll * unrolled_up;

        let right = forward.cross(up).normalize();
        let up = right.cross(forward).normalize();

        log::trace!(
            "camera frame: forward {:?}, right {:?}, up {:?}",
            forward,
            right,
            up
        );

        Ok(Self {
            eye,
            forward,
            right,
            up,
            vertical_fov: Rad::from(Deg(camera.fov)),
            aspect: width as f64 / height as f64,
            width,
            height,
        })
    }

    pub fn horizontal_fov(&self) -> Rad<f64> {
        Rad(2.0 * (self.aspect * (self.vertical_fov.0 / 2.0).tan()).atan())
    }

    pub fn image_plane(&self) -> ImagePlane {
        let plane_height = 2.0 * (self.vertical_fov.0 / 2.0).tan();
        let plane_width = self.aspect * plane_height;
        let horizontal = self.right * plane_width;
        let vertical = self.up * plane_height;

        ImagePlane {
            lower_left: self.eye + self.forward - horizontal / 2.0 - vertical / 2.0,
            horizontal,
            vertical,
        }
    }

    /// Unit direction through normalised image coordinates (`(0, 0)` is the
    /// bottom-left corner, `(1, 1)` the top-right)
    pub fn ray_direction(&self, u: f64, v: f64) -> Vector3<f64> {
        let plane = self.image_plane();
        (plane.lower_left + plane.horizontal * u + plane.vertical * v - self.eye).normalize()
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_to_rh(Point3::from_vec(self.eye), self.forward, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn section(eye: [f64; 3], target: [f64; 3], rotate: f64) -> CameraSection {
        CameraSection {
            eye,
            target,
            rotate,
            fov: 60.0,
        }
    }

    fn assert_vec_eq(actual: Vector3<f64>, expected: [f64; 3]) {
        assert_relative_eq!(actual.x, expected[0], epsilon = 1e-12);
        assert_relative_eq!(actual.y, expected[1], epsilon = 1e-12);
        assert_relative_eq!(actual.z, expected[2], epsilon = 1e-12);
    }

    fn assert_orthonormal(frame: &CameraFrame) {
        assert_relative_eq!(frame.forward.magnitude(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.right.magnitude(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.up.magnitude(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.forward.dot(frame.right), 0.0, epsilon = 1e-12);
        assert_relative_eq!(frame.forward.dot(frame.up), 0.0, epsilon = 1e-12);
        assert_relative_eq!(frame.right.dot(frame.up), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_canonical_frame() {
        let frame = CameraFrame::build(&section([0.0, 0.0, 5.0], [0.0; 3], 0.0), 800, 600).unwrap();

        assert_vec_eq(frame.forward, [0.0, 0.0, -1.0]);
        assert_vec_eq(frame.up, [0.0, 1.0, 0.0]);
        assert_vec_eq(frame.right, [1.0, 0.0, 0.0]);
        assert_eq!(frame.eye, Vector3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_eye_on_target_is_degenerate() {
        let result = CameraFrame::build(&section([1.0, 2.0, 3.0], [1.0, 2.0, 3.0], 0.0), 800, 600);
        assert!(matches!(result, Err(SceneError::DegenerateCamera { .. })));
    }

    #[test]
    fn test_aspect_is_exact_ratio() {
        let frame =
            CameraFrame::build(&section([0.0, 0.0, 5.0], [0.0; 3], 0.0), 1920, 1080).unwrap();
        assert_eq!(frame.aspect, 1920.0 / 1080.0);
        assert_eq!((frame.width, frame.height), (1920, 1080));
    }

    #[test]
    fn test_non_positive_dimensions() {
        let camera = section([0.0, 0.0, 5.0], [0.0; 3], 0.0);
        for (w, h) in [(0, 600), (800, 0), (-800, 600), (800, -1)] {
            assert!(matches!(
                CameraFrame::build(&camera, w, h),
                Err(SceneError::InvalidImageDimensions { width, height }) if width == w && height == h
            ));
        }
    }

    #[test]
    fn test_fov_bounds() {
        let mut camera = section([0.0, 0.0, 5.0], [0.0; 3], 0.0);
        camera.fov = 0.0;
        assert!(matches!(
            CameraFrame::build(&camera, 10, 10),
            Err(SceneError::InvalidCameraFov { .. })
        ));
        camera.fov = 180.0;
        assert!(CameraFrame::build(&camera, 10, 10).is_err());
    }

    #[test]
    fn test_roll_is_clockwise_from_the_eye() {
        let frame =
            CameraFrame::build(&section([0.0, 0.0, 5.0], [0.0; 3], 90.0), 800, 600).unwrap();

        // Rolling the image clockwise by a quarter turn points up to the old right.
        assert_vec_eq(frame.up, [1.0, 0.0, 0.0]);
        assert_vec_eq(frame.right, [0.0, -1.0, 0.0]);
        assert_orthonormal(&frame);
    }

    #[test]
    fn test_looking_along_x() {
        let frame = CameraFrame::build(&section([0.0; 3], [3.0, 0.0, 0.0], 0.0), 100, 100).unwrap();

        assert_vec_eq(frame.forward, [1.0, 0.0, 0.0]);
        assert_vec_eq(frame.up, [0.0, 1.0, 0.0]);
        assert_vec_eq(frame.right, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_looking_down_keeps_up_above_horizon() {
        let frame =
            CameraFrame::build(&section([0.0, 1.0, 1.0], [0.0; 3], 0.0), 100, 100).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;

        assert_vec_eq(frame.up, [0.0, h, -h]);
        assert_vec_eq(frame.right, [1.0, 0.0, 0.0]);
        assert_orthonormal(&frame);
    }

    #[test]
    fn test_arbitrary_frame_is_right_handed() {
        let frame =
            CameraFrame::build(&section([3.0, -2.0, 7.0], [-1.0, 4.0, 0.5], 37.0), 640, 480)
                .unwrap();

        assert_orthonormal(&frame);
        let back = frame.right.cross(frame.up);
        assert_vec_eq(back, [-frame.forward.x, -frame.forward.y, -frame.forward.z]);
    }

    #[test]
    fn test_angles_reproduce_direction() {
        let dir = Vector3::new(0.3, -0.5, 0.8).normalize();
        let (azimuth, elevation) = view_angles(dir);
        let rebuilt = azimuth_elevation_rotation(azimuth, elevation) * -Vector3::unit_z();
        assert_vec_eq(rebuilt, [dir.x, dir.y, dir.z]);
    }

    #[test]
    fn test_frame_is_deterministic() {
        let camera = section([1.5, 2.5, -4.0], [0.0, 1.0, 0.0], 12.0);
        assert_eq!(
            CameraFrame::build(&camera, 320, 200).unwrap(),
            CameraFrame::build(&camera, 320, 200).unwrap()
        );
    }

    #[test]
    fn test_image_plane_and_rays() {
        let frame = CameraFrame::build(
            &CameraSection {
                eye: [0.0, 0.0, 5.0],
                target: [0.0; 3],
                rotate: 0.0,
                fov: 90.0,
            },
            200,
            100,
        )
        .unwrap();

        let plane = frame.image_plane();
        assert_vec_eq(plane.horizontal, [4.0, 0.0, 0.0]);
        assert_vec_eq(plane.vertical, [0.0, 2.0, 0.0]);
        assert_vec_eq(plane.lower_left, [-2.0, -1.0, 4.0]);

        assert_vec_eq(frame.ray_direction(0.5, 0.5), [0.0, 0.0, -1.0]);
        assert_relative_eq!(
            frame.horizontal_fov().0,
            2.0 * 2.0f64.atan(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let frame =
            CameraFrame::build(&section([1.0, 2.0, 3.0], [1.0, 2.0, -7.0], 0.0), 10, 10).unwrap();
        let eye = frame.view_matrix() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(eye.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(eye.z, 0.0, epsilon = 1e-12);
    }
}
