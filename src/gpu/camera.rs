//! Fixed perspective camera and viewport.

use glam::{Mat4, Vec3};

use crate::config::CameraSettings;

/// Render target extent, never smaller than 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Clamp a window size to a drawable extent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Perspective camera looking at the rain volume.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    viewport: Viewport,
    projection: Mat4,
}

impl Camera {
    pub fn new(settings: &CameraSettings, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: settings.position,
            target: settings.target,
            fov_y: settings.fov_y_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
            viewport: Viewport::new(width, height),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    /// Apply a new window size and recompute the projection.
    ///
    /// Returns the clamped viewport the render targets should use.
    pub fn resize(&mut self, width: u32, height: u32) -> Viewport {
        self.viewport = Viewport::new(width, height);
        self.update_projection();
        self.viewport
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_y, self.viewport.aspect(), self.near, self.far);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraSettings::default(), 1280, 720)
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut once = camera();
        once.resize(800, 600);

        let mut twice = camera();
        twice.resize(800, 600);
        twice.resize(800, 600);

        assert_eq!(once.viewport(), twice.viewport());
        assert_eq!(once.projection_matrix(), twice.projection_matrix());
        assert_eq!(once.view_proj(), twice.view_proj());
    }

    #[test]
    fn test_zero_area_clamps_to_one_pixel() {
        let mut cam = camera();
        let viewport = cam.resize(0, 0);
        assert_eq!(viewport, Viewport { width: 1, height: 1 });
        assert!(cam.projection_matrix().is_finite());

        // Growing again resumes normally
        let viewport = cam.resize(640, 480);
        assert_eq!(viewport, Viewport { width: 640, height: 480 });
        assert!((viewport.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let cam = camera();
        let clip = cam.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_rain_volume_is_visible_from_default_camera() {
        let cam = camera();
        // Top and bottom of the 60-unit tall volume at the front face
        for y in [-30.0f32, 30.0] {
            let clip = cam.view_proj() * glam::Vec4::new(0.0, y, 0.0, 1.0);
            assert!((clip.y / clip.w).abs() <= 1.0);
        }
    }
}
