use glam::{Vec2, Vec3};

/// Distance from the look-at origin to the camera.
pub const ORBIT_RADIUS: f32 = 40.0;

/// Radians of orbit / elevation per pixel of pointer drag.
const DRAG_SENSITIVITY: f32 = 0.01;

/// Elevation is clamped to keep the camera away from the poles.
const ELEVATION_LIMIT: f32 = 1.2;

/// View pose consumed by a renderer: a position on the orbit sphere looking
/// at the grid center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, ORBIT_RADIUS),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// Orbiting view driven by idle auto-rotation or pointer drags.
///
/// Purely peripheral: it consumes the tick clock but never touches the
/// walk. Dragging suspends the idle rotation for its duration.
#[derive(Debug)]
pub struct OrbitCamera {
    orbit: f32,
    elevation: f32,
    radius: f32,
    dragging: bool,
    last_pointer: Vec2,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            orbit: std::f32::consts::FRAC_PI_4,
            elevation: 0.6,
            radius: ORBIT_RADIUS,
            dragging: false,
            last_pointer: Vec2::ZERO,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.dragging = true;
        self.last_pointer = pos;
    }

    /// Converts the positional delta since the last pointer event into
    /// incremental orbit and (clamped) elevation changes. Ignored unless a
    /// drag is in progress.
    pub fn pointer_move(&mut self, pos: Vec2) {
        if !self.dragging {
            return;
        }
        let delta = pos - self.last_pointer;
        self.orbit -= delta.x * DRAG_SENSITIVITY;
        self.elevation =
            (self.elevation + delta.y * DRAG_SENSITIVITY).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self.last_pointer = pos;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Advances the idle auto-rotation; suppressed while a drag is active.
    pub fn idle_step(&mut self, angular_speed: f32) {
        if !self.dragging {
            self.orbit += angular_speed;
        }
    }

    /// Current pose on the orbit sphere, looking at the origin with +Y up.
    pub fn pose(&self) -> CameraPose {
        let horizontal = self.radius * self.elevation.cos();
        CameraPose {
            position: Vec3::new(
                self.orbit.sin() * horizontal,
                self.radius * self.elevation.sin(),
                self.orbit.cos() * horizontal,
            ),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_step_advances_the_orbit() {
        let mut cam = OrbitCamera::new();
        let before = cam.pose();
        cam.idle_step(0.1);
        assert_ne!(cam.pose(), before);
    }

    #[test]
    fn idle_step_is_suppressed_while_dragging() {
        let mut cam = OrbitCamera::new();
        cam.pointer_down(Vec2::new(100.0, 100.0));
        let before = cam.pose();
        cam.idle_step(0.1);
        assert_eq!(cam.pose(), before);

        cam.pointer_up();
        cam.idle_step(0.1);
        assert_ne!(cam.pose(), before);
    }

    #[test]
    fn drag_changes_orbit_and_elevation() {
        let mut cam = OrbitCamera::new();
        cam.pointer_down(Vec2::new(0.0, 0.0));
        let before = cam.pose();
        cam.pointer_move(Vec2::new(30.0, -20.0));
        assert_ne!(cam.pose(), before);
    }

    #[test]
    fn pointer_move_without_drag_is_ignored() {
        let mut cam = OrbitCamera::new();
        let before = cam.pose();
        cam.pointer_move(Vec2::new(500.0, 500.0));
        assert_eq!(cam.pose(), before);
    }

    #[test]
    fn elevation_clamps_at_the_poles() {
        let mut cam = OrbitCamera::new();
        cam.pointer_down(Vec2::ZERO);
        // Drag far past the clamp range in both directions.
        cam.pointer_move(Vec2::new(0.0, 10_000.0));
        assert!(cam.elevation <= ELEVATION_LIMIT);
        cam.pointer_move(Vec2::new(0.0, -20_000.0));
        assert!(cam.elevation >= -ELEVATION_LIMIT);
    }

    #[test]
    fn pose_sits_on_the_orbit_sphere_looking_at_origin() {
        let mut cam = OrbitCamera::new();
        cam.pointer_down(Vec2::ZERO);
        cam.pointer_move(Vec2::new(123.0, -45.0));
        cam.pointer_up();
        for _ in 0..10 {
            cam.idle_step(0.05);
            let pose = cam.pose();
            assert!((pose.position.length() - ORBIT_RADIUS).abs() < 1e-3);
            assert_eq!(pose.target, Vec3::ZERO);
            assert_eq!(pose.up, Vec3::Y);
        }
    }
}
