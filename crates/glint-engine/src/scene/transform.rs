use std::f64::consts::TAU;

use glam::{Mat4, Vec3};

/// Rotation rate in revolutions per second.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationSpeed {
    pub revolutions_per_second: f64,
}

impl RotationSpeed {
    /// One turn every 6.48 s.
    pub const LEISURELY: Self = Self {
        revolutions_per_second: 1000.0 / (270.0 * 24.0),
    };

    /// One turn every 1.92 s.
    pub const BRISK: Self = Self {
        revolutions_per_second: 1000.0 / (240.0 * 8.0),
    };

    pub const fn new(revolutions_per_second: f64) -> Self {
        Self {
            revolutions_per_second,
        }
    }

    /// Seconds per full revolution (infinite when stopped).
    pub fn period(&self) -> f64 {
        1.0 / self.revolutions_per_second
    }

    /// Total rotation in radians after `elapsed` seconds.
    ///
    /// Pure in `elapsed`; negative input is treated as zero.
    pub fn angle_at(&self, elapsed: f64) -> f64 {
        elapsed.max(0.0) * self.revolutions_per_second * TAU
    }
}

impl Default for RotationSpeed {
    fn default() -> Self {
        Self::LEISURELY
    }
}

/// Fixed camera: look-at placement and perspective frustum.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Right-handed perspective with wgpu's `[0, 1]` clip depth.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Everything the pipeline needs besides the surface aspect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformConfig {
    pub speed: RotationSpeed,
    pub axis: Vec3,
    pub camera: CameraConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            speed: RotationSpeed::default(),
            axis: Vec3::new(1.0, 2.0, 0.0),
            camera: CameraConfig::default(),
        }
    }
}

/// World/view/projection state of a spinning object.
///
/// `view` and `projection` are fixed at [`initialize`](Self::initialize);
/// `world` is rebuilt from identity on every [`tick`](Self::tick) as an absolute
/// rotation of `angle(elapsed)` about the configured axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPipeline {
    config: TransformConfig,
    axis: Vec3,
    world: Mat4,
    view: Mat4,
    proj: Mat4,
    angle: f64,
}

impl TransformPipeline {
    pub fn initialize(config: TransformConfig, aspect: f32) -> Self {
        // A zero axis has no rotation plane; fall back to spinning about +Y.
        let axis = config.axis.try_normalize().unwrap_or(Vec3::Y);
        Self {
            view: config.camera.view(),
            proj: config.camera.projection(aspect),
            config,
            axis,
            world: Mat4::IDENTITY,
            angle: 0.0,
        }
    }

    /// Recomputes `world` for `elapsed` seconds since start.
    pub fn tick(&mut self, elapsed: f64) -> Mat4 {
        self.angle = self.config.speed.angle_at(elapsed);
        // Reduce in f64 so the f32 rotation stays precise for long sessions.
        let wrapped = (self.angle % TAU) as f32;
        self.world = Mat4::from_axis_angle(self.axis, wrapped);
        self.world
    }

    /// Rebuilds the projection for a new surface aspect.
    pub fn resize(&mut self, aspect: f32) {
        self.proj = self.config.camera.projection(aspect);
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.proj
    }

    /// Unwrapped angle in radians from the last tick.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }
}
