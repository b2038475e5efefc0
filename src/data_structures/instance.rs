//! Per-draw model transforms.
//!
//! An [`Instance`] places a mesh or model in the world; its matrix is what
//! goes into the `model` uniform before a draw.

use cgmath::{One, Rotation3};

/// Translation, rotation (as quaternion) and non-uniform scale, applied scale first.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transform.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn rotated<A: Into<cgmath::Rad<f32>>>(
        position: cgmath::Vector3<f32>,
        axis: cgmath::Vector3<f32>,
        angle: A,
    ) -> Self {
        use cgmath::InnerSpace;
        Self {
            position,
            rotation: cgmath::Quaternion::from_axis_angle(axis.normalize(), angle),
            ..Self::new()
        }
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale = cgmath::Vector3::new(factor, factor, factor);
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}
