//! Phong light sources and the uniforms that describe them.
//!
//! A scene carries one directional light, any number of point lights and an
//! optional spot light. [`Lighting::apply`] writes them under the uniform
//! names the lit shader declares:
//!
//! - `dirLight.{direction,ambient,diffuse,specular}`
//! - `pointLights[i].{position,ambient,diffuse,specular,constant,linear,quadratic}`
//! - `spotLight.{position,direction,ambient,diffuse,specular,constant,linear,quadratic,innerCutOff,outerCutOff}`
//! - `material.shininess`

use cgmath::{Angle, Deg, EuclideanSpace, Vector3};

use crate::{camera::Camera, data_structures::cube::POINT_LIGHT_POSITIONS, shader::ShaderProgram};

#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-0.2, -1.0, -0.3),
            ambient: Vector3::new(0.2, 0.2, 0.2),
            diffuse: Vector3::new(0.5, 0.5, 0.5),
            specular: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Distance falloff `1 / (constant + linear * d + quadratic * d²)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// Roughly a 50 unit reach.
    pub const MEDIUM: Attenuation = Attenuation {
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
    };

    pub fn at(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    fn apply(&self, shader: &mut dyn ShaderProgram, prefix: &str) {
        shader.set_float(&format!("{prefix}constant"), self.constant);
        shader.set_float(&format!("{prefix}linear"), self.linear);
        shader.set_float(&format!("{prefix}quadratic"), self.quadratic);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ambient: Vector3::new(0.05, 0.05, 0.05),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::MEDIUM,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
    /// Full intensity inside this cone.
    pub inner_cut_off: Deg<f32>,
    /// Zero intensity outside this cone; in between it fades linearly in cosine space.
    pub outer_cut_off: Deg<f32>,
}

impl SpotLight {
    /// A torch held at the camera and pointing where it looks.
    pub fn flashlight(camera: &Camera) -> Self {
        Self {
            position: camera.position.to_vec(),
            direction: camera.front(),
            ambient: Vector3::new(0.0, 0.0, 0.0),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::MEDIUM,
            inner_cut_off: Deg(12.5),
            outer_cut_off: Deg(17.5),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub directional: DirectionalLight,
    pub points: Vec<PointLight>,
    pub spot: Option<SpotLight>,
    pub shininess: f32,
}

impl Lighting {
    /// Directional light, the four demo point lights and a flashlight on `camera`.
    pub fn demo_scene(camera: &Camera) -> Self {
        Self {
            directional: DirectionalLight::default(),
            points: POINT_LIGHT_POSITIONS
                .iter()
                .map(|&p| PointLight::at(p.into()))
                .collect(),
            spot: Some(SpotLight::flashlight(camera)),
            shininess: 64.0,
        }
    }

    /// Moves the spot light (if any) to the camera's pose.
    pub fn follow_camera(&mut self, camera: &Camera) {
        if let Some(spot) = self.spot.as_mut() {
            spot.position = camera.position.to_vec();
            spot.direction = camera.front();
        }
    }

    pub fn apply(&self, shader: &mut dyn ShaderProgram) {
        let dir = &self.directional;
        shader.set_vec3("dirLight.direction", dir.direction);
        shader.set_vec3("dirLight.ambient", dir.ambient);
        shader.set_vec3("dirLight.diffuse", dir.diffuse);
        shader.set_vec3("dirLight.specular", dir.specular);

        for (i, point) in self.points.iter().enumerate() {
            let prefix = format!("pointLights[{i}].");
            shader.set_vec3(&format!("{prefix}position"), point.position);
            shader.set_vec3(&format!("{prefix}ambient"), point.ambient);
            shader.set_vec3(&format!("{prefix}diffuse"), point.diffuse);
            shader.set_vec3(&format!("{prefix}specular"), point.specular);
            point.attenuation.apply(shader, &prefix);
        }

        if let Some(spot) = &self.spot {
            shader.set_vec3("spotLight.position", spot.position);
            shader.set_vec3("spotLight.direction", spot.direction);
            shader.set_vec3("spotLight.ambient", spot.ambient);
            shader.set_vec3("spotLight.diffuse", spot.diffuse);
            shader.set_vec3("spotLight.specular", spot.specular);
            spot.attenuation.apply(shader, "spotLight.");
            // the shader compares against dot products, so it gets cosines
            shader.set_float("spotLight.innerCutOff", spot.inner_cut_off.cos());
            shader.set_float("spotLight.outerCutOff", spot.outer_cut_off.cos());
        }

        shader.set_float("material.shininess", self.shininess);
    }
}

/// Point light data in the layout a WGSL uniform block expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    pub color: [f32; 3],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    _padding2: [u32; 2],
}

impl From<&PointLight> for LightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.into(),
            _padding: 0,
            color: light.diffuse.into(),
            constant: light.attenuation.constant,
            linear: light.attenuation.linear,
            quadratic: light.attenuation.quadratic,
            _padding2: [0; 2],
        }
    }
}
