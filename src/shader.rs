//! Named-uniform shader binding.
//!
//! Anything that draws talks to a shader through [`ShaderProgram`]: make the
//! program active, then assign uniforms by name. How the values reach the GPU
//! is up to the implementation. [`Shader`] only records them: it keeps the
//! last value assigned to each name, and callers read them back through
//! [`Shader::uniform`] or [`Shader::uniforms`]. Nothing here writes to the GPU.

use std::{collections::BTreeMap, path::Path};

use cgmath::{Matrix4, Vector3};

use crate::error::{RenderError, Result};

pub trait ShaderProgram {
    fn activate(&mut self);

    fn set_int(&mut self, name: &str, value: i32);

    fn set_float(&mut self, name: &str, value: f32);

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);

    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vector3<f32>),
    Mat4(Matrix4<f32>),
}

#[derive(Clone, Debug, Default)]
pub struct Shader {
    pub label: String,
    source: String,
    uniforms: BTreeMap<String, UniformValue>,
    active: bool,
}

impl Shader {
    pub fn new(label: &str, source: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Reads the shader source from disk; compiling it is the pipeline's job.
    pub fn from_file(label: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
        Ok(Self::new(label, source))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.uniforms.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }
}

impl ShaderProgram for Shader {
    fn activate(&mut self) {
        self.active = true;
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set(name, UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.set(name, UniformValue::Vec3(value));
    }

    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        self.set(name, UniformValue::Mat4(value));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn later_assignments_overwrite_earlier_ones() {
        let mut shader = Shader::new("test", "");
        shader.set_int("texture_diffuse1", 0);
        shader.set_int("texture_diffuse1", 3);
        shader.set_float("material.shininess", 64.0);
        assert_eq!(shader.uniform("texture_diffuse1"), Some(&UniformValue::Int(3)));
        assert_eq!(shader.uniforms().count(), 2);
        assert!(!shader.is_active());
        shader.activate();
        assert!(shader.is_active());
    }

    #[test]
    fn uniforms_read_back_by_name_in_name_order() {
        let mut shader = Shader::new("test", "");
        shader.set_vec3("light.direction", Vector3::new(-0.2, -1.0, -0.3));
        shader.set_mat4("model", Matrix4::from_scale(2.0));
        shader.set_int("texture_specular1", 1);
        let names: Vec<_> = shader.uniforms().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["light.direction", "model", "texture_specular1"]);
        assert_eq!(shader.uniform("model"), Some(&UniformValue::Mat4(Matrix4::from_scale(2.0))));
        assert_eq!(shader.uniform("view"), None);
    }

    #[test]
    fn from_file_reads_source() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "@vertex fn vs_main() {{}}")?;
        let shader = Shader::from_file("basic", file.path())?;
        assert_eq!(shader.source(), "@vertex fn vs_main() {}");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Shader::from_file("missing", "/definitely/not/here.wgsl").unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
