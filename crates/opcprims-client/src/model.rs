//! LED layout models.
//!
//! A model is a JSON array indexed by pixel number. Each element is `null`
//! (no LED at that index) or an object with a 3D `point` and optional
//! layout metadata.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// One LED position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPoint {
    #[serde(default, deserialize_with = "deserialize_point")]
    pub point: Vec3,
    /// Integer location of the block in the overall grid.
    #[serde(rename = "gridXY", default, skip_serializing_if = "Option::is_none")]
    pub grid_xy: Option<[i32; 2]>,
    /// Location within the block, each axis in `[-1, 1]`.
    #[serde(rename = "blockXY", default, skip_serializing_if = "Option::is_none")]
    pub block_xy: Option<[f32; 2]>,
    /// Angle within the block in radians. Zero is +Y.
    #[serde(rename = "blockAngle", default, skip_serializing_if = "Option::is_none")]
    pub block_angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<Vec<usize>>,
}

impl ModelPoint {
    pub fn new(point: Vec3) -> Self {
        Self {
            point,
            grid_xy: None,
            block_xy: None,
            block_angle: None,
            neighbors: None,
        }
    }
}

impl From<Vec3> for ModelPoint {
    fn from(point: Vec3) -> Self {
        Self::new(point)
    }
}

/// Axis-aligned bounding box of the points in a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// An ordered list of LED positions. Index `i` is pixel `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model {
    points: Vec<Option<ModelPoint>>,
}

impl Model {
    pub fn new(points: Vec<Option<ModelPoint>>) -> Self {
        Self { points }
    }

    /// Parse a model from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn points(&self) -> &[Option<ModelPoint>] {
        &self.points
    }

    /// Number of pixels, including `null` entries.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of `null` entries.
    pub fn unused(&self) -> usize {
        self.points.iter().filter(|p| p.is_none()).count()
    }

    /// Bounding box over the non-null points, or `None` if there are none.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.points.iter().flatten().map(|p| p.point);
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Bounds { min, max })
    }
}

impl From<Vec<Option<ModelPoint>>> for Model {
    fn from(points: Vec<Option<ModelPoint>>) -> Self {
        Self::new(points)
    }
}

/// Read a model from a JSON file.
pub fn load_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ClientError::Model {
        path: path.to_path_buf(),
        source,
    })?;
    let model = Model::from_json_str(&json)?;
    debug!(path = %path.display(), pixels = model.len(), "model loaded");
    Ok(model)
}

/// Accept `[x, y, z]` with any component missing or `null`; missing
/// components are zero.
pub(crate) fn deserialize_point<'de, D>(deserializer: D) -> std::result::Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    let coords = Option::<Vec<Option<f32>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(point_from_components(&coords))
}

/// Build a point from up to three optional components, zero-filling the rest.
pub fn point_from_components(coords: &[Option<f32>]) -> Vec3 {
    let axis = |i: usize| coords.get(i).copied().flatten().unwrap_or(0.0);
    Vec3::new(axis(0), axis(1), axis(2))
}
