//! Point-light particles.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::{scale, Color, BLACK};
use crate::model::deserialize_point;

/// A point light. Its contribution at distance `d` is
/// `color * intensity / (1 + falloff * d²)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    #[serde(default, deserialize_with = "deserialize_point")]
    pub point: Vec3,
    pub color: Color,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub falloff: f32,
}

fn default_intensity() -> f32 {
    1.0
}

impl Particle {
    pub fn new(point: Vec3, color: Color, intensity: f32, falloff: f32) -> Self {
        Self {
            point,
            color,
            intensity,
            falloff,
        }
    }

    /// Light this particle adds at `at`.
    pub fn contribution(&self, at: Vec3) -> Color {
        let d2 = at.distance_squared(self.point);
        let k = self.intensity / (1.0 + self.falloff * d2);
        scale(self.color, k)
    }
}

/// Sum the contribution of every particle at `at`. No particles is black.
pub fn shade(particles: &[Particle], at: Vec3) -> Color {
    particles.iter().fold(BLACK, |acc, particle| {
        let c = particle.contribution(at);
        [acc[0] + c[0], acc[1] + c[1], acc[2] + c[2]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_particle_center_with_no_falloff() {
        let p = Particle::new(Vec3::new(1.0, 2.0, 3.0), [100.0, 50.0, 10.0], 2.0, 0.0);
        assert_eq!(shade(&[p], p.point), [200.0, 100.0, 20.0]);
    }

    #[test]
    fn falloff_is_inverse_square() {
        let p = Particle::new(Vec3::ZERO, [90.0, 90.0, 90.0], 1.0, 2.0);
        // d² = 4, 1 + 2*4 = 9
        assert_eq!(p.contribution(Vec3::new(0.0, 2.0, 0.0)), [10.0, 10.0, 10.0]);
    }

    #[test]
    fn contributions_add() {
        let a = Particle::new(Vec3::ZERO, [10.0, 0.0, 0.0], 1.0, 0.0);
        let b = Particle::new(Vec3::X, [0.0, 20.0, 0.0], 0.5, 0.0);
        assert_eq!(shade(&[a, b], Vec3::ZERO), [10.0, 10.0, 0.0]);
    }

    #[test]
    fn no_particles_is_black() {
        assert_eq!(shade(&[], Vec3::new(5.0, 5.0, 5.0)), BLACK);
    }

    #[test]
    fn json_missing_coordinates_are_zero() {
        let p: Particle =
            serde_json::from_str(r#"{"point": [1.0], "color": [255, 0, 0], "falloff": 0.5}"#)
                .unwrap();
        assert_eq!(p.point, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.intensity, 1.0);

        let p: Particle = serde_json::from_str(r#"{"color": [1, 2, 3]}"#).unwrap();
        assert_eq!(p.point, Vec3::ZERO);
        assert_eq!(p.falloff, 0.0);
    }
}
