//! Core geometry types shared across the simulator
//!
//! Positions are expressed in meters in a local tangent-plane frame
//! (x east, y north, z up). All angles exposed by the helpers are degrees.

use serde::{Deserialize, Serialize};

/// 3D position or displacement in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// East coordinate (m)
    pub x: f64,
    /// North coordinate (m)
    pub y: f64,
    /// Up coordinate (m)
    pub z: f64,
}

impl Vector3 {
    /// Creates a new vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Euclidean length of the vector.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Vector3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Horizontal (ground-plane) distance to another point.
    pub fn horizontal_distance_to(&self, other: &Vector3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Azimuth from this point toward `other`, in degrees.
    ///
    /// 0° points east (+x), 90° north (+y), range (-180, 180].
    pub fn azimuth_deg_to(&self, other: &Vector3) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Elevation from this point toward `other`, in degrees.
    ///
    /// Positive when `other` is above this point, range [-90, 90].
    pub fn elevation_deg_to(&self, other: &Vector3) -> f64 {
        let horizontal = self.horizontal_distance_to(other);
        let dz = other.z - self.z;
        dz.atan2(horizontal).to_degrees()
    }
}

impl std::ops::Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::fmt::Display for Vector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}
