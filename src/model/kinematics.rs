// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A vector in the transverse plane, used for momenta and missing energy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a vector from its magnitude and azimuthal angle.
    pub fn from_polar(magnitude: f64, phi: f64) -> Self {
        Self {
            x: magnitude * phi.cos(),
            y: magnitude * phi.sin(),
        }
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn dot(&self, other: &Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_from_polar_round_trip_components() {
        let v = Vector2::from_polar(10.0, PI / 2.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 10.0).abs() < 1e-12);
        assert!((v.norm() - 10.0).abs() < 1e-12);
        assert!((v.phi() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_back_to_back_vectors_cancel() {
        let a = Vector2::from_polar(50.0, 0.3);
        let b = Vector2::from_polar(50.0, 0.3 + PI);
        assert!((a + b).norm() < 1e-9);
        assert!((a.dot(&b) + 2500.0).abs() < 1e-9);
    }
}
