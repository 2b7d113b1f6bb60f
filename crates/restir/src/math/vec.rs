pub use glam::{Vec2, Vec3};

use crate::color::Rgb;

pub trait RgbAsVec3Ext {
    fn vec(&self) -> Vec3;
}

impl RgbAsVec3Ext for Rgb {
    fn vec(&self) -> Vec3 {
        Vec3::from_array(self.0)
    }
}

pub trait Vec3AsRgbExt {
    fn rgb(&self) -> Rgb;
}

impl Vec3AsRgbExt for Vec3 {
    fn rgb(&self) -> Rgb {
        Rgb::from_array(self.to_array())
    }
}

pub trait Vec3SameDirExt {
    fn same_direction(self, other: Self) -> Self;
}

impl Vec3SameDirExt for Vec3 {
    /// Returns self if self and other point in the same general direction, -self otherwise
    fn same_direction(self, other: Self) -> Self {
        if self.dot(other) >= 0.0 {
            self
        } else {
            -self
        }
    }
}

pub trait Vec3AsNonZero: Sized {
    fn into_non_zero(self, eps: f32) -> Option<Self>;
}

impl Vec3AsNonZero for Vec3 {
    fn into_non_zero(self, eps: f32) -> Option<Self> {
        use super::float::FloatAsExt;
        self.length_squared().into_non_zero(eps * eps).and(Some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_direction_flips_backfacing() {
        assert_eq!(Vec3::Z.same_direction(Vec3::new(0.3, 0.0, 1.0)), Vec3::Z);
        assert_eq!(Vec3::Z.same_direction(-Vec3::Z), -Vec3::Z);
        assert!(Vec3::splat(1e-5).into_non_zero(1e-3).is_none());
        assert!(Vec3::X.into_non_zero(1e-3).is_some());
    }
}
