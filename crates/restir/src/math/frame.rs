use glam::{Mat3, Vec3};

/// Orthonormal frame around a unit vector, used to map directions sampled around +z to world space.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    frame: Mat3,
}

impl Frame {
    /// Branchless construction from “Building an Orthonormal Basis, Revisited” (JCGT 2017).
    /// `n` must be normalized and becomes the +z axis.
    pub fn new(n: Vec3) -> Self {
        let sign = f32::signum(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        Self {
            frame: Mat3::from_cols(
                Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
                Vec3::new(b, sign + n.y * n.y * a, -n.y),
                n,
            ),
        }
    }

    pub fn to_local(&self, global: Vec3) -> Vec3 {
        self.frame.transpose() * global
    }

    pub fn from_local(&self, local: Vec3) -> Vec3 {
        self.frame * local
    }

    pub fn x(&self) -> Vec3 {
        self.frame.x_axis
    }

    pub fn y(&self) -> Vec3 {
        self.frame.y_axis
    }

    pub fn z(&self) -> Vec3 {
        self.frame.z_axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_orthonormal() {
        for n in [
            Vec3::Z,
            -Vec3::Z,
            Vec3::X,
            Vec3::new(0.3, -0.4, 0.5).normalize(),
            Vec3::new(-0.1, 0.2, -0.9).normalize(),
        ] {
            let frame = Frame::new(n);
            assert!((frame.x().length() - 1.0).abs() < 1e-5);
            assert!((frame.y().length() - 1.0).abs() < 1e-5);
            assert!(frame.x().dot(frame.y()).abs() < 1e-5);
            assert!(frame.x().dot(n).abs() < 1e-5);
            assert!(frame.y().dot(n).abs() < 1e-5);
            assert!(frame.from_local(Vec3::Z).distance(n) < 1e-5);
            let v = Vec3::new(0.2, 0.7, -0.1);
            assert!(frame.to_local(frame.from_local(v)).distance(v) < 1e-5);
        }
    }
}
