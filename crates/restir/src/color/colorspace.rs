//! Colorspaces as zero sized marker types.
//!
//! Everything is expressed relative to CIE XYZ. Rendering happens in linear RGB, sRGB is only for
//! storage.

use glam::{Mat3, Vec3};

pub trait Colorspace: Copy + Clone + Send + Sync + bytemuck::Zeroable + bytemuck::Pod {
    fn from_cie_xyz(coord: [f32; 3]) -> [f32; 3];
    fn to_cie_xyz(coord: [f32; 3]) -> [f32; 3];
}

const XYZ_TO_LINEAR: Mat3 = Mat3::from_cols(
    Vec3::new(3.2406, -0.9689, 0.0557),
    Vec3::new(-1.5372, 1.8758, -0.2040),
    Vec3::new(-0.4986, 0.0415, 1.0570),
);

const LINEAR_TO_XYZ: Mat3 = Mat3::from_cols(
    Vec3::new(0.4124, 0.2126, 0.0193),
    Vec3::new(0.3576, 0.7152, 0.1192),
    Vec3::new(0.1805, 0.0722, 0.9505),
);

/// sRGB transfer function, linear to encoded. Clamps to [0, 1].
pub fn srgb_encode(linear: f32) -> f32 {
    if linear.is_nan() {
        return 0.0;
    }
    let linear = linear.clamp(0.0, 1.0);
    if linear < 0.0031308 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// sRGB transfer function, encoded to linear. Clamps to [0, 1].
pub fn srgb_decode(encoded: f32) -> f32 {
    if encoded.is_nan() {
        return 0.0;
    }
    let encoded = encoded.clamp(0.0, 1.0);
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear sRGB primaries
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
#[allow(non_camel_case_types)]
pub struct Linear_RGB;

impl Colorspace for Linear_RGB {
    fn from_cie_xyz(coord: [f32; 3]) -> [f32; 3] {
        (XYZ_TO_LINEAR * Vec3::from_array(coord)).to_array()
    }

    fn to_cie_xyz(coord: [f32; 3]) -> [f32; 3] {
        (LINEAR_TO_XYZ * Vec3::from_array(coord)).to_array()
    }
}

/// Gamma encoded sRGB. Don't do math on it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
#[allow(non_camel_case_types)]
pub struct sRGB;

impl Colorspace for sRGB {
    fn from_cie_xyz(coord: [f32; 3]) -> [f32; 3] {
        Linear_RGB::from_cie_xyz(coord).map(srgb_encode)
    }

    fn to_cie_xyz(coord: [f32; 3]) -> [f32; 3] {
        Linear_RGB::to_cie_xyz(coord.map(srgb_decode))
    }
}

/// Y is the relative luminance
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
#[allow(non_camel_case_types)]
pub struct CIE_XYZ;

impl Colorspace for CIE_XYZ {
    fn from_cie_xyz(coord: [f32; 3]) -> [f32; 3] {
        coord
    }

    fn to_cie_xyz(coord: [f32; 3]) -> [f32; 3] {
        coord
    }
}
