use std::{
    marker::PhantomData,
    ops::{Add, AddAssign, Div, Mul},
};

use bytemuck::{Pod, Zeroable};

pub mod colorspace;

/// Tristimulus value in a given colorspace. Only linear colorspaces should be used for arithmetic.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Zeroable)]
pub struct Color<S>(pub [f32; 3], PhantomData<S>)
where
    S: colorspace::Colorspace;

unsafe impl<S: colorspace::Colorspace> Pod for Color<S> {}

impl<S: colorspace::Colorspace> Default for Color<S> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<S: colorspace::Colorspace> Add for Color<S> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_array(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl<S: colorspace::Colorspace> AddAssign for Color<S> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Component-wise product, used to modulate a radiance by a reflectance
impl<S: colorspace::Colorspace> Mul for Color<S> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_array(std::array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

impl<S: colorspace::Colorspace> Mul<Color<S>> for f32 {
    type Output = Color<S>;

    fn mul(self, rhs: Color<S>) -> Self::Output {
        Color::from_array(rhs.0.map(|c| self * c))
    }
}

impl<S: colorspace::Colorspace> Div<f32> for Color<S> {
    type Output = Color<S>;

    fn div(self, rhs: f32) -> Self::Output {
        Color::from_array(self.0.map(|c| c / rhs))
    }
}

#[allow(non_camel_case_types)]
pub type sRgb = Color<colorspace::sRGB>;
pub type Rgb = Color<colorspace::Linear_RGB>;

impl<S: colorspace::Colorspace> Color<S> {
    pub const fn from_array(arr: [f32; 3]) -> Self {
        Self(arr, PhantomData)
    }

    pub const fn splat(v: f32) -> Self {
        Self::from_array([v, v, v])
    }

    pub const fn to_array(self) -> [f32; 3] {
        self.0
    }

    pub fn to_byte_array(self) -> [u8; 3] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255. + 0.5) as u8)
    }

    pub fn max_element(self) -> f32 {
        self.0.into_iter().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn is_finite(self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    pub fn is_black(self) -> bool {
        self.0.iter().all(|&c| c == 0.0)
    }
}

impl<S: colorspace::Colorspace> From<[f32; 3]> for Color<S> {
    fn from(val: [f32; 3]) -> Self {
        Color::<S>::from_array(val)
    }
}

pub trait ColorspaceConversion<C: colorspace::Colorspace> {
    fn convert(self) -> Color<C>;
}

impl<C: colorspace::Colorspace> ColorspaceConversion<C> for Color<C> {
    fn convert(self) -> Color<C> {
        self
    }
}

macro_rules! xyz_conversions {
    ($c:ty) => {
        impl ColorspaceConversion<colorspace::CIE_XYZ> for Color<$c> {
            fn convert(self) -> Color<colorspace::CIE_XYZ> {
                Color::from_array(<$c as colorspace::Colorspace>::to_cie_xyz(self.to_array()))
            }
        }
        impl ColorspaceConversion<$c> for Color<colorspace::CIE_XYZ> {
            fn convert(self) -> Color<$c> {
                Color::from_array(<$c as colorspace::Colorspace>::from_cie_xyz(self.to_array()))
            }
        }
    };
}

xyz_conversions!(colorspace::sRGB);
xyz_conversions!(colorspace::Linear_RGB);

impl ColorspaceConversion<colorspace::Linear_RGB> for sRgb {
    fn convert(self) -> Rgb {
        Color::from_array(self.to_array().map(colorspace::srgb_decode))
    }
}

impl ColorspaceConversion<colorspace::sRGB> for Rgb {
    fn convert(self) -> sRgb {
        Color::from_array(self.to_array().map(colorspace::srgb_encode))
    }
}

/// Relative luminance, the Y coordinate of CIE XYZ
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Zeroable, Pod)]
pub struct Luma(pub f32);

impl Luma {
    pub fn from_color<C: ColorspaceConversion<colorspace::CIE_XYZ>>(val: C) -> Self {
        Luma(val.convert().0[1])
    }
}

impl Rgb {
    /// Scalar brightness used as the resampling target
    pub fn luminance(self) -> f32 {
        Luma::from_color(self).0
    }
}

pub mod linear {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb::from_array([1.0, 1.0, 1.0]);
    pub const BLACK: Rgb = Rgb::from_array([0.0, 0.0, 0.0]);
    pub const RED: Rgb = Rgb::from_array([1.0, 0.0, 0.0]);
    pub const GREEN: Rgb = Rgb::from_array([0.0, 1.0, 0.0]);
    pub const BLUE: Rgb = Rgb::from_array([0.0, 0.0, 1.0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_of_grey_is_grey() {
        assert!((Rgb::splat(0.5).luminance() - 0.5).abs() < 1e-3);
        assert!((linear::GREEN.luminance() - 0.7152).abs() < 1e-4);
        assert_eq!(linear::BLACK.luminance(), 0.0);
    }

    #[test]
    fn srgb_encoding() {
        let encoded: sRgb = Rgb::splat(1.0).convert();
        assert_eq!(encoded.to_byte_array(), [255, 255, 255]);
        let mid: sRgb = Rgb::splat(0.214).convert();
        assert!((mid.0[0] - 0.5).abs() < 1e-2);
        let back: Rgb = mid.convert();
        assert!((back.0[0] - 0.214).abs() < 1e-3);
    }
}
