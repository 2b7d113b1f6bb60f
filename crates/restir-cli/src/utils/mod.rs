use core::fmt::Display;

use clap::ValueEnum;
use restir::{
    camera::Camera,
    resampling::SamplingMode,
    scene::{
        examples::{CornellBoxScene, QuadOverPlaneScene},
        SceneBuilder,
    },
    shading::ShadingMode,
};

#[derive(Debug, Default, Clone, Copy, ValueEnum)]
pub enum AvailableScene {
    #[default]
    CornellBox,
    QuadOverPlane,
}

impl AvailableScene {
    pub fn insert_into(self, builder: &mut SceneBuilder) {
        match self {
            AvailableScene::CornellBox => CornellBoxScene::insert_into(builder),
            AvailableScene::QuadOverPlane => QuadOverPlaneScene::default().insert_into(builder),
        }
    }

    pub fn camera(self, dimensions: Dimensions) -> restir::Result<Camera> {
        match self {
            AvailableScene::CornellBox => CornellBoxScene::camera(dimensions.width, dimensions.height),
            AvailableScene::QuadOverPlane => {
                QuadOverPlaneScene::default().camera(dimensions.width, dimensions.height)
            }
        }
    }
}

#[derive(Default, Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum AvailableOutput {
    /// Accumulated image, as PNG and EXR
    #[default]
    File,
    /// One PNG per frame
    Frames,
}

#[derive(Default, Debug, Clone, Copy, ValueEnum)]
pub enum AvailableSamplingMode {
    Uniform,
    Ris,
    #[default]
    Restir,
}

impl From<AvailableSamplingMode> for SamplingMode {
    fn from(val: AvailableSamplingMode) -> Self {
        match val {
            AvailableSamplingMode::Uniform => SamplingMode::Uniform,
            AvailableSamplingMode::Ris => SamplingMode::Ris,
            AvailableSamplingMode::Restir => SamplingMode::Restir,
        }
    }
}

#[derive(Default, Debug, Clone, Copy, ValueEnum)]
pub enum AvailableShading {
    #[default]
    Shading,
    Albedo,
    Normal,
    Vpl,
}

impl From<AvailableShading> for ShadingMode {
    fn from(val: AvailableShading) -> Self {
        match val {
            AvailableShading::Shading => ShadingMode::Shading,
            AvailableShading::Albedo => ShadingMode::Albedo,
            AvailableShading::Normal => ShadingMode::Normal,
            AvailableShading::Vpl => ShadingMode::Vpl,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::str::FromStr for Dimensions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split_it = s.split('x');
        let (Some(a), Some(b), None) = (split_it.next(), split_it.next(), split_it.next()) else {
            return Err(anyhow::anyhow!("Incorrect format, expected `width`x`height`"));
        };
        let width: u32 = a.parse()?;
        let height: u32 = b.parse()?;

        Ok(Dimensions { width, height })
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}x{}", self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dimensions() {
        let d: Dimensions = "640x480".parse().unwrap();
        assert_eq!(
            d,
            Dimensions {
                width: 640,
                height: 480
            }
        );
        assert_eq!(d.to_string(), "640x480");
        assert!("640".parse::<Dimensions>().is_err());
        assert!("640x480x3".parse::<Dimensions>().is_err());
        assert!("ax480".parse::<Dimensions>().is_err());
    }
}
