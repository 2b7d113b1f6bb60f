mod file_output;

use anyhow::Result;
pub use file_output::FileOutput;
use restir::color::Rgb;

use crate::utils::Dimensions;

/// Row major image of linear radiance
pub struct Image<'a> {
    pub dimensions: Dimensions,
    pub pixels: &'a [Rgb],
}

/// Receives every frame as soon as it is rendered
pub trait FrameOutput: Send {
    fn send_frame(&mut self, index: u32, frame: Image<'_>) -> Result<()>;
}

pub struct DummyOutput {}
impl FrameOutput for DummyOutput {
    fn send_frame(&mut self, _index: u32, _frame: Image<'_>) -> Result<()> {
        Ok(())
    }
}

/// Receives the accumulated image once rendering is over
pub trait FinalOutput: Send {
    fn commit(&self, accumulated: Image<'_>) -> Result<()>;
}
