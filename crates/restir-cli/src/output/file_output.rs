use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{ImageBuffer, Rgb};
use restir::color::{colorspace, ColorspaceConversion};

use super::{FinalOutput, FrameOutput, Image};

pub struct FileOutput {
    pub hdr_outdir: Option<PathBuf>,
    pub ldr_outdir: Option<PathBuf>,
}

impl FileOutput {
    pub fn new(outdir: &Path) -> Self {
        Self {
            hdr_outdir: Some(outdir.join("hdr")),
            ldr_outdir: Some(outdir.join("ldr")),
        }
    }

    /// Only the 8 bit sRGB images
    pub fn ldr_only(outdir: &Path) -> Self {
        Self {
            hdr_outdir: None,
            ldr_outdir: Some(outdir.join("ldr")),
        }
    }
}

fn to_hdr(image: &Image<'_>) -> Option<ImageBuffer<Rgb<f32>, Vec<f32>>> {
    let raw: &[f32] = bytemuck::cast_slice(image.pixels);
    ImageBuffer::from_raw(image.dimensions.width, image.dimensions.height, raw.to_vec())
}

fn to_ldr(image: &Image<'_>) -> Option<ImageBuffer<Rgb<u8>, Vec<u8>>> {
    let raw: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|&c| ColorspaceConversion::<colorspace::sRGB>::convert(c).to_byte_array())
        .collect();
    ImageBuffer::from_raw(image.dimensions.width, image.dimensions.height, raw)
}

impl FinalOutput for FileOutput {
    fn commit(&self, accumulated: Image<'_>) -> Result<()> {
        if let Some(ref hdr_output) = self.hdr_outdir {
            std::fs::create_dir_all(hdr_output)?;
            log::info!("Saving HDR image...");
            let buffer = to_hdr(&accumulated).ok_or_else(|| anyhow::anyhow!("image size mismatch"))?;
            buffer.save(hdr_output.join("color.exr"))?;
        }
        if let Some(ref ldr_output) = self.ldr_outdir {
            std::fs::create_dir_all(ldr_output)?;
            log::info!("Saving LDR image...");
            let buffer = to_ldr(&accumulated).ok_or_else(|| anyhow::anyhow!("image size mismatch"))?;
            buffer.save(ldr_output.join("color.png"))?;
        }
        Ok(())
    }
}

impl FrameOutput for FileOutput {
    fn send_frame(&mut self, index: u32, frame: Image<'_>) -> Result<()> {
        let Some(ref ldr_output) = self.ldr_outdir else {
            return Ok(());
        };
        let frames_dir = ldr_output.join("frames");
        std::fs::create_dir_all(&frames_dir)?;
        let buffer = to_ldr(&frame).ok_or_else(|| anyhow::anyhow!("frame size mismatch"))?;
        buffer.save(frames_dir.join(format!("frame_{index:04}.png")))?;
        Ok(())
    }
}
