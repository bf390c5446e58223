use sdl2::pixels::PixelFormatEnum;
use thiserror::Error;

use emu8::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use emu8::Frame;

const BYTES_PER_PIXEL: usize = 3;

/// SDL2 reports most of its errors as bare strings
#[derive(Error, Debug)]
pub enum Error {
    #[error("sdl2: {0}")]
    Sdl(String),
}

fn sdl_err(err: impl ToString) -> Error {
    Error::Sdl(err.to_string())
}

/// # Display
/// The Chip-8 display is composed of 64x32 pixels black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array of 64x32 bytes.
/// The display only gets a call to `render` when the Chip-8 frame buffer is updated.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, Error> {
        let video_subsystem = sdl.video().map_err(sdl_err)?;
        let window = video_subsystem
            .window(
                "Emu-8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(sdl_err)?;
        let canvas = window.into_canvas().build().map_err(sdl_err)?;
        log::debug!("opened a {}x scale window", scale);

        let mut display = Display { canvas };
        display.render(&[[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT])?;
        Ok(display)
    }

    /// Formats the Chip-8 frame as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a snapshot of the Chip-8 frame buffer
    pub fn render(&mut self, frame: &Frame) -> Result<(), Error> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(sdl_err)?;

        let rgb = frame_to_rgb24(frame);
        let row_len = DISPLAY_WIDTH * BYTES_PER_PIXEL;
        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                for (y, row) in rgb.chunks(row_len).enumerate() {
                    buffer[y * pitch..y * pitch + row_len].copy_from_slice(row);
                }
            })
            .map_err(sdl_err)?;

        self.canvas.copy(&texture, None, None).map_err(sdl_err)?;
        self.canvas.present();
        Ok(())
    }
}

/// Formats a Chip-8 frame as rows of RGB pixels.
///
/// This creates a black and white rendering by:
/// - Flattening the 2D frame into a 1D array by concatenating its rows
/// - Triplicating each element of that 1D array to represent the RGB values of each pixel
/// - Multiplying each value by 255 to convert from a binary state to 0-255 intensity
pub fn frame_to_rgb24(frame: &Frame) -> Vec<u8> {
    frame
        .iter()
        .flat_map(|row| row.iter())
        .flat_map(|&pixel| std::iter::repeat(pixel * 255).take(BYTES_PER_PIXEL))
        .collect()
}
