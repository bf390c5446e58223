pub use crate::display::{frame_to_rgb24, Display, Error};

mod display;
