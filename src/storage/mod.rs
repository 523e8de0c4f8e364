mod sdcard;

pub use sdcard::*;
