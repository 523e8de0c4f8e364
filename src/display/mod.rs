mod oled;

pub use oled::*;
