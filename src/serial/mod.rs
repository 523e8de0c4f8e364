mod i2c;

pub use i2c::*;
