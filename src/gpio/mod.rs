#[cfg(target_os = "espidf")]
mod digital_in;
#[cfg(target_os = "espidf")]
mod digital_out;
mod pins;

#[cfg(target_os = "espidf")]
pub use {digital_in::*, digital_out::*};
pub use pins::*;
