//! 肺内血管的提取与去噪.

mod denoise;
mod isolate;

pub use denoise::{denoise_vessels, DenoiseStrategy};
pub use isolate::isolate_vessels;
