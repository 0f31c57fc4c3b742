mod catalog;
mod detector;
pub mod saves;
mod scanner;

pub use catalog::EmulatorCatalog;
pub use detector::{DetectedEmulator, EmulatorDetector};
