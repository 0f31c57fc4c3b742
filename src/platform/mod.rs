pub mod catalog;
mod detector;

pub use catalog::PlatformDescriptor;
pub use detector::PlatformDetector;
