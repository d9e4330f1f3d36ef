//! Platform capabilities behind the core traits.

pub mod pointer;
pub mod screen;
pub mod tesseract;

pub use pointer::EnigoActuator;
pub use screen::ScreenSource;
pub use tesseract::Tesseract;
