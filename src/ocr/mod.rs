pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::TesseractEngine;
pub use extract::TextExtractor;
pub use setup::ensure_tessdata;
