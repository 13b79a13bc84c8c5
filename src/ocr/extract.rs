use image::RgbaImage;

use super::engine::TextRecognizer;
use crate::error::ExtractionError;

/// Turns a captured region into one normalized text sample.
pub struct TextExtractor {
    recognizer: Box<dyn TextRecognizer>,
}

impl TextExtractor {
    pub fn new(recognizer: Box<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Returns the text found in `image`, or an empty string if none.
    ///
    /// Fragments are kept in the order the recognizer returned them, one per
    /// line, and the result is trimmed.
    pub fn extract(&mut self, image: &RgbaImage) -> Result<String, ExtractionError> {
        let fragments = self.recognizer.recognize(image)?;
        Ok(join_fragments(&fragments))
    }
}

/// Joins OCR fragments with newlines and trims the result.
pub fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
