use image::RgbaImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::preprocess::prepare_for_ocr;
use super::setup::{find_tessdata_dir, find_tesseract_executable};
use crate::error::ExtractionError;
use crate::monitor::config::OcrConfig;

/// The OCR collaborator: image in, text fragments out, in reading order.
pub trait TextRecognizer: Send {
    fn recognize(&mut self, image: &RgbaImage) -> Result<Vec<String>, ExtractionError>;
}

/// Runs the Tesseract CLI on each image.
pub struct TesseractEngine {
    executable: Result<PathBuf, String>,
    tessdata: Option<PathBuf>,
    settings: OcrConfig,
}

impl TesseractEngine {
    /// Locates Tesseract and its trained data once. A missing executable is
    /// not fatal here; every `recognize` call then reports it.
    pub fn locate(settings: OcrConfig) -> Self {
        let executable = find_tesseract_executable().map_err(|e| e.to_string());
        match &executable {
            Ok(path) => crate::log(&format!("Using Tesseract at: {}", path.display())),
            Err(e) => crate::log(&format!("Warning: {}", e)),
        }
        let tessdata = find_tessdata_dir(&settings.language);
        Self {
            executable,
            tessdata,
            settings,
        }
    }

    /// Runs Tesseract with TSV output and returns one string per text line.
    fn recognize_lines(&self, image: &RgbaImage) -> Result<Vec<String>, ExtractionError> {
        let executable = self
            .executable
            .as_ref()
            .map_err(|e| ExtractionError::EngineUnavailable(e.clone()))?;

        let prepared = prepare_for_ocr(image, &self.settings);

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        prepared.save(temp_input.path())?;

        // Create temporary output base (Tesseract adds .tsv extension)
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        let output = command
            .arg("-l")
            .arg(&self.settings.language)
            .arg("--psm")
            .arg(self.settings.page_segmentation_mode.to_string())
            .arg("tsv")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Engine(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path);
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content?))
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&mut self, image: &RgbaImage) -> Result<Vec<String>, ExtractionError> {
        self.recognize_lines(image)
    }
}

/// Parses Tesseract TSV output into lines of space-joined words.
///
/// Words (level 5) are grouped by their (block, paragraph, line) numbers.
/// Words with negative confidence or empty text are dropped.
pub fn parse_tsv_output(tsv: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<&str> = Vec::new();

    // Skip header
    for row in tsv.lines().skip(1) {
        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        if level != 5 {
            continue;
        }

        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        let conf: f32 = fields[10].trim().parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        if text.is_empty() || conf < 0.0 {
            continue;
        }

        if current_key != Some(key) {
            push_line(&mut lines, std::mem::take(&mut current_words));
            current_key = Some(key);
        }

        current_words.push(text);
    }

    push_line(&mut lines, current_words);
    lines
}

fn push_line(lines: &mut Vec<String>, words: Vec<&str>) {
    if !words.is_empty() {
        lines.push(words.join(" "));
    }
}
