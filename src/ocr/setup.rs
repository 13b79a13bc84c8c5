use anyhow::{Result, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::log;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

#[cfg(windows)]
const TESSERACT_BIN: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_BIN: &str = "tesseract";

/// Well-known Tesseract install locations.
const COMMON_EXECUTABLE_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Well-known tessdata locations shipped with system installs.
const COMMON_TESSDATA_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

/// Returns the per-user directory for Tesseract files.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zone-monitor")
        .join("tesseract")
}

fn traineddata_name(language: &str) -> String {
    format!("{}.traineddata", language)
}

/// Makes sure `<language>.traineddata` is available, copying it from a system
/// install or downloading it into the per-user directory when missing.
///
/// Returns the tessdata directory to pass to Tesseract.
pub fn ensure_tessdata(language: &str) -> Result<PathBuf> {
    if let Some(dir) = find_tessdata_dir(language) {
        log(&format!("tessdata found at: {}", dir.display()));
        return Ok(dir);
    }

    let tessdata_dir = get_tesseract_dir().join("tessdata");
    fs::create_dir_all(&tessdata_dir)?;
    download_tessdata(&tessdata_dir, language)?;

    log(&format!("tessdata ready at: {}", tessdata_dir.display()));
    Ok(tessdata_dir)
}

/// Downloads trained data for `language` from the tessdata repository.
fn download_tessdata(tessdata_dir: &Path, language: &str) -> Result<()> {
    let file_name = traineddata_name(language);
    let url = format!("{}/{}", TESSDATA_REPO, file_name);
    let target = tessdata_dir.join(&file_name);

    log(&format!("Downloading {}...", file_name));

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "zone-monitor")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            file_name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&target)?;
    file.write_all(&bytes)?;

    log(&format!("Downloaded {} ({} bytes)", file_name, bytes.len()));
    Ok(())
}

/// Finds the Tesseract executable: our local dir, then PATH, then common paths.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    let local_exe = get_tesseract_dir().join(TESSERACT_BIN);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory that contains `<language>.traineddata`.
pub fn find_tessdata_dir(language: &str) -> Option<PathBuf> {
    let file_name = traineddata_name(language);

    let mut candidates = vec![get_tesseract_dir().join("tessdata")];
    candidates.extend(COMMON_TESSDATA_PATHS.iter().map(PathBuf::from));
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    first_dir_containing(&candidates, &file_name)
}

fn first_dir_containing(candidates: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join(file_name).is_file())
        .cloned()
}
