//! Desktop capture of a fixed region using GDI.
//!
//! GDI `BitBlt` from the screen DC reads any rectangle of the virtual desktop,
//! which is what the monitor needs. Other platforms report `Unsupported`.

use image::RgbaImage;

use super::region::Region;
use crate::error::CaptureError;

/// Produces one still image of a fixed region per call.
pub trait RegionCapturer: Send {
    fn capture(&mut self) -> Result<RgbaImage, CaptureError>;
}

/// Captures a region of the live desktop.
pub struct ScreenCapturer {
    region: Region,
}

impl ScreenCapturer {
    pub fn new(region: Region) -> Self {
        Self { region }
    }
}

impl RegionCapturer for ScreenCapturer {
    fn capture(&mut self) -> Result<RgbaImage, CaptureError> {
        capture_rect(
            self.region.left(),
            self.region.top(),
            self.region.width(),
            self.region.height(),
        )
    }
}

/// A full-display screenshot together with its desktop origin.
pub struct DisplayShot {
    pub image: RgbaImage,
    pub origin_x: i32,
    pub origin_y: i32,
}

/// Captures the whole primary display (used by the region selector).
pub fn capture_primary_display() -> Result<DisplayShot, CaptureError> {
    let (width, height) = primary_display_size()?;
    let image = capture_rect(0, 0, width, height)?;
    Ok(DisplayShot {
        image,
        origin_x: 0,
        origin_y: 0,
    })
}

#[cfg(windows)]
fn primary_display_size() -> Result<(u32, u32), CaptureError> {
    use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

    let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    if width <= 0 || height <= 0 {
        return Err(CaptureError::Platform(
            "could not read primary display size".to_string(),
        ));
    }
    Ok((width as u32, height as u32))
}

#[cfg(not(windows))]
fn primary_display_size() -> Result<(u32, u32), CaptureError> {
    Err(CaptureError::Unsupported)
}

#[cfg(windows)]
fn capture_rect(left: i32, top: i32, width: u32, height: u32) -> Result<RgbaImage, CaptureError> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::Graphics::Gdi::{
        BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BitBlt, CAPTUREBLT, CreateCompatibleBitmap,
        CreateCompatibleDC, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, GetDIBits, HBITMAP,
        HDC, HGDIOBJ, ROP_CODE, ReleaseDC, SRCCOPY, SelectObject,
    };

    /// Releases the screen DC and deletes the memory DC and bitmap on drop.
    struct GdiResources {
        screen_dc: HDC,
        memory_dc: HDC,
        bitmap: HBITMAP,
        previous: HGDIOBJ,
    }

    impl Drop for GdiResources {
        fn drop(&mut self) {
            unsafe {
                if !self.previous.is_invalid() {
                    SelectObject(self.memory_dc, self.previous);
                }
                if !self.bitmap.is_invalid() {
                    let _ = DeleteObject(HGDIOBJ(self.bitmap.0));
                }
                if !self.memory_dc.is_invalid() {
                    let _ = DeleteDC(self.memory_dc);
                }
                ReleaseDC(HWND::default(), self.screen_dc);
            }
        }
    }

    let (w, h) = (width as i32, height as i32);

    let screen_dc = unsafe { GetDC(HWND::default()) };
    if screen_dc.is_invalid() {
        return Err(CaptureError::Platform("GetDC failed".to_string()));
    }
    let mut gdi = GdiResources {
        screen_dc,
        memory_dc: HDC::default(),
        bitmap: HBITMAP::default(),
        previous: HGDIOBJ::default(),
    };

    gdi.memory_dc = unsafe { CreateCompatibleDC(gdi.screen_dc) };
    if gdi.memory_dc.is_invalid() {
        return Err(CaptureError::Platform("CreateCompatibleDC failed".to_string()));
    }
    gdi.bitmap = unsafe { CreateCompatibleBitmap(gdi.screen_dc, w, h) };
    if gdi.bitmap.is_invalid() {
        return Err(CaptureError::Platform(
            "CreateCompatibleBitmap failed".to_string(),
        ));
    }
    gdi.previous = unsafe { SelectObject(gdi.memory_dc, HGDIOBJ(gdi.bitmap.0)) };

    // CAPTUREBLT includes layered (overlay) windows in the copy
    unsafe {
        BitBlt(
            gdi.memory_dc,
            0,
            0,
            w,
            h,
            gdi.screen_dc,
            left,
            top,
            ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0),
        )
    }
    .map_err(|e| CaptureError::Platform(format!("BitBlt failed: {}", e)))?;

    let mut info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: w,
            // Negative height requests a top-down DIB
            biHeight: -h,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    let lines = unsafe {
        GetDIBits(
            gdi.memory_dc,
            gdi.bitmap,
            0,
            height,
            Some(pixels.as_mut_ptr() as *mut _),
            &mut info,
            DIB_RGB_COLORS,
        )
    };
    if lines == 0 {
        return Err(CaptureError::Platform("GetDIBits failed".to_string()));
    }

    // BGRA -> RGBA, alpha is undefined for screen DCs
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
        px[3] = 255;
    }

    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| CaptureError::Platform("pixel buffer size mismatch".to_string()))
}

#[cfg(not(windows))]
fn capture_rect(_left: i32, _top: i32, _width: u32, _height: u32) -> Result<RgbaImage, CaptureError> {
    Err(CaptureError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_capture_unsupported_off_windows() {
        let region = Region::new(0, 0, 10, 10).unwrap();
        let mut capturer = ScreenCapturer::new(region);
        assert!(matches!(capturer.capture(), Err(CaptureError::Unsupported)));
        assert!(matches!(
            capture_primary_display(),
            Err(CaptureError::Unsupported)
        ));
    }
}
