//! Image selection lifecycle: pick a file, decode it, keep a preview.

use crate::error::EcoConvertError;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Longest side of the preview thumbnail, in pixels.
pub const PREVIEW_MAX_SIDE: u32 = 256;

/// A decoded image chosen by the user.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
    image: DynamicImage,
    preview: DynamicImage,
}

impl SelectedImage {
    /// Decode raw file bytes. Bytes that do not look like a supported image
    /// are rejected as invalid input.
    pub fn decode(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, EcoConvertError> {
        let file_name = file_name.into();
        let format = image::guess_format(&bytes).map_err(|e| EcoConvertError::InvalidInput {
            name: file_name.clone(),
            reason: e.to_string(),
        })?;
        let image = image::load_from_memory_with_format(&bytes, format)?;
        Ok(Self::assemble(file_name, format, bytes, image))
    }

    /// Wrap an already decoded image, encoding it as PNG for backends that
    /// need file bytes.
    pub fn from_image(
        file_name: impl Into<String>,
        image: DynamicImage,
    ) -> Result<Self, EcoConvertError> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(Self::assemble(file_name.into(), ImageFormat::Png, buf.into_inner(), image))
    }

    fn assemble(
        file_name: String,
        format: ImageFormat,
        bytes: Vec<u8>,
        image: DynamicImage,
    ) -> Self {
        let (width, height) = image.dimensions();
        let preview = if width > PREVIEW_MAX_SIDE || height > PREVIEW_MAX_SIDE {
            image.thumbnail(PREVIEW_MAX_SIDE, PREVIEW_MAX_SIDE)
        } else {
            image.clone()
        };
        Self {
            file_name,
            format,
            bytes,
            image,
            preview,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// File extension matching the detected format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }

    /// Original encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn preview(&self) -> &DynamicImage {
        &self.preview
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Write the preview thumbnail; the format follows the path's extension.
    pub fn save_preview(&self, path: &Path) -> Result<(), EcoConvertError> {
        self.preview.save(path)?;
        Ok(())
    }
}

/// Holds at most one selected image.
#[derive(Debug, Default)]
pub struct UploadController {
    current: Option<SelectedImage>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an image file from disk.
    pub fn select_path(&mut self, path: &Path) -> Result<&SelectedImage, EcoConvertError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.select_bytes(name, bytes, None)
    }

    /// Select an image from raw bytes, e.g. a dropped file. A declared MIME
    /// type outside `image/*` is rejected before decoding. On error the
    /// previous selection is kept.
    pub fn select_bytes(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<&SelectedImage, EcoConvertError> {
        let file_name = file_name.into();
        if let Some(mime) = mime {
            if !mime.starts_with("image/") {
                tracing::warn!(file = %file_name, %mime, "ignoring non-image selection");
                return Err(EcoConvertError::InvalidInput {
                    name: file_name,
                    reason: format!("MIME type '{mime}' is not an image type"),
                });
            }
        }

        let selected = SelectedImage::decode(file_name, bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected image selection");
        })?;
        let (width, height) = selected.dimensions();
        tracing::info!(file = selected.file_name(), width, height, "image selected");
        Ok(self.current.insert(selected))
    }

    /// Clear the selection, returning what was selected.
    pub fn remove(&mut self) -> Option<SelectedImage> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&SelectedImage> {
        self.current.as_ref()
    }
}
