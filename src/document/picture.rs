//! Image loading and sizing for placement in documents.
use crate::document::cm_to_emu;
use crate::error::SheetDocError;
use crate::error::ResultMessage;
use crate::input::InputFile;
use docx_rs::Pic;
use image::ImageFormat;
use std::io::Cursor;

/// A decoded image re-encoded as PNG, ready to embed.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pub name: String,
    png: Vec<u8>,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl ImageAsset {
    /// Decodes PNG, JPEG, BMP or GIF bytes. Fails for anything else so that
    /// no unreadable image reaches the document writer.
    pub fn decode(input: &InputFile) -> Result<Self, SheetDocError> {
        let image = image::load_from_memory(&input.bytes)
            .map_err(SheetDocError::from)
            .with_prefix(&format!("Unreadable image {}", input.name))?;

        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        Ok(ImageAsset {
            name: input.name.to_owned(),
            png: png.into_inner(),
            width: image.width(),
            height: image.height(),
        })
    }

    /// File name without extension, used as caption.
    pub fn label(&self) -> &str {
        crate::input::file_stem(&self.name)
    }

    /// Displayed size in EMU. Without a height the aspect ratio is kept.
    pub fn size_emu(&self, width_cm: f64, height_cm: Option<f64>) -> (u32, u32) {
        let height_cm = height_cm.unwrap_or_else(|| {
            if self.width == 0 {
                width_cm
            } else {
                width_cm * self.height as f64 / self.width as f64
            }
        });
        (cm_to_emu(width_cm), cm_to_emu(height_cm))
    }

    pub fn picture(&self, width_cm: f64, height_cm: Option<f64>) -> Pic {
        let (width, height) = self.size_emu(width_cm, height_cm);
        Pic::new(&self.png).size(width, height)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::RgbImage;

    /// A solid PNG of the given pixel size.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb([40, 90, 200]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decode_png() {
        let asset = ImageAsset::decode(&InputFile::new("chart1.png", png(40, 20))).unwrap();
        assert_eq!((asset.width, asset.height), (40, 20));
        assert_eq!(asset.label(), "chart1");
    }

    #[test]
    fn decode_other_formats_as_png() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]));
        let mut bmp = Cursor::new(Vec::new());
        image.write_to(&mut bmp, ImageFormat::Bmp).unwrap();
        let asset = ImageAsset::decode(&InputFile::new("dot.bmp", bmp.into_inner())).unwrap();
        assert_eq!(&asset.png[1..4], b"PNG");
    }

    #[test]
    fn reject_unreadable_bytes() {
        let error = ImageAsset::decode(&InputFile::new("broken.png", b"not an image".to_vec())).unwrap_err();
        assert!(error.to_string().starts_with("Unreadable image broken.png: "));
    }

    #[test]
    fn aspect_ratio_is_kept_without_height() {
        let asset = ImageAsset::decode(&InputFile::new("wide.png", png(40, 20))).unwrap();
        assert_eq!(asset.size_emu(5.0, None), (1_800_000, 900_000));
        assert_eq!(asset.size_emu(5.0, Some(4.0)), (1_800_000, 1_440_000));
    }
}
