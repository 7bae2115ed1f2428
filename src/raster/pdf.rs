//! PDF rasterization for scanned documents using lopdf
//!
//! A scanned PDF page is a full-page image XObject. Each page is rendered by
//! decoding its largest image and resampling it so the page's MediaBox maps
//! to the requested resolution. Vector content is not drawn; a page without
//! any image renders as blank paper.

use super::Rasterizer;
use crate::buffer::PixelBuffer;
use crate::error::OcrError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

/// PDF user space units per inch
const POINTS_PER_INCH: f32 = 72.0;
/// US Letter, used when a page has no usable MediaBox
const DEFAULT_MEDIA_BOX: (f32, f32) = (612.0, 792.0);
/// Guard against cyclic or absurdly deep page trees
const MAX_INHERITANCE_DEPTH: usize = 32;
/// Longest side of a rendered page; large-format sheets are scaled down to fit
pub const MAX_PAGE_DIMENSION: u32 = 10_000;

pub struct PdfRasterizer {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfRasterizer {
    pub fn open(path: &Path) -> Result<Self, OcrError> {
        let doc = Document::load(path)
            .map_err(|e| OcrError::Backend(format!("Failed to load PDF: {}", e)))?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number, already in order
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        tracing::debug!("PDF loaded with {} pages", pages.len());
        Self { doc, pages }
    }

    fn media_box(&self, page_id: ObjectId) -> (f32, f32) {
        let Some(Ok(values)) = page_attribute(&self.doc, page_id, b"MediaBox").map(Object::as_array)
        else {
            return DEFAULT_MEDIA_BOX;
        };

        let numbers: Vec<f32> = values.iter().filter_map(number).collect();
        if numbers.len() != 4 {
            return DEFAULT_MEDIA_BOX;
        }
        let width = (numbers[2] - numbers[0]).abs();
        let height = (numbers[3] - numbers[1]).abs();
        if width < 1.0 || height < 1.0 {
            return DEFAULT_MEDIA_BOX;
        }
        (width, height)
    }

    /// The page's largest image XObject, if any
    fn page_image(&self, page_id: ObjectId) -> Option<&Stream> {
        let resources = page_attribute(&self.doc, page_id, b"Resources")?.as_dict().ok()?;
        let xobjects = resolve(&self.doc, resources.get(b"XObject").ok()?)?
            .as_dict()
            .ok()?;

        xobjects
            .iter()
            .filter_map(|(_, obj)| resolve(&self.doc, obj)?.as_stream().ok())
            .filter(|stream| is_image(&stream.dict))
            .max_by_key(|stream| {
                let width = dict_int(&stream.dict, b"Width").unwrap_or(0);
                let height = dict_int(&stream.dict, b"Height").unwrap_or(0);
                width * height
            })
    }
}

impl Rasterizer for PdfRasterizer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<PixelBuffer, OcrError> {
        let page_id = *self.pages.get(index).ok_or_else(|| {
            OcrError::Backend(format!(
                "page index {} out of range ({} pages)",
                index,
                self.pages.len()
            ))
        })?;

        let (width_pt, height_pt) = self.media_box(page_id);
        let scale = dpi as f32 / POINTS_PER_INCH;
        let requested = (
            ((width_pt * scale).round() as u32).max(1),
            ((height_pt * scale).round() as u32).max(1),
        );
        let (target_width, target_height) = fit_within(requested, MAX_PAGE_DIMENSION);
        if (target_width, target_height) != requested {
            tracing::warn!(
                "Page {} is {}x{} at {} dpi, rendering at {}x{}",
                index + 1,
                requested.0,
                requested.1,
                dpi,
                target_width,
                target_height
            );
        }

        let Some(stream) = self.page_image(page_id) else {
            tracing::warn!("Page {} has no image, rendering blank page", index + 1);
            return Ok(PixelBuffer::filled(
                target_width,
                target_height,
                [255, 255, 255, 255],
            ));
        };

        let image = extract_image_from_stream(&self.doc, stream)?;
        tracing::debug!(
            "Page {}: image {}x{}, target {}x{} at {} dpi",
            index + 1,
            image.width(),
            image.height(),
            target_width,
            target_height,
            dpi
        );

        // Scale by width and keep the scan's aspect ratio
        let factor = target_width as f32 / image.width() as f32;
        let scaled_height = ((image.height() as f32 * factor).round() as u32).max(1);
        let (width, height) = fit_within((target_width, scaled_height), MAX_PAGE_DIMENSION);

        if (width, height) == (image.width(), image.height()) {
            return Ok(PixelBuffer::from(image));
        }
        let resized = image.resize_exact(width, height, FilterType::Lanczos3);
        Ok(PixelBuffer::from(resized))
    }
}

/// Shrink `(width, height)` proportionally so neither side exceeds `max`
fn fit_within((width, height): (u32, u32), max: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max {
        return (width, height);
    }
    let ratio = max as f64 / longest as f64;
    let shrink = |side: u32| ((side as f64 * ratio).round() as u32).clamp(1, max);
    (shrink(width), shrink(height))
}

/// Look up a page attribute, following `Parent` links for inherited keys
fn page_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return resolve(doc, value);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow an indirect reference, or return the object itself
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj.as_reference() {
        Ok(id) => doc.get_object(id).ok(),
        Err(_) => Some(obj),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn dict_int(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|v| v.as_i64().ok())
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(Object::as_name), Ok(name) if name == b"Image")
}

/// Filter names applied to a stream, outermost first
fn stream_filters(stream: &Stream) -> Vec<String> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).to_string()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode an image XObject
fn extract_image_from_stream(doc: &Document, stream: &Stream) -> Result<DynamicImage, OcrError> {
    let filters = stream_filters(stream);

    // JPEG payloads are handed to the image crate as-is
    if filters.len() == 1 && filters[0] == "DCTDecode" {
        return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map_err(|e| OcrError::Backend(format!("Failed to decode JPEG page image: {}", e)));
    }
    if let Some(unsupported) = filters
        .iter()
        .find(|f| matches!(f.as_str(), "DCTDecode" | "JPXDecode" | "CCITTFaxDecode" | "JBIG2Decode"))
    {
        return Err(OcrError::Backend(format!(
            "Unsupported page image encoding: {}",
            unsupported
        )));
    }

    let width = dict_int(&stream.dict, b"Width")
        .filter(|w| *w > 0)
        .ok_or_else(|| OcrError::Backend("Missing image width".to_string()))? as u32;
    let height = dict_int(&stream.dict, b"Height")
        .filter(|h| *h > 0)
        .ok_or_else(|| OcrError::Backend("Missing image height".to_string()))? as u32;

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| OcrError::Backend(format!("Failed to decompress image: {}", e)))?
    };

    let color_space = get_color_space(doc, stream);
    let bits_per_component = dict_int(&stream.dict, b"BitsPerComponent").unwrap_or(8) as u8;
    let pixels = width as usize * height as usize;

    match (color_space.as_str(), bits_per_component) {
        ("DeviceGray", 8) if data.len() >= pixels => {
            let img = image::GrayImage::from_raw(width, height, data[..pixels].to_vec())
                .ok_or_else(|| OcrError::Backend("Invalid grayscale image data".to_string()))?;
            Ok(DynamicImage::ImageLuma8(img))
        }
        ("DeviceGray", 1) => {
            let img = unpack_bilevel(width, height, &data)?;
            Ok(DynamicImage::ImageLuma8(img))
        }
        ("DeviceRGB", 8) if data.len() >= pixels * 3 => {
            let img = image::RgbImage::from_raw(width, height, data[..pixels * 3].to_vec())
                .ok_or_else(|| OcrError::Backend("Invalid RGB image data".to_string()))?;
            Ok(DynamicImage::ImageRgb8(img))
        }
        ("DeviceCMYK", 8) if data.len() >= pixels * 4 => {
            let mut rgb_data = Vec::with_capacity(pixels * 3);
            for chunk in data[..pixels * 4].chunks_exact(4) {
                let k = 1.0 - chunk[3] as f32 / 255.0;
                for &ink in &chunk[..3] {
                    rgb_data.push(((1.0 - ink as f32 / 255.0) * k * 255.0) as u8);
                }
            }
            let img = image::RgbImage::from_raw(width, height, rgb_data)
                .ok_or_else(|| OcrError::Backend("Invalid CMYK->RGB conversion".to_string()))?;
            Ok(DynamicImage::ImageRgb8(img))
        }
        (space, bits) => Err(OcrError::Backend(format!(
            "Unsupported page image: {} at {} bits, data_len={}",
            space,
            bits,
            data.len()
        ))),
    }
}

/// Expand 1-bit rows (padded to whole bytes, 1 = white) to 8-bit gray
fn unpack_bilevel(width: u32, height: u32, data: &[u8]) -> Result<image::GrayImage, OcrError> {
    let row_bytes = (width as usize).div_ceil(8);
    if data.len() < row_bytes * height as usize {
        return Err(OcrError::Backend(format!(
            "Truncated 1-bit image: {} bytes for {}x{}",
            data.len(),
            width,
            height
        )));
    }

    Ok(image::GrayImage::from_fn(width, height, |x, y| {
        let byte = data[y as usize * row_bytes + x as usize / 8];
        let bit = (byte >> (7 - (x % 8))) & 1;
        image::Luma([if bit == 1 { 255 } else { 0 }])
    }))
}

/// Get the color space name from a PDF stream, resolving indirect references
fn get_color_space(doc: &Document, stream: &Stream) -> String {
    let Some(cs_obj) = stream
        .dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|obj| resolve(doc, obj))
    else {
        return "DeviceRGB".to_string();
    };

    if let Ok(name) = cs_obj.as_name() {
        return String::from_utf8_lossy(name).to_string();
    }

    // Array form, e.g. [/ICCBased 12 0 R]
    let Ok(array) = cs_obj.as_array() else {
        return "DeviceRGB".to_string();
    };
    match array.first().and_then(|first| first.as_name().ok()) {
        Some(b"ICCBased") => icc_device_space(doc, array.get(1))
            .unwrap_or("DeviceRGB")
            .to_string(),
        Some(name) => String::from_utf8_lossy(name).to_string(),
        None => "DeviceRGB".to_string(),
    }
}

/// Device space with the same component count `/N` as an ICC profile
fn icc_device_space(doc: &Document, profile: Option<&Object>) -> Option<&'static str> {
    let dict = match resolve(doc, profile?)? {
        Object::Stream(stream) => &stream.dict,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match dict_int(dict, b"N")? {
        1 => Some("DeviceGray"),
        3 => Some("DeviceRGB"),
        4 => Some("DeviceCMYK"),
        _ => None,
    }
}
