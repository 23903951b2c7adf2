//! Image display for the trailing images section.
//!
//! Two ports live here:
//! - [`ImageRasterizer`] turns an image URL into an inline terminal escape
//!   or colored ASCII art.
//! - [`TerminalCapabilities`] reports whether the terminal can show inline
//!   images at all.

mod loader;
mod protocol;

pub use loader::{CachedImage, HttpImageSource, ImageCache, ImageLoader, ImageSource, MAX_IMAGE_BYTES};
pub use protocol::{EnvCapabilities, FixedCapabilities, inline_escape};

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::layout::{InlineColor, InlineSpan, InlineStyle};

/// Characters from darkest to brightest.
const ASCII_RAMP: &[u8] = b" .,:;i1tfLCG08@";

/// Why an image could not be rasterized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("image has no URL")]
    EmptyUrl,
    #[error("image download failed: {0}")]
    Fetch(String),
    #[error("image larger than {} bytes", MAX_IMAGE_BYTES)]
    TooLarge,
    #[error("image could not be decoded: {0}")]
    Decode(String),
    #[error("images are disabled")]
    Disabled,
}

/// Turns an image URL into something a terminal can display.
pub trait ImageRasterizer {
    /// Terminal-inline escape sequence for the image, `width` columns wide.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError`] if the image cannot be fetched.
    fn inline(&self, url: &str, width: usize) -> Result<String, RasterError>;

    /// Colored ASCII art, one span list per output row, at most `width`
    /// columns wide.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError`] if the image cannot be fetched or decoded.
    fn ascii(&self, url: &str, width: usize) -> Result<Vec<Vec<InlineSpan>>, RasterError>;
}

/// Whether the terminal can display inline image escapes.
pub trait TerminalCapabilities {
    fn supports_inline_images(&self) -> bool;
}

/// Rasterizer that always declines, leaving only text placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageRasterizer for NoImages {
    fn inline(&self, _url: &str, _width: usize) -> Result<String, RasterError> {
        Err(RasterError::Disabled)
    }

    fn ascii(&self, _url: &str, _width: usize) -> Result<Vec<Vec<InlineSpan>>, RasterError> {
        Err(RasterError::Disabled)
    }
}

/// Rasterizer that downloads images over HTTP and caches them per URL.
pub struct HttpRasterizer {
    loader: ImageLoader,
    truecolor: bool,
}

impl HttpRasterizer {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, RasterError> {
        Ok(Self::with_source(
            Box::new(HttpImageSource::new()?),
            supports_truecolor_terminal(),
        ))
    }

    /// Rasterizer over an arbitrary byte source.
    pub fn with_source(source: Box<dyn ImageSource>, truecolor: bool) -> Self {
        Self {
            loader: ImageLoader::new(source),
            truecolor,
        }
    }
}

impl ImageRasterizer for HttpRasterizer {
    fn inline(&self, url: &str, width: usize) -> Result<String, RasterError> {
        let bytes = self.loader.load(url)?;
        if bytes.is_empty() {
            return Err(RasterError::Decode("empty body".into()));
        }
        Ok(inline_escape(&bytes, width))
    }

    fn ascii(&self, url: &str, width: usize) -> Result<Vec<Vec<InlineSpan>>, RasterError> {
        let bytes = self.loader.load(url)?;
        let image =
            image::load_from_memory(&bytes).map_err(|err| RasterError::Decode(err.to_string()))?;
        Ok(ascii_art(&image, width, self.truecolor))
    }
}

/// Convert an image to colored ASCII art `width` columns wide.
///
/// Terminal cells are about twice as tall as wide, so the row count is
/// halved to keep the aspect ratio.
pub fn ascii_art(image: &DynamicImage, width: usize, truecolor: bool) -> Vec<Vec<InlineSpan>> {
    let (src_w, src_h) = image.dimensions();
    if width == 0 || src_w == 0 || src_h == 0 {
        return Vec::new();
    }
    let cols = u32::try_from(width).unwrap_or(u32::MAX);
    let rows = (u64::from(src_h) * u64::from(cols) / u64::from(src_w) / 2).max(1);
    let rows = u32::try_from(rows).unwrap_or(u32::MAX);
    let scaled = image.resize_exact(cols, rows, FilterType::Triangle).to_rgba8();

    let mut lines = Vec::with_capacity(rows as usize);
    for y in 0..rows {
        let mut spans: Vec<InlineSpan> = Vec::new();
        let mut run = String::new();
        let mut run_style = InlineStyle::default();
        for x in 0..cols {
            let px = scaled.get_pixel(x, y);
            let (ch, style) = if px[3] < 32 {
                (' ', InlineStyle::default())
            } else {
                let color = if truecolor {
                    InlineColor::Rgb(px[0], px[1], px[2])
                } else {
                    InlineColor::Indexed(rgb_to_xterm_256(px[0], px[1], px[2]))
                };
                let style = InlineStyle {
                    fg: Some(color),
                    ..InlineStyle::default()
                };
                (ramp_char(px[0], px[1], px[2]), style)
            };
            if style != run_style && !run.is_empty() {
                spans.push(InlineSpan::styled(std::mem::take(&mut run), run_style));
            }
            run_style = style;
            run.push(ch);
        }
        if !run.is_empty() {
            spans.push(InlineSpan::styled(run, run_style));
        }
        lines.push(spans);
    }
    lines
}

fn ramp_char(r: u8, g: u8, b: u8) -> char {
    let luma = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    let last = ASCII_RAMP.len() - 1;
    let idx = (luma as usize * last) / 255;
    char::from(ASCII_RAMP[idx.min(last)])
}

/// Whether terminal output should be treated as truecolor-capable.
pub fn supports_truecolor_terminal() -> bool {
    if let Ok(force) = std::env::var("GETWEBSITE_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    if std::env::var("TERM_PROGRAM")
        .ok()
        .as_deref()
        .is_some_and(|v| v == "Apple_Terminal")
    {
        return false;
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

#[allow(clippy::cast_possible_truncation)]
fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
