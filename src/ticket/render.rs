use super::layout::{caption_layout, cover_crop, BackGrid, Rect, TextPlacement};
use super::text::split_concert_name;
use super::TicketFace;
use crate::card::layout::ellipsize;
use crate::common::error::{Result, StageError};
use crate::common::types::CollectionItem;
use ab_glyph::{FontArc, PxScale};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use std::path::Path;
use tracing::{debug, warn};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LABEL: Rgba<u8> = Rgba([210, 210, 210, 255]);
const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 170]);
/// Black overlay strength on the back face
const OVERLAY_ALPHA: f32 = 0.7;
/// Bundled DejaVu Sans, used when no font path is configured
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Rasterizes the front and back of a ticket at a fixed canvas size
#[derive(Clone)]
pub struct TicketRenderer {
    width: u32,
    height: u32,
    font: Option<FontArc>,
}

impl TicketRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn load_font(path: &Path) -> Result<FontArc> {
        let bytes = std::fs::read(path)?;
        FontArc::try_from_vec(bytes)
            .map_err(|e| StageError::Config(format!("Invalid font '{}': {}", path.display(), e)))
    }

    pub fn bundled_font() -> Result<FontArc> {
        FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| StageError::Config(format!("Invalid bundled font: {}", e)))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn render(&self, face: TicketFace, photo: &DynamicImage, mask: &DynamicImage, item: &CollectionItem) -> RgbaImage {
        match face {
            TicketFace::Front => self.render_front(photo, mask, item),
            TicketFace::Back => self.render_back(photo, mask, item),
        }
    }

    /// Photo cover-fitted to the canvas, keeping only what the mask leaves opaque
    pub fn compose_base(&self, photo: &DynamicImage, mask: &DynamicImage) -> RgbaImage {
        let crop = cover_crop(photo.width(), photo.height(), self.width, self.height);
        let cropped = photo.crop_imm(crop.x, crop.y, crop.width, crop.height).to_rgba8();
        let mut canvas = imageops::resize(&cropped, self.width, self.height, FilterType::Triangle);

        let mask = if mask.width() == self.width && mask.height() == self.height {
            mask.to_rgba8()
        } else {
            mask.resize_exact(self.width, self.height, FilterType::Triangle).to_rgba8()
        };

        // destination-in: keep the destination where the mask is opaque
        for (dst, m) in canvas.pixels_mut().zip(mask.pixels()) {
            dst[3] = ((dst[3] as u16 * m[3] as u16) / 255) as u8;
        }
        canvas
    }

    pub fn render_front(&self, photo: &DynamicImage, mask: &DynamicImage, item: &CollectionItem) -> RgbaImage {
        let mut canvas = self.compose_base(photo, mask);
        let Some(font) = &self.font else {
            warn!("No ticket font configured; front of concert {} rendered without caption", item.concert_id);
            return canvas;
        };

        let lines = split_concert_name(&item.concert_name);
        let placements = caption_layout(&lines, self.width, self.height, |text, size| {
            text_size(PxScale::from(size), font, text)
        });
        let offset = (self.height / 150).max(1) as i32;
        for p in &placements {
            draw_text_mut(&mut canvas, SHADOW, p.x + offset, p.y + offset, PxScale::from(p.size), font, &p.text);
            draw_text_mut(&mut canvas, WHITE, p.x, p.y, PxScale::from(p.size), font, &p.text);
        }
        debug!("Front caption: {:?}", placements.iter().map(|p| &p.text).collect::<Vec<_>>());
        canvas
    }

    pub fn render_back(&self, photo: &DynamicImage, mask: &DynamicImage, item: &CollectionItem) -> RgbaImage {
        let mut canvas = self.compose_base(photo, mask);
        darken(&mut canvas, OVERLAY_ALPHA);

        let grid = BackGrid::new(self.width, self.height);
        let border = (self.height / 200).max(1);
        draw_frame(&mut canvas, grid.frame, border + 1);
        for cell in grid.cells() {
            draw_frame(&mut canvas, cell, border);
        }

        let Some(font) = &self.font else {
            warn!("No ticket font configured; back of concert {} rendered without fields", item.concert_id);
            return canvas;
        };

        let date_time = format!("{} {}", item.display_date(), item.display_time());
        let fields = [
            (grid.title, "Title", item.concert_name.as_str()),
            (grid.artist, "Artist", item.artist.as_str()),
            (grid.audience, "Audience", item.audience.as_str()),
            (grid.date_time, "Date", date_time.trim()),
        ];
        for (cell, label, value) in fields {
            for p in self.field_layout(font, cell, label, value) {
                let color = if p.text == label { LABEL } else { WHITE };
                draw_text_mut(&mut canvas, color, p.x, p.y, PxScale::from(p.size), font, &p.text);
            }
        }
        canvas
    }

    /// Label above value, both inset in the cell; the value is ellipsized to the cell width
    fn field_layout(&self, font: &FontArc, cell: Rect, label: &str, value: &str) -> Vec<TextPlacement> {
        let pad = (self.height / 40) as i32;
        let label_size = self.height as f32 * 0.045;
        let value_size = self.height as f32 * 0.065;
        let max_width = (cell.width as i32 - 2 * pad).max(0) as u32;

        let (_, label_h) = text_size(PxScale::from(label_size), font, label);
        let value = fit_width(font, value_size, value, max_width);
        vec![
            TextPlacement {
                text: label.to_string(),
                x: cell.x as i32 + pad,
                y: cell.y as i32 + pad,
                size: label_size,
            },
            TextPlacement {
                text: value,
                x: cell.x as i32 + pad,
                y: cell.y as i32 + pad + label_h as i32 + pad / 2,
                size: value_size,
            },
        ]
    }
}

/// Longest ellipsized prefix of `text` whose rendered width fits `max_width`
fn fit_width(font: &FontArc, size: f32, text: &str, max_width: u32) -> String {
    let scale = PxScale::from(size);
    let total = text.chars().count();
    let mut chars = total;
    loop {
        let candidate = ellipsize(text, chars);
        if chars == 0 || text_size(scale, font, &candidate).0 <= max_width {
            return candidate;
        }
        chars -= 1;
    }
}

/// Paint black at `alpha` over every visible pixel, leaving transparent areas alone
fn darken(canvas: &mut RgbaImage, alpha: f32) {
    let keep = 1.0 - alpha;
    for px in canvas.pixels_mut() {
        if px[3] == 0 {
            continue;
        }
        for c in 0..3 {
            px[c] = (px[c] as f32 * keep).round() as u8;
        }
    }
}

fn draw_frame(canvas: &mut RgbaImage, rect: Rect, thickness: u32) {
    for i in 0..thickness {
        let w = rect.width.saturating_sub(2 * i);
        let h = rect.height.saturating_sub(2 * i);
        if w == 0 || h == 0 {
            break;
        }
        let r = imageproc::rect::Rect::at((rect.x + i) as i32, (rect.y + i) as i32).of_size(w, h);
        draw_hollow_rect_mut(canvas, r, WHITE);
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}
