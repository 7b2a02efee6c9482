use super::mask::ticket_mask;
use super::render::{encode_png, TicketRenderer};
use super::TicketFace;
use crate::app::ports::{ImageSource, TicketSink};
use crate::common::error::{Result, StageError};
use crate::common::types::CollectionItem;
use crate::config::TicketConfig;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub fn ticket_file_name(item: &CollectionItem, face: TicketFace) -> String {
    format!("ticket-{}-{}.png", item.concert_id, face)
}

/// Loads the photo and mask, renders a face and hands the PNG to the sink
pub struct TicketExporter {
    images: Arc<dyn ImageSource>,
    sink: Arc<dyn TicketSink>,
    renderer: TicketRenderer,
    mask_location: Option<String>,
}

impl TicketExporter {
    pub fn new(images: Arc<dyn ImageSource>, sink: Arc<dyn TicketSink>, renderer: TicketRenderer) -> Self {
        Self {
            images,
            sink,
            renderer,
            mask_location: None,
        }
    }

    /// Exporter sized and styled from the `[ticket]` config section
    pub fn from_config(config: &TicketConfig, images: Arc<dyn ImageSource>, sink: Arc<dyn TicketSink>) -> Result<Self> {
        let font = match &config.font_path {
            Some(path) => TicketRenderer::load_font(path)?,
            None => {
                debug!("No ticket.font_path configured; using the bundled font");
                TicketRenderer::bundled_font()?
            }
        };
        let renderer = TicketRenderer::new(config.width, config.height).with_font(font);
        let exporter = Self::new(images, sink, renderer);
        Ok(match &config.mask_path {
            Some(mask) => exporter.with_mask(mask.clone()),
            None => exporter,
        })
    }

    /// Use a mask asset instead of the generated ticket outline
    pub fn with_mask(mut self, location: impl Into<String>) -> Self {
        self.mask_location = Some(location.into());
        self
    }

    /// Fetch photo and mask concurrently; fails if either cannot be loaded or decoded
    async fn load_inputs(&self, item: &CollectionItem) -> Result<(DynamicImage, DynamicImage)> {
        let photo = async {
            let bytes = self.images.load(&item.concert_image).await?;
            Ok::<_, StageError>(image::load_from_memory(&bytes)?)
        };
        let mask = async {
            match &self.mask_location {
                Some(location) => {
                    let bytes = self.images.load(location).await?;
                    Ok::<_, StageError>(image::load_from_memory(&bytes)?)
                }
                None => {
                    let (w, h) = self.renderer.dimensions();
                    Ok::<_, StageError>(DynamicImage::ImageRgba8(ticket_mask(w, h)))
                }
            }
        };
        tokio::try_join!(photo, mask)
    }

    pub async fn render_png(&self, item: &CollectionItem, face: TicketFace) -> Result<Vec<u8>> {
        let (photo, mask) = self.load_inputs(item).await?;
        let canvas = self.renderer.render(face, &photo, &mask, item);
        encode_png(&canvas)
    }

    /// Render and save, propagating any failure
    pub async fn try_capture(&self, item: &CollectionItem, face: TicketFace) -> Result<PathBuf> {
        let png = self.render_png(item, face).await?;
        let saved = self.sink.save(&ticket_file_name(item, face), &png).await?;
        info!("Saved {} ticket for concert {} to {}", face, item.concert_id, saved.display());
        Ok(saved)
    }

    /// Export one face. Failures are logged and abort the export; nothing is saved.
    #[instrument(skip(self, item), fields(concert_id = item.concert_id))]
    pub async fn capture_ticket(&self, item: &CollectionItem, face: TicketFace) -> Option<PathBuf> {
        match self.try_capture(item, face).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Ticket export ({}) failed: {}", face, e);
                None
            }
        }
    }
}
