use image::{Rgba, RgbaImage};

/// Procedural ticket mask used when no mask asset is configured: a rounded
/// rectangle with a half-circle notch cut into each short side.
/// Opaque white where the ticket is, fully transparent elsewhere.
pub fn ticket_mask(width: u32, height: u32) -> RgbaImage {
    let corner = (height as f32 / 12.0).max(1.0);
    let notch = height as f32 / 10.0;
    let mid_y = height as f32 / 2.0;
    let (w, h) = (width as f32, height as f32);

    RgbaImage::from_fn(width, height, |x, y| {
        // sample at pixel centers
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;

        let in_notch = dist(px, py, 0.0, mid_y) < notch || dist(px, py, w, mid_y) < notch;
        let cx = px.clamp(corner, w - corner);
        let cy = py.clamp(corner, h - corner);
        let in_body = dist(px, py, cx, cy) <= corner;

        if in_body && !in_notch {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn dist(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}
