use serde::Serialize;

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x && other.y >= self.y && other.right() <= self.right() && other.bottom() <= self.bottom()
    }
}

/// Region of a `src_w` x `src_h` image that, scaled to `dst_w` x `dst_h`, covers the
/// destination without distortion. Excess on the long axis is cropped evenly.
pub fn cover_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Rect {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return Rect::new(0, 0, src_w, src_h);
    }
    // compare src_w/src_h against dst_w/dst_h without floats
    let src_wide = (src_w as u64) * (dst_h as u64) > (dst_w as u64) * (src_h as u64);
    if src_wide {
        let crop_w = ((src_h as u64 * dst_w as u64) / dst_h as u64).max(1) as u32;
        Rect::new((src_w - crop_w) / 2, 0, crop_w, src_h)
    } else {
        let crop_h = ((src_w as u64 * dst_h as u64) / dst_w as u64).max(1) as u32;
        Rect::new(0, (src_h - crop_h) / 2, src_w, crop_h)
    }
}

/// Where one line of text is drawn; `x`/`y` is the top-left of its box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPlacement {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: f32,
}

/// Font sizes for the front caption, relative to canvas height
pub fn caption_sizes(height: u32) -> (f32, f32) {
    (height as f32 * 0.11, height as f32 * 0.08)
}

/// Right-aligned caption stacked up from the bottom-right corner.
///
/// `measure(text, size)` returns the rendered (width, height) of a line.
pub fn caption_layout<M>(lines: &[String], width: u32, height: u32, measure: M) -> Vec<TextPlacement>
where
    M: Fn(&str, f32) -> (u32, u32),
{
    let margin = (height / 15) as i32;
    let gap = (height / 60) as i32;
    let (title_size, subtitle_size) = caption_sizes(height);

    let mut bottom = height as i32 - margin;
    let mut placed = Vec::with_capacity(lines.len());
    for line in lines.iter().rev() {
        // the quoted subtitle is smaller wherever it lands
        let size = if line.starts_with('"') { subtitle_size } else { title_size };
        let (w, h) = measure(line, size);
        let y = bottom - h as i32;
        placed.push(TextPlacement {
            text: line.clone(),
            x: width as i32 - margin - w as i32,
            y,
            size,
        });
        bottom = y - gap;
    }
    placed.reverse();
    placed
}

/// Cells of the ticket back: title across the top, artist over audience on the
/// left, date and time on the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackGrid {
    pub frame: Rect,
    pub title: Rect,
    pub artist: Rect,
    pub audience: Rect,
    pub date_time: Rect,
}

impl BackGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let pad = height / 15;
        let frame = Rect::new(pad, pad, width.saturating_sub(2 * pad), height.saturating_sub(2 * pad));
        let row = frame.height / 3;
        let half = frame.width / 2;

        let title = Rect::new(frame.x, frame.y, frame.width, row);
        let artist = Rect::new(frame.x, frame.y + row, half, row);
        let audience = Rect::new(frame.x, frame.y + 2 * row, half, frame.height - 2 * row);
        let date_time = Rect::new(frame.x + half, frame.y + row, frame.width - half, frame.height - row);

        Self { frame, title, artist, audience, date_time }
    }

    pub fn cells(&self) -> [Rect; 4] {
        [self.title, self.artist, self.audience, self.date_time]
    }
}
