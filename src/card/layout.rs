use crate::common::constants::MOBILE_MAX_WIDTH_PX;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Breakpoint {
    Mobile,
    Desktop,
}

impl Breakpoint {
    pub fn for_viewport(width_px: u32) -> Self {
        if width_px <= MOBILE_MAX_WIDTH_PX {
            Breakpoint::Mobile
        } else {
            Breakpoint::Desktop
        }
    }
}

/// Fixed card geometry for one breakpoint and selection state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardLayout {
    pub width_rem: f32,
    pub height_rem: f32,
    pub title_font_px: u32,
    pub field_font_px: u32,
    /// Character budget for the full-width title cell on the back face
    pub title_chars: usize,
    /// Character budget for the half-width cells on the back face
    pub field_chars: usize,
}

const MOBILE_SELECTED: CardLayout = CardLayout {
    width_rem: 16.0,
    height_rem: 7.0,
    title_font_px: 12,
    field_font_px: 10,
    title_chars: 30,
    field_chars: 13,
};

const DESKTOP_SELECTED: CardLayout = CardLayout {
    width_rem: 40.0,
    height_rem: 13.0,
    title_font_px: 18,
    field_font_px: 16,
    title_chars: 56,
    field_chars: 26,
};

const UNSELECTED: CardLayout = CardLayout {
    width_rem: 24.0,
    height_rem: 10.0,
    title_font_px: 14,
    field_font_px: 12,
    title_chars: 40,
    field_chars: 18,
};

pub fn card_layout(breakpoint: Breakpoint, selected: bool) -> CardLayout {
    match (breakpoint, selected) {
        (Breakpoint::Mobile, true) => MOBILE_SELECTED,
        (Breakpoint::Desktop, true) => DESKTOP_SELECTED,
        (_, false) => UNSELECTED,
    }
}

/// Cut `text` to at most `max_chars` characters, ending in an ellipsis when shortened
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
