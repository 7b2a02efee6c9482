//! Interactive ticket cards for the collection screen.
//!
//! A [`CardView`] combines pointer tilt, the selection choreography and the
//! flip toggle for one collected concert. [`CollectionView`] keeps at most one
//! card selected.

pub mod choreography;
pub mod layout;
pub mod tilt;

use crate::common::types::CollectionItem;
use choreography::{CardPhase, Choreography, Pose};
use layout::{card_layout, ellipsize, Breakpoint, CardLayout};
use serde::Serialize;
use std::time::Instant;
use tilt::{Tilt, TILT_RANGE_DEG};
use tracing::debug;

/// Fields shown on the back face, already fitted to their cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackFace {
    pub title: String,
    pub date: String,
    pub time: String,
    pub artist: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct CardView {
    item: CollectionItem,
    selected: bool,
    flipped: bool,
    tilt: Tilt,
    choreography: Choreography,
}

impl CardView {
    pub fn new(item: CollectionItem) -> Self {
        Self {
            item,
            selected: false,
            flipped: false,
            tilt: Tilt::REST,
            choreography: Choreography::default(),
        }
    }

    pub fn item(&self) -> &CollectionItem {
        &self.item
    }

    pub fn concert_id(&self) -> i64 {
        self.item.concert_id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn tilt(&self) -> Tilt {
        self.tilt
    }

    pub fn sheen_opacity(&self) -> f32 {
        self.tilt.sheen_opacity()
    }

    pub fn phase(&self) -> CardPhase {
        self.choreography.phase()
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.choreography.is_animating(now)
    }

    pub fn pose_at(&self, now: Instant) -> Pose {
        self.choreography.pose_at(now)
    }

    pub fn advance(&mut self, now: Instant) {
        self.choreography.advance(now);
    }

    /// Start the select or deselect choreography. Deselecting always un-flips the card.
    pub fn set_selected(&mut self, selected: bool, now: Instant) {
        self.advance(now);
        if selected == self.selected {
            return;
        }
        self.selected = selected;
        // scripted transforms own the card until they finish
        self.tilt = Tilt::REST;
        if selected {
            self.choreography.select(now);
        } else {
            self.flipped = false;
            self.choreography.deselect(now);
        }
        debug!("Card {} selected={}", self.item.concert_id, selected);
    }

    /// Pointer moved to (`x`, `y`) inside a card of `width` x `height`.
    /// Ignored while a scripted stage runs; returns whether the tilt changed.
    pub fn pointer_move(&mut self, x: f32, y: f32, width: f32, height: f32, now: Instant) -> bool {
        self.advance(now);
        if self.is_animating(now) {
            return false;
        }
        let tilt = Tilt::from_pointer(x, y, width, height, TILT_RANGE_DEG);
        let changed = tilt != self.tilt;
        self.tilt = tilt;
        changed
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.advance(now);
        if !self.is_animating(now) {
            self.tilt = Tilt::REST;
        }
    }

    /// Flip between front and back. Only a selected, settled card flips.
    pub fn toggle_flip(&mut self, now: Instant) -> bool {
        self.advance(now);
        if !self.selected || self.is_animating(now) {
            return false;
        }
        self.flipped = !self.flipped;
        true
    }

    /// Rotation around Y contributed by the flip
    pub fn flip_rotation(&self) -> f32 {
        if self.flipped {
            180.0
        } else {
            0.0
        }
    }

    pub fn layout(&self, viewport_width_px: u32) -> CardLayout {
        card_layout(Breakpoint::for_viewport(viewport_width_px), self.selected)
    }

    /// Front-face caption: the concert name split around an embedded quoted subtitle
    pub fn front_caption(&self) -> Vec<String> {
        crate::ticket::text::split_concert_name(&self.item.concert_name)
    }

    pub fn back_face(&self, viewport_width_px: u32) -> BackFace {
        let layout = self.layout(viewport_width_px);
        BackFace {
            title: ellipsize(&self.item.concert_name, layout.title_chars),
            date: ellipsize(&self.item.display_date(), layout.field_chars),
            time: ellipsize(&self.item.display_time(), layout.field_chars),
            artist: ellipsize(&self.item.artist, layout.field_chars),
            audience: ellipsize(&self.item.audience, layout.field_chars),
        }
    }
}

/// All cards of a collection page; clicking one selects it and deselects the rest
pub struct CollectionView {
    cards: Vec<CardView>,
    selected: Option<i64>,
}

impl CollectionView {
    pub fn new(items: Vec<CollectionItem>) -> Self {
        Self {
            cards: items.into_iter().map(CardView::new).collect(),
            selected: None,
        }
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn card(&self, concert_id: i64) -> Option<&CardView> {
        self.cards.iter().find(|c| c.concert_id() == concert_id)
    }

    pub fn card_mut(&mut self, concert_id: i64) -> Option<&mut CardView> {
        self.cards.iter_mut().find(|c| c.concert_id() == concert_id)
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Click on a card image: toggles its selection. Returns false for unknown ids.
    pub fn click(&mut self, concert_id: i64, now: Instant) -> bool {
        if self.card(concert_id).is_none() {
            return false;
        }
        let next = if self.selected == Some(concert_id) { None } else { Some(concert_id) };
        for card in &mut self.cards {
            card.set_selected(Some(card.concert_id()) == next, now);
        }
        self.selected = next;
        true
    }

    /// Stacking order: the selected card on top, the rest in page order
    pub fn z_index(&self, concert_id: i64) -> u32 {
        if self.selected == Some(concert_id) {
            return 999;
        }
        1
    }

    pub fn advance(&mut self, now: Instant) {
        for card in &mut self.cards {
            card.advance(now);
        }
    }
}
