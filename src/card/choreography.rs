use std::time::{Duration, Instant};

pub const SELECT_DURATION: Duration = Duration::from_millis(4000);
pub const DESELECT_DURATION: Duration = Duration::from_millis(1500);

pub const SELECTED_SCALE: f32 = 1.5;

// Keyframes for the selection spin, evenly spaced over the stage
const SELECT_ROTATE_Y: [f32; 2] = [0.0, 360.0];
const SELECT_ROTATE_X: [f32; 6] = [0.0, 15.0, -15.0, 10.0, -10.0, 0.0];
const SELECT_ROTATE_Z: [f32; 6] = [0.0, 5.0, -5.0, 5.0, -5.0, 0.0];

/// Where a card is in its selection sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPhase {
    /// Unselected and accepting pointer input
    Idle,
    /// Scripted scale-and-spin after being selected
    Selecting { started: Instant },
    /// Selected and accepting pointer input
    Interactive,
    /// Scripted return to rest after being deselected
    Deselecting { started: Instant, from: Pose },
}

/// Transform applied by the choreography, on top of pointer tilt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub scale: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub rotate_z: f32,
}

impl Pose {
    pub const REST: Pose = Pose { scale: 1.0, rotate_x: 0.0, rotate_y: 0.0, rotate_z: 0.0 };
    pub const SELECTED: Pose = Pose { scale: SELECTED_SCALE, rotate_x: 0.0, rotate_y: 0.0, rotate_z: 0.0 };

    fn lerp(self, to: Pose, t: f32) -> Pose {
        Pose {
            scale: lerp(self.scale, to.scale, t),
            rotate_x: lerp(self.rotate_x, to.rotate_x, t),
            rotate_y: lerp(self.rotate_y, to.rotate_y, t),
            rotate_z: lerp(self.rotate_z, to.rotate_z, t),
        }
    }
}

/// Finite-state sequence `Idle -> Selecting -> Interactive -> Deselecting -> Idle`.
///
/// Time is passed in explicitly; nothing here sleeps or spawns timers.
#[derive(Debug, Clone)]
pub struct Choreography {
    phase: CardPhase,
}

impl Default for Choreography {
    fn default() -> Self {
        Self { phase: CardPhase::Idle }
    }
}

impl Choreography {
    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    pub fn select(&mut self, now: Instant) {
        match self.phase {
            CardPhase::Selecting { .. } | CardPhase::Interactive => {}
            CardPhase::Idle | CardPhase::Deselecting { .. } => {
                self.phase = CardPhase::Selecting { started: now };
            }
        }
    }

    pub fn deselect(&mut self, now: Instant) {
        match self.phase {
            CardPhase::Idle | CardPhase::Deselecting { .. } => {}
            CardPhase::Selecting { .. } | CardPhase::Interactive => {
                let from = self.pose_at(now);
                self.phase = CardPhase::Deselecting { started: now, from };
            }
        }
    }

    /// Move finished scripted stages on to their resting phase
    pub fn advance(&mut self, now: Instant) {
        self.phase = match self.phase {
            CardPhase::Selecting { started } if elapsed(started, now) >= SELECT_DURATION => CardPhase::Interactive,
            CardPhase::Deselecting { started, .. } if elapsed(started, now) >= DESELECT_DURATION => CardPhase::Idle,
            other => other,
        };
    }

    /// True while a scripted stage is still running at `now`
    pub fn is_animating(&self, now: Instant) -> bool {
        match self.phase {
            CardPhase::Selecting { started } => elapsed(started, now) < SELECT_DURATION,
            CardPhase::Deselecting { started, .. } => elapsed(started, now) < DESELECT_DURATION,
            CardPhase::Idle | CardPhase::Interactive => false,
        }
    }

    pub fn pose_at(&self, now: Instant) -> Pose {
        match self.phase {
            CardPhase::Idle => Pose::REST,
            CardPhase::Interactive => Pose::SELECTED,
            CardPhase::Selecting { started } => {
                let t = ease_in_out(progress(started, now, SELECT_DURATION));
                Pose {
                    scale: lerp(1.0, SELECTED_SCALE, t),
                    rotate_x: sample(&SELECT_ROTATE_X, t),
                    rotate_y: sample(&SELECT_ROTATE_Y, t),
                    rotate_z: sample(&SELECT_ROTATE_Z, t),
                }
            }
            CardPhase::Deselecting { started, from } => {
                let t = ease_in_out(progress(started, now, DESELECT_DURATION));
                from.lerp(Pose::REST, t)
            }
        }
    }
}

fn elapsed(started: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(started)
}

fn progress(started: Instant, now: Instant, total: Duration) -> f32 {
    (elapsed(started, now).as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-in-out on [0, 1]
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Linear interpolation across evenly spaced keyframes
fn sample(frames: &[f32], t: f32) -> f32 {
    match frames {
        [] => 0.0,
        [only] => *only,
        _ => {
            let span = (frames.len() - 1) as f32;
            let pos = t.clamp(0.0, 1.0) * span;
            let i = (pos.floor() as usize).min(frames.len() - 2);
            lerp(frames[i], frames[i + 1], pos - i as f32)
        }
    }
}
