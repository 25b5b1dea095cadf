//! Ghost replay
//!
//! A ghost re-enacts one finished recording frame by frame. It never runs
//! physics; it copies recorded state, so it only stays consistent with the
//! level because the recording came from the same fixed-tick simulation.

use std::rc::Rc;

use super::geometry::{Rect, Vec2};
use super::interactable::ActorId;
use super::recorder::{InteractionRecord, Recording};
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct Ghost {
    recording: Rc<Recording>,
    pub loop_number: u32,
    current_frame: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    pub is_active: bool,
}

impl Ghost {
    pub fn new(recording: Rc<Recording>, loop_number: u32) -> Self {
        Self {
            recording,
            loop_number,
            current_frame: 0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            on_ground: false,
            is_active: true,
        }
    }

    pub fn id(&self) -> ActorId {
        ActorId::Ghost(self.loop_number)
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Replay the next frame, or go inactive once the recording runs out
    pub fn update(&mut self) {
        match self.recording.frame(self.current_frame) {
            Some(frame) => {
                self.position = frame.position;
                self.velocity = frame.velocity;
                self.on_ground = frame.on_ground;
                self.is_active = frame.is_active;
                self.current_frame += 1;
            }
            None => self.is_active = false,
        }
    }

    /// Rewind to the first frame
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.is_active = true;
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    pub fn interaction_bounds(&self) -> Rect {
        self.bounds().expand(INTERACTION_MARGIN)
    }

    /// Recorded interactions for the frame about to be replayed
    pub fn interaction_state(&self) -> Option<&[InteractionRecord]> {
        if !self.is_active {
            return None;
        }
        self.recording
            .frame(self.current_frame)
            .map(|frame| frame.interactions.as_slice())
    }

    /// Display hue in degrees, distinct per loop
    pub fn hue(&self) -> f32 {
        ((self.loop_number * 60) % 360) as f32
    }

    pub fn alpha(&self) -> f32 {
        GHOST_ALPHA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::recorder::Frame;

    fn recording_of(xs: &[f32]) -> Rc<Recording> {
        let mut recording = Recording::new(0);
        for (i, &x) in xs.iter().enumerate() {
            recording.push(Frame {
                timestamp: i as u64 * 16,
                position: Vec2::new(x, 100.0),
                velocity: Vec2::new(1.0, 0.0),
                on_ground: true,
                is_active: true,
                interactions: Vec::new(),
            });
        }
        Rc::new(recording)
    }

    #[test]
    fn test_replays_positions_in_order_then_stops() {
        let xs = [10.0, 12.5, 15.0, 17.5];
        let mut ghost = Ghost::new(recording_of(&xs), 1);

        for &x in &xs {
            ghost.update();
            assert!(ghost.is_active);
            assert_eq!(ghost.position, Vec2::new(x, 100.0));
        }

        ghost.update();
        assert!(!ghost.is_active);
        let frozen = ghost.position;
        ghost.update();
        assert_eq!(ghost.position, frozen);
        assert_eq!(ghost.current_frame(), xs.len());
    }

    #[test]
    fn test_reset_rewinds() {
        let mut ghost = Ghost::new(recording_of(&[1.0, 2.0]), 3);
        for _ in 0..5 {
            ghost.update();
        }
        ghost.reset();
        assert!(ghost.is_active);
        assert_eq!(ghost.current_frame(), 0);
        ghost.update();
        assert_eq!(ghost.position.x, 1.0);
    }

    #[test]
    fn test_empty_recording_goes_inactive() {
        let mut ghost = Ghost::new(recording_of(&[]), 1);
        ghost.update();
        assert!(!ghost.is_active);
        assert!(ghost.interaction_state().is_none());
    }

    #[test]
    fn test_hue_cycles_per_loop() {
        let recording = recording_of(&[0.0]);
        assert_eq!(Ghost::new(recording.clone(), 1).hue(), 60.0);
        assert_eq!(Ghost::new(recording, 6).hue(), 0.0);
    }
}
