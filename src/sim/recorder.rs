//! Loop recording
//!
//! Captures the player's physical state every recorded tick. Finished
//! recordings are frozen behind an `Rc` and shared read-only with ghosts.

use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::geometry::{Vec2, serde_xy};
use super::interactable::{InteractableType, InteractionState};
use super::player::PlayerSnapshot;
use crate::consts::MAX_RECORDING_FRAMES;

/// One interactable the recorded actor was triggering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(rename = "type")]
    pub kind: InteractableType,
    pub index: usize,
    pub state: InteractionState,
}

/// One recorded tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Simulated milliseconds since the loop started
    pub timestamp: u64,
    #[serde(with = "serde_xy")]
    pub position: Vec2,
    #[serde(with = "serde_xy")]
    pub velocity: Vec2,
    pub on_ground: bool,
    pub is_active: bool,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
}

/// A loop's worth of frames
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub frames: VecDeque<Frame>,
    /// Simulated session time (ms) when recording started
    #[serde(default)]
    pub start_time: u64,
}

impl Recording {
    pub fn new(start_time: u64) -> Self {
        Self {
            frames: VecDeque::new(),
            start_time,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Append, evicting the oldest frame past the cap
    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
        if self.frames.len() > MAX_RECORDING_FRAMES {
            self.frames.pop_front();
        }
    }
}

/// Records the live player across loops
#[derive(Debug, Clone)]
pub struct ActionRecorder {
    is_recording: bool,
    current: Option<Recording>,
    recordings: Vec<Rc<Recording>>,
    frame_counter: u32,
    record_interval: u32,
}

impl Default for ActionRecorder {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ActionRecorder {
    pub fn new(record_interval: u32) -> Self {
        Self {
            is_recording: false,
            current: None,
            recordings: Vec::new(),
            frame_counter: 0,
            record_interval: record_interval.max(1),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Recording in progress, if any
    pub fn current(&self) -> Option<&Recording> {
        self.current.as_ref()
    }

    /// Open a fresh buffer (drops any unfinished one)
    pub fn start_recording(&mut self, start_time: u64) {
        self.is_recording = true;
        self.frame_counter = 0;
        self.current = Some(Recording::new(start_time));
    }

    /// Append a frame if recording and this tick falls on the interval
    pub fn record_frame(
        &mut self,
        snapshot: &PlayerSnapshot,
        interactions: Vec<InteractionRecord>,
        timestamp: u64,
    ) {
        if !self.is_recording {
            return;
        }
        let Some(recording) = self.current.as_mut() else {
            return;
        };

        self.frame_counter += 1;
        if self.frame_counter % self.record_interval != 0 {
            return;
        }

        recording.push(Frame {
            timestamp,
            position: snapshot.position,
            velocity: snapshot.velocity,
            on_ground: snapshot.on_ground,
            is_active: snapshot.is_active,
            interactions,
        });
    }

    /// Finalize the current recording into history and return its index
    ///
    /// Returns `None` when nothing was being recorded.
    pub fn stop_recording(&mut self) -> Option<usize> {
        if !self.is_recording {
            return None;
        }
        self.is_recording = false;
        let recording = self.current.take()?;
        self.recordings.push(Rc::new(recording));
        Some(self.recordings.len() - 1)
    }

    /// Abandon the current recording without keeping it
    pub fn discard_recording(&mut self) {
        self.is_recording = false;
        self.current = None;
    }

    pub fn recording(&self, index: usize) -> Option<Rc<Recording>> {
        self.recordings.get(index).cloned()
    }

    pub fn recordings(&self) -> &[Rc<Recording>] {
        &self.recordings
    }

    pub fn clear_recordings(&mut self) {
        self.recordings.clear();
        self.discard_recording();
    }

    /// Seed finished history from a previous session
    ///
    /// The recording in progress is untouched; new recordings land after
    /// the restored ones.
    pub fn restore_history(&mut self, recordings: Vec<Recording>) {
        self.recordings = recordings.into_iter().map(Rc::new).collect();
    }
}
