//! Portable level document
//!
//! The JSON shape is shared with the level editor and exported files:
//! camelCase keys, interactables tagged by `type`, button connections given
//! as indices into the flattened `interactables` array.

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::*;
use crate::sim::geometry::{Rect, Vec2, serde_xy};
use crate::sim::interactable::{Interactable, InteractableKind, OpenPolicy};
use crate::sim::level::{DEFAULT_BACKGROUND, DEFAULT_SPAWN, Level};

/// Current document version
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_spawn", with = "serde_xy")]
    pub player_spawn: Vec2,
    #[serde(default, deserialize_with = "lenient_exit_zone")]
    pub exit_zone: Option<Rect>,
    #[serde(default, deserialize_with = "lenient_platforms")]
    pub platforms: Vec<Rect>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub interactables: Vec<InteractableDoc>,
}

/// One entry of the `interactables` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractableDoc {
    #[serde(rename_all = "camelCase")]
    Button {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default = "default_requires_hold")]
        requires_hold: bool,
        #[serde(default = "default_hold_time")]
        required_hold_time: u32,
        #[serde(default)]
        connections: Vec<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Door {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default = "default_door_width")]
        width: f32,
        #[serde(default = "default_door_height")]
        height: f32,
        #[serde(default, skip_serializing_if = "is_default_policy")]
        open_policy: OpenPolicy,
    },
    MovableBlock {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default = "default_block_size")]
        width: f32,
        #[serde(default = "default_block_size")]
        height: f32,
    },
    /// Entry that could not be decoded; keeps later indices stable
    #[serde(other)]
    Unknown,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_spawn() -> Vec2 {
    DEFAULT_SPAWN
}

fn default_requires_hold() -> bool {
    true
}

fn default_hold_time() -> u32 {
    BUTTON_HOLD_TIME_MS
}

fn default_door_width() -> f32 {
    DOOR_WIDTH
}

fn default_door_height() -> f32 {
    DOOR_HEIGHT
}

fn default_block_size() -> f32 {
    BLOCK_SIZE
}

fn is_default_policy(policy: &OpenPolicy) -> bool {
    *policy == OpenPolicy::Any
}

/// Decode entries one at a time so a bad entry cannot sink the level
fn lenient_entries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<InteractableDoc>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                log::debug!("Dropping interactable {}: {}", i, e);
                InteractableDoc::Unknown
            })
        })
        .collect())
}

/// Platforms that fail to decode are dropped; the rest still load
fn lenient_platforms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Rect>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(rect) => Some(rect),
            Err(e) => {
                log::debug!("Dropping platform {}: {}", i, e);
                None
            }
        })
        .collect())
}

/// A malformed exit zone reads as no exit zone
fn lenient_exit_zone<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rect>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match serde_json::from_value(value) {
        Ok(rect) => Some(rect),
        Err(e) => {
            log::debug!("Dropping exit zone: {}", e);
            None
        }
    }))
}

impl Default for LevelDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            background_color: default_background(),
            player_spawn: DEFAULT_SPAWN,
            exit_zone: None,
            platforms: Vec::new(),
            interactables: Vec::new(),
        }
    }
}

impl LevelDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Capture a level's authored structure
    ///
    /// Doors are written at their closed position and blocks at their home
    /// position, so a level saved mid-loop reloads in its starting state.
    pub fn from_level(level: &Level) -> Self {
        let interactables = level
            .interactables
            .iter()
            .map(|obj| {
                let size = obj.body.size();
                match &obj.kind {
                    InteractableKind::Button(button) => InteractableDoc::Button {
                        x: obj.body.position.x,
                        y: obj.body.position.y,
                        requires_hold: button.requires_hold,
                        required_hold_time: button.required_hold_time,
                        connections: button.connected_doors.iter().map(|&d| d as i64).collect(),
                    },
                    InteractableKind::Door(door) => InteractableDoc::Door {
                        x: obj.body.position.x,
                        y: door.closed_y,
                        width: size.x,
                        height: size.y,
                        open_policy: door.policy,
                    },
                    InteractableKind::MovableBlock(block) => InteractableDoc::MovableBlock {
                        x: block.home.x,
                        y: block.home.y,
                        width: size.x,
                        height: size.y,
                    },
                }
            })
            .collect();

        Self {
            version: DOCUMENT_VERSION,
            background_color: level.background_color.clone(),
            player_spawn: level.player_spawn,
            exit_zone: level.exit_zone,
            platforms: level.platforms.iter().map(|p| p.bounds()).collect(),
            interactables,
        }
    }

    /// Build a playable level
    ///
    /// Unknown entries are skipped and connections are remapped past them.
    /// Connections that are out of range or not doors are dropped.
    pub fn to_level(&self) -> Level {
        let mut level = Level::new();
        level.background_color = self.background_color.clone();
        level.player_spawn = self.player_spawn;
        level.exit_zone = self.exit_zone;

        for p in &self.platforms {
            level.add_platform(p.x, p.y, p.width, p.height);
        }

        let mut index_map: Vec<Option<usize>> = Vec::with_capacity(self.interactables.len());
        for entry in &self.interactables {
            let obj = match *entry {
                InteractableDoc::Button {
                    x,
                    y,
                    requires_hold,
                    required_hold_time,
                    ..
                } => Some(Interactable::button(x, y).with_hold(requires_hold, required_hold_time)),
                InteractableDoc::Door {
                    x,
                    y,
                    width,
                    height,
                    open_policy,
                } => Some(Interactable::door(x, y, width, height).with_policy(open_policy)),
                InteractableDoc::MovableBlock {
                    x,
                    y,
                    width,
                    height,
                } => Some(Interactable::movable_block(x, y, width, height)),
                InteractableDoc::Unknown => None,
            };
            index_map.push(obj.map(|obj| level.add_interactable(obj)));
        }

        for (doc_index, entry) in self.interactables.iter().enumerate() {
            let InteractableDoc::Button { connections, .. } = entry else {
                continue;
            };
            let Some(button) = index_map[doc_index] else {
                continue;
            };
            for &target in connections {
                let door = usize::try_from(target)
                    .ok()
                    .and_then(|t| index_map.get(t).copied().flatten());
                let wired = door.map(|door| level.connect(button, door));
                match wired {
                    Some(Ok(())) => {}
                    Some(Err(e)) => log::debug!("Dropping connection {} -> {}: {}", doc_index, target, e),
                    None => log::debug!("Dropping connection {} -> {}: no such interactable", doc_index, target),
                }
            }
        }

        level
    }
}

impl From<&Level> for LevelDocument {
    fn from(level: &Level) -> Self {
        Self::from_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r##"{
        "version": 1,
        "backgroundColor": "#202040",
        "playerSpawn": {"x": 60, "y": 480},
        "exitZone": {"x": 700, "y": 470, "width": 60, "height": 80},
        "platforms": [{"x": 0, "y": 550, "width": 800, "height": 50}],
        "interactables": [
            {"type": "button", "x": 200, "y": 530, "requiresHold": true, "requiredHoldTime": 500, "connections": [1, 7, 2]},
            {"type": "door", "x": 600, "y": 450, "width": 20, "height": 100},
            {"type": "movable_block", "x": 300, "y": 510, "width": 40, "height": 40}
        ]
    }"##;

    #[test]
    fn test_sample_loads() {
        let doc = LevelDocument::from_json(SAMPLE).unwrap();
        let level = doc.to_level();

        assert_eq!(level.background_color, "#202040");
        assert_eq!(level.player_spawn, Vec2::new(60.0, 480.0));
        assert_eq!(level.platforms.len(), 1);
        assert_eq!(level.interactables.len(), 3);

        let button = level.interactables[0].as_button().unwrap();
        assert_eq!(button.required_hold_time, 500);
        // 7 is out of range and 2 is a block
        assert_eq!(button.connected_doors, vec![1]);
    }

    #[test]
    fn test_unknown_entry_keeps_connections_aligned() {
        let json = r#"{
            "interactables": [
                {"type": "laser", "x": 0, "y": 0},
                {"type": "button", "x": 10, "y": 10, "connections": [2]},
                {"type": "door", "x": 100, "y": 0}
            ]
        }"#;
        let doc = LevelDocument::from_json(json).unwrap();
        assert_eq!(doc.interactables[0], InteractableDoc::Unknown);

        let level = doc.to_level();
        assert_eq!(level.interactables.len(), 2);
        assert_eq!(level.interactables[0].as_button().unwrap().connected_doors, vec![1]);
        assert_eq!(level.interactables[1].body.size(), Vec2::new(DOOR_WIDTH, DOOR_HEIGHT));
    }

    #[test]
    fn test_malformed_entry_becomes_unknown() {
        let json = r#"{"interactables": [{"type": "door", "x": "left"}]}"#;
        let doc = LevelDocument::from_json(json).unwrap();
        assert_eq!(doc.interactables, vec![InteractableDoc::Unknown]);
        assert!(doc.to_level().interactables.is_empty());
    }

    #[test]
    fn test_missing_coordinates_default_to_zero() {
        let json = r#"{
            "interactables": [
                {"type": "button", "y": 10, "connections": [1]},
                {"type": "door", "x": 100}
            ]
        }"#;
        let level = LevelDocument::from_json(json).unwrap().to_level();
        assert_eq!(level.interactables.len(), 2);
        assert_eq!(level.interactables[0].body.position, Vec2::new(0.0, 10.0));
        assert_eq!(level.interactables[0].as_button().unwrap().connected_doors, vec![1]);
        assert_eq!(level.interactables[1].body.position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_bad_platform_and_exit_zone_do_not_sink_level() {
        let json = r#"{
            "exitZone": {"x": 700, "y": 470},
            "platforms": [
                {"x": 0, "y": 550, "width": 800},
                {"x": 100, "y": 400, "width": 200, "height": 20}
            ],
            "interactables": [{"type": "door", "x": 300, "y": 450}]
        }"#;
        let doc = LevelDocument::from_json(json).unwrap();
        assert_eq!(doc.platforms, vec![Rect::new(100.0, 400.0, 200.0, 20.0)]);
        assert_eq!(doc.exit_zone, None);
        assert_eq!(doc.to_level().interactables.len(), 1);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let doc = LevelDocument::from_json("{}").unwrap();
        assert_eq!(doc, LevelDocument::default());
        assert!(LevelDocument::from_json("not json").is_err());
    }

    #[test]
    fn test_policy_only_written_when_all() {
        let mut level = Level::new();
        level.add_interactable(Interactable::door(0.0, 0.0, 20.0, 100.0));
        level.add_interactable(Interactable::door(50.0, 0.0, 20.0, 100.0).with_policy(OpenPolicy::All));

        let json = serde_json::to_value(LevelDocument::from_level(&level)).unwrap();
        assert!(json["interactables"][0].get("openPolicy").is_none());
        assert_eq!(json["interactables"][1]["openPolicy"], "all");
        assert_eq!(json["exitZone"], serde_json::Value::Null);
    }

    #[test]
    fn test_saved_mid_loop_reloads_at_start_state() {
        let mut level = LevelDocument::from_json(SAMPLE).unwrap().to_level();
        let pristine = LevelDocument::from_level(&level);

        level.interactables[1].set_open(true);
        level.interactables[1].update();
        level.interactables[2].body.position.x += 30.0;

        assert_eq!(LevelDocument::from_level(&level), pristine);
        assert_eq!(pristine.interactables[1], InteractableDoc::Door {
            x: 600.0,
            y: 450.0,
            width: 20.0,
            height: 100.0,
            open_policy: OpenPolicy::Any,
        });
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (0u16..800, 0u16..600, 1u16..200, 1u16..200)
            .prop_map(|(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
    }

    fn arb_entry(count: usize) -> impl Strategy<Value = InteractableDoc> {
        let index = 0..count as i64;
        prop_oneof![
            (arb_rect(), any::<bool>(), 0u32..3000, prop::collection::vec(index, 0..3)).prop_map(
                |(r, requires_hold, required_hold_time, connections)| InteractableDoc::Button {
                    x: r.x,
                    y: r.y,
                    requires_hold,
                    required_hold_time,
                    connections,
                }
            ),
            (arb_rect(), any::<bool>()).prop_map(|(r, all)| InteractableDoc::Door {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                open_policy: if all { OpenPolicy::All } else { OpenPolicy::Any },
            }),
            arb_rect().prop_map(|r| InteractableDoc::MovableBlock {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_level_round_trip_preserves_structure(
            platforms in prop::collection::vec(arb_rect(), 0..6),
            entries in (1usize..8).prop_flat_map(|n| prop::collection::vec(arb_entry(n), n)),
            exit in prop::option::of(arb_rect()),
        ) {
            let doc = LevelDocument {
                platforms,
                interactables: entries,
                exit_zone: exit,
                ..LevelDocument::default()
            };
            let level = doc.to_level();
            let saved = LevelDocument::from_level(&level);
            let reloaded = saved.to_level();

            prop_assert_eq!(&LevelDocument::from_level(&reloaded), &saved);
            prop_assert_eq!(reloaded.interactables.len(), doc.interactables.len());
            for (obj, original) in reloaded.interactables.iter().zip(&doc.interactables) {
                if let (Some(button), InteractableDoc::Button { connections, .. }) = (obj.as_button(), original) {
                    // Only valid door targets survive, each wired once, in order
                    let mut expected: Vec<usize> = Vec::new();
                    for &c in connections {
                        let c = c as usize;
                        if reloaded.interactables[c].is_door() && !expected.contains(&c) {
                            expected.push(c);
                        }
                    }
                    prop_assert_eq!(&button.connected_doors, &expected);
                }
            }
        }
    }
}
