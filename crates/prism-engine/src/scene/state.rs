use super::{FrameRing, Scene};
use crate::time::FrameTime;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Idle,
    Writing,
    Published,
}

/// Scene values of one frame after `SceneState::publish`. Read-only.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PublishedScene {
    frame_index: u64,
    slot: usize,
    scene: Scene,
}

impl PublishedScene {
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Ring slot the frame's uniforms belong in.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

/// Single-writer owner of the per-frame scene.
///
/// Each frame runs `begin_frame` → `scene_mut` (any number of times) → `publish`.
/// Values carry over from the previous frame, except `elapsed_time` which comes
/// from the frame's `FrameTime`.
#[derive(Debug)]
pub struct SceneState {
    ring: FrameRing,
    slots: Vec<Option<PublishedScene>>,
    current: Scene,
    frame_index: u64,
    phase: Phase,
}

impl SceneState {
    pub fn new(ring: FrameRing, initial: Scene) -> Self {
        Self {
            ring,
            slots: vec![None; ring.len()],
            current: initial,
            frame_index: 0,
            phase: Phase::Idle,
        }
    }

    #[inline]
    pub fn ring(&self) -> FrameRing {
        self.ring
    }

    pub fn begin_frame(&mut self, time: FrameTime) {
        if self.phase == Phase::Writing {
            log::warn!(
                "SceneState: frame {} was never published; its changes roll into frame {}",
                self.frame_index,
                time.frame_index
            );
        }
        self.frame_index = time.frame_index;
        self.current.elapsed_time = time.elapsed;
        self.phase = Phase::Writing;
    }

    /// Mutable access to the frame being written.
    ///
    /// Calling this after `publish` and before the next `begin_frame` is a logic
    /// error: it panics in debug builds. Release builds log a warning and the
    /// change lands in the next frame.
    pub fn scene_mut(&mut self) -> &mut Scene {
        if self.phase == Phase::Published {
            debug_assert!(false, "scene mutated after publish in frame {}", self.frame_index);
            log::warn!(
                "SceneState: scene mutated after publish in frame {}",
                self.frame_index
            );
        }
        &mut self.current
    }

    /// The scene as it currently stands, whether published or not.
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.current
    }

    /// Freezes the current frame and stores it in its ring slot.
    pub fn publish(&mut self) -> PublishedScene {
        if self.phase == Phase::Idle {
            log::warn!("SceneState: publish without begin_frame (frame {})", self.frame_index);
        }
        let published = PublishedScene {
            frame_index: self.frame_index,
            slot: self.ring.slot(self.frame_index),
            scene: self.current,
        };
        self.slots[published.slot] = Some(published);
        self.phase = Phase::Published;
        published
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.phase == Phase::Published
    }

    /// Most recent publication stored in `slot`, if any.
    pub fn published(&self, slot: usize) -> Option<&PublishedScene> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Publication of the frame before the one currently open.
    pub fn previous(&self) -> Option<&PublishedScene> {
        self.published(self.ring.previous_slot(self.frame_index))
            .filter(|p| p.frame_index < self.frame_index)
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(FrameRing::default(), Scene::default())
    }
}
