//! Optional presentation collaborators
//!
//! None of these are required. A coordinator without a message surface, audio
//! surface or hook runs exactly the same rules and simply emits nothing.

use crate::core::types::{ActorId, SoundDescriptor};
use crate::equipment::instance::EquipmentInstance;

/// Battle log / message window
pub trait MessageSurface {
    fn post(&mut self, text: &str);
}

/// Sound effect playback
pub trait AudioSurface {
    fn play(&mut self, sound: &SoundDescriptor);
}

/// Game-specific reaction to a break, run after the policy and sound
pub trait BreakHook {
    fn on_break(&mut self, owner: Option<ActorId>, instance: &EquipmentInstance);
}

/// Registered surfaces. Every slot may be empty.
#[derive(Default)]
pub struct Surfaces {
    messages: Option<Box<dyn MessageSurface>>,
    audio: Option<Box<dyn AudioSurface>>,
    hook: Option<Box<dyn BreakHook>>,
}

impl Surfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(mut self, surface: impl MessageSurface + 'static) -> Self {
        self.messages = Some(Box::new(surface));
        self
    }

    pub fn with_audio(mut self, surface: impl AudioSurface + 'static) -> Self {
        self.audio = Some(Box::new(surface));
        self
    }

    pub fn with_hook(mut self, hook: impl BreakHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn post(&mut self, text: &str) {
        if let Some(messages) = self.messages.as_mut() {
            messages.post(text);
        }
    }

    pub fn play(&mut self, sound: &SoundDescriptor) {
        if let Some(audio) = self.audio.as_mut() {
            audio.play(sound);
        }
    }

    pub fn run_hook(&mut self, owner: Option<ActorId>, instance: &EquipmentInstance) {
        if let Some(hook) = self.hook.as_mut() {
            hook.on_break(owner, instance);
        }
    }
}

impl std::fmt::Debug for Surfaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surfaces")
            .field("messages", &self.messages.is_some())
            .field("audio", &self.audio.is_some())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// Routes messages and sounds into the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSurface;

impl MessageSurface for TracingSurface {
    fn post(&mut self, text: &str) {
        tracing::info!(target: "durability::messages", "{}", text);
    }
}

impl AudioSurface for TracingSurface {
    fn play(&mut self, sound: &SoundDescriptor) {
        tracing::debug!(target: "durability::audio", name = %sound.name, volume = sound.volume, "Play sound");
    }
}
