use std::path::Path;

use stilllife_render::{TextureBackend, TextureHandle};

use crate::AssetError;

/// Number of texture units the registry hands out.
pub const TEXTURE_CAPACITY: usize = 16;

/// A loaded texture and the tag it was registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    pub tag: String,
    pub handle: TextureHandle,
}

/// Tagged textures in registration order.
///
/// A texture's slot is its registration index, which is also the texture
/// unit it is bound to by [`bind_all`](Self::bind_all). The registry never
/// holds more than [`TEXTURE_CAPACITY`] entries.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    bindings: Vec<TextureBinding>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            bindings: Vec::with_capacity(TEXTURE_CAPACITY),
        }
    }

    /// Decode and upload `path` through `backend`, registering it as `tag`.
    ///
    /// On any error the registry is left untouched.
    pub fn load(
        &mut self,
        backend: &mut impl TextureBackend,
        path: impl AsRef<Path>,
        tag: impl Into<String>,
    ) -> Result<TextureHandle, AssetError> {
        let tag = tag.into();
        if self.bindings.len() >= TEXTURE_CAPACITY {
            return Err(AssetError::CapacityExceeded {
                capacity: TEXTURE_CAPACITY,
                tag,
            });
        }
        let handle = backend.create_texture(path.as_ref())?;
        tracing::debug!(%tag, path = %path.as_ref().display(), slot = self.bindings.len(), "texture loaded");
        self.bindings.push(TextureBinding { tag, handle });
        Ok(handle)
    }

    /// Bind every texture to the unit matching its slot.
    pub fn bind_all(&self, backend: &mut impl TextureBackend) {
        for (slot, binding) in self.bindings.iter().enumerate() {
            backend.bind_texture(binding.handle, slot as u32);
        }
    }

    /// Slot (texture unit) of the first texture registered as `tag`.
    pub fn slot_of(&self, tag: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.tag == tag)
    }

    /// Handle of the first texture registered as `tag`.
    pub fn handle_of(&self, tag: &str) -> Option<TextureHandle> {
        self.bindings.iter().find(|b| b.tag == tag).map(|b| b.handle)
    }

    /// Destroy every texture. Calling again does nothing.
    pub fn release_all(&mut self, backend: &mut impl TextureBackend) {
        for binding in self.bindings.drain(..) {
            backend.destroy_texture(binding.handle);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stilllife_render::{Command, RecordingBackend};

    #[test]
    fn slots_follow_registration_order() {
        let mut backend = RecordingBackend::new();
        let mut reg = TextureRegistry::new();
        for tag in ["A", "B", "C"] {
            reg.load(&mut backend, format!("{tag}.png"), tag).unwrap();
        }
        assert_eq!(reg.slot_of("A"), Some(0));
        assert_eq!(reg.slot_of("B"), Some(1));
        assert_eq!(reg.slot_of("C"), Some(2));
        assert_eq!(reg.slot_of("D"), None);
    }

    #[test]
    fn failed_load_leaves_registry_unchanged() {
        let mut backend = RecordingBackend::new();
        backend.fail_texture("broken.jpg");
        let mut reg = TextureRegistry::new();
        reg.load(&mut backend, "a.jpg", "a").unwrap();

        let err = reg.load(&mut backend, "broken.jpg", "broken").unwrap_err();
        assert!(matches!(err, AssetError::Texture(_)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.slot_of("broken"), None);

        // The next successful load takes the slot the failed one would have had.
        reg.load(&mut backend, "c.jpg", "c").unwrap();
        assert_eq!(reg.slot_of("c"), Some(1));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut backend = RecordingBackend::new();
        let mut reg = TextureRegistry::new();
        for i in 0..TEXTURE_CAPACITY {
            reg.load(&mut backend, format!("{i}.png"), format!("t{i}"))
                .unwrap();
        }
        let err = reg.load(&mut backend, "extra.png", "extra").unwrap_err();
        assert!(matches!(
            err,
            AssetError::CapacityExceeded { capacity: TEXTURE_CAPACITY, .. }
        ));
        assert_eq!(reg.len(), TEXTURE_CAPACITY);
        assert_eq!(backend.live_texture_count(), TEXTURE_CAPACITY);
    }

    #[test]
    fn bind_all_uses_slot_as_unit() {
        let mut backend = RecordingBackend::new();
        let mut reg = TextureRegistry::new();
        let a = reg.load(&mut backend, "a.png", "a").unwrap();
        let b = reg.load(&mut backend, "b.png", "b").unwrap();
        backend.clear_log();
        reg.bind_all(&mut backend);
        assert_eq!(
            backend.commands(),
            &[
                Command::BindTexture { handle: a, unit: 0 },
                Command::BindTexture { handle: b, unit: 1 },
            ]
        );
    }

    #[test]
    fn duplicate_tag_resolves_to_first() {
        let mut backend = RecordingBackend::new();
        let mut reg = TextureRegistry::new();
        let first = reg.load(&mut backend, "wood.jpg", "wood").unwrap();
        reg.load(&mut backend, "other.jpg", "wood").unwrap();
        assert_eq!(reg.slot_of("wood"), Some(0));
        assert_eq!(reg.handle_of("wood"), Some(first));
    }

    #[test]
    fn release_all_is_idempotent() {
        let mut backend = RecordingBackend::new();
        let mut reg = TextureRegistry::new();
        reg.load(&mut backend, "a.png", "a").unwrap();
        reg.load(&mut backend, "b.png", "b").unwrap();

        reg.release_all(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
        assert!(reg.is_empty());

        // RecordingBackend panics on a double destroy.
        reg.release_all(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
    }
}
