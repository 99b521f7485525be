use std::ops::{Deref, DerefMut};

use crate::render::backend::RenderBackend;

/// Blending enabled and depth writes disabled for the guard's lifetime.
///
/// Dropping the guard restores depth writes and disables blending, so the
/// blended span cannot leak state into the next frame's opaque pass.
pub struct BlendScope<'a> {
    backend: &'a mut dyn RenderBackend,
}

impl<'a> BlendScope<'a> {
    pub fn begin(backend: &'a mut dyn RenderBackend) -> Self {
        backend.set_blending(true);
        backend.set_depth_write(false);
        Self { backend }
    }
}

impl<'a> Deref for BlendScope<'a> {
    type Target = dyn RenderBackend + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.backend
    }
}

impl DerefMut for BlendScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.backend
    }
}

impl Drop for BlendScope<'_> {
    fn drop(&mut self) {
        self.backend.set_depth_write(true);
        self.backend.set_blending(false);
    }
}
