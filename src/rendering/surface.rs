//! Off-screen render surfaces, one per render call.
//!
//! A surface is the layout arena a document is mounted on before
//! rasterization. Every render call owns an independent surface, so
//! concurrent renders can never collide on shared layout state. Release is
//! structural: the surface deregisters itself on `Drop`, which covers
//! success, stage errors, cancellation of the owning future, and unwinding
//! inside a blocking render task alike.

use crate::models::PageSpec;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

static ACTIVE_SURFACES: OnceLock<Mutex<HashSet<u64>>> = OnceLock::new();
static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

fn active_surfaces() -> MutexGuard<'static, HashSet<u64>> {
    ACTIVE_SURFACES
        .get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-wide view of live surfaces.
///
/// Exists so callers (and tests) can verify that no exit path leaks a
/// mounted surface.
pub struct SurfaceRegistry;

impl SurfaceRegistry {
    /// Number of surfaces currently mounted.
    pub fn active_count() -> usize {
        active_surfaces().len()
    }
}

/// An off-screen, page-sized layout area holding compiled markup.
pub struct RenderSurface {
    id: u64,
    spec: PageSpec,
    markup: String,
}

impl RenderSurface {
    /// Acquire a fresh surface and mount markup on it.
    pub fn acquire(spec: PageSpec, markup: String) -> Self {
        let id = NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed);
        active_surfaces().insert(id);
        tracing::debug!(surface = id, "Acquired render surface");
        Self { id, spec, markup }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn spec(&self) -> PageSpec {
        self.spec
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Replace the mounted markup (used after embedded-image resolution).
    pub fn set_markup(&mut self, markup: String) {
        self.markup = markup;
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        active_surfaces().remove(&self.id);
        tracing::debug!(surface = self.id, "Released render surface");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests share the process-wide registry, so count assertions are
    // serialized and phrased as deltas.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn lock() -> MutexGuard<'static, ()> {
        TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_acquire_registers_and_drop_releases() {
        let _guard = lock();
        let before = SurfaceRegistry::active_count();
        let surface = RenderSurface::acquire(PageSpec::A4_150, "<svg/>".to_string());
        assert_eq!(SurfaceRegistry::active_count(), before + 1);

        drop(surface);
        assert_eq!(SurfaceRegistry::active_count(), before);
    }

    #[test]
    fn test_surfaces_have_distinct_ids() {
        let a = RenderSurface::acquire(PageSpec::A4_150, String::new());
        let b = RenderSurface::acquire(PageSpec::A4_150, String::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_release_on_early_return() {
        fn failing_render() -> Result<(), String> {
            let _surface = RenderSurface::acquire(PageSpec::A4_150, "<svg/>".to_string());
            Err("rasterization failed".to_string())
        }

        let _guard = lock();
        let before = SurfaceRegistry::active_count();
        let result = failing_render();
        assert!(result.is_err());
        assert_eq!(SurfaceRegistry::active_count(), before);
    }

    #[test]
    fn test_release_on_panic() {
        let _guard = lock();
        let before = SurfaceRegistry::active_count();
        let result = std::panic::catch_unwind(|| {
            let _surface = RenderSurface::acquire(PageSpec::A4_150, "<svg/>".to_string());
            panic!("injected failure");
        });
        assert!(result.is_err());
        assert_eq!(SurfaceRegistry::active_count(), before);
    }

    #[test]
    fn test_set_markup_replaces_content() {
        let mut surface = RenderSurface::acquire(PageSpec::A4_150, "<svg>a</svg>".to_string());
        surface.set_markup("<svg>b</svg>".to_string());
        assert_eq!(surface.markup(), "<svg>b</svg>");
    }
}
