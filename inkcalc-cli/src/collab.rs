//! Host-side collaborators mounted for the lifetime of the app.

use inkcalc_core::{CalcResult, Collaborator, Overlays, Size, Typesetter};

/// Typesetter stand-in that logs overlay markup instead of rendering it.
#[derive(Debug, Default)]
pub struct LogTypesetter {
    attached: bool,
    runs: u64,
    rendered: Vec<String>,
}

impl LogTypesetter {
    /// Create a detached typesetter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of typeset passes so far.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Markup typeset by the latest pass.
    #[must_use]
    pub fn rendered(&self) -> &[String] {
        &self.rendered
    }

    /// Whether the typesetter is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl Collaborator for LogTypesetter {
    fn attach(&mut self) -> CalcResult<()> {
        self.attached = true;
        tracing::debug!("Typesetter attached");
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
        tracing::debug!("Typesetter detached after {} passes", self.runs);
    }
}

impl Typesetter for LogTypesetter {
    fn typeset(&mut self, overlays: Overlays<'_>) {
        if !self.attached {
            tracing::warn!("Typeset requested while detached; ignored");
            return;
        }
        self.runs += 1;
        self.rendered = overlays
            .map(|overlay| {
                tracing::info!(
                    "overlay {} at ({}, {}): {}",
                    overlay.id,
                    overlay.position.x,
                    overlay.position.y,
                    overlay.content
                );
                overlay.content.clone()
            })
            .collect();
    }
}

/// Resize listener: forwards viewport changes only while attached and
/// coalesces repeats of the current size.
#[derive(Debug)]
pub struct ViewportListener {
    attached: bool,
    current: Size,
}

impl ViewportListener {
    /// Create a listener for a viewport of the given size.
    #[must_use]
    pub fn new(initial: Size) -> Self {
        Self {
            attached: false,
            current: initial,
        }
    }

    /// Report a new viewport size. Returns the size to apply, if any.
    pub fn observe(&mut self, size: Size) -> Option<Size> {
        if !self.attached || size == self.current {
            return None;
        }
        self.current = size;
        Some(size)
    }

    /// Last size forwarded.
    #[must_use]
    pub fn current(&self) -> Size {
        self.current
    }
}

impl Collaborator for ViewportListener {
    fn attach(&mut self) -> CalcResult<()> {
        self.attached = true;
        tracing::debug!(
            "Viewport listener attached at {}x{}",
            self.current.width,
            self.current.height
        );
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}
