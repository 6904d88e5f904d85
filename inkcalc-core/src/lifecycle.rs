//! Scoped attachment of side-effecting collaborators.
//!
//! External hooks (typesetting script injection, viewport resize listeners)
//! are acquired on mount and released when the [`Mounted`] guard drops.

use std::ops::{Deref, DerefMut};

use crate::{CalcResult, Overlays};

/// A collaborator with an explicit attach/detach lifecycle.
pub trait Collaborator {
    /// Acquire the underlying resource (inject a script, register a listener).
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be acquired.
    fn attach(&mut self) -> CalcResult<()>;

    /// Release the resource. Called exactly once by [`Mounted`] on drop.
    fn detach(&mut self);
}

/// External math typesetting engine.
pub trait Typesetter: Collaborator {
    /// Typeset the content of every overlay, in order.
    ///
    /// Invoked after each change to the overlay list.
    fn typeset(&mut self, overlays: Overlays<'_>);
}

/// Produces a transmissible image of the current canvas pixels.
pub trait CanvasSnapshot {
    /// Encode the canvas as a `data:image/png;base64,...` URL.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Snapshot`](crate::CalcError::Snapshot) if encoding
    /// fails.
    fn encode_data_url(&self) -> CalcResult<String>;
}

/// Guard that keeps a collaborator attached for its lifetime.
#[derive(Debug)]
pub struct Mounted<C: Collaborator> {
    inner: C,
}

impl<C: Collaborator> Mounted<C> {
    /// Attach `collaborator` and return the guard.
    ///
    /// # Errors
    ///
    /// Returns the attach error; nothing is detached in that case.
    pub fn mount(mut collaborator: C) -> CalcResult<Self> {
        collaborator.attach()?;
        tracing::debug!("Collaborator mounted");
        Ok(Self {
            inner: collaborator,
        })
    }
}

impl<C: Collaborator> Deref for Mounted<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<C: Collaborator> DerefMut for Mounted<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<C: Collaborator> Drop for Mounted<C> {
    fn drop(&mut self) {
        self.inner.detach();
        tracing::debug!("Collaborator unmounted");
    }
}
