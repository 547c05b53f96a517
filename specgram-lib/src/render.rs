// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Render Surfaces
//!
//! Drawing happens outside this crate.  A renderer implements [`RenderSurface`] and is handed a
//! finished [`Spectrogram`].  Whether the renderer draws onto a surface it creates or onto one the
//! caller already has (composition, e.g. one panel of a larger figure) is expressed by [`Target`]:
//!
//! - [`Target::Owned`] surfaces are returned to the caller after drawing.
//! - [`Target::Borrowed`] surfaces stay with the caller.  Nothing is returned; control simply goes
//!   back to whoever lent the surface.
//!
//! The choice has no effect on the numbers.

use crate::dsp::spectrogram::Spectrogram;
use crate::SpecgramError;

pub trait RenderSurface {
    /// Draw `spectrogram`.  Implementations report their own failures as
    /// [`SpecgramError::Render`].
    fn draw(&mut self, spectrogram: &Spectrogram) -> Result<(), SpecgramError>;
}

/// Where a rendering goes.
pub enum Target<'a, S: RenderSurface> {
    /// Newly created for this call.
    Owned(S),
    /// Supplied by the caller, who keeps it.
    Borrowed(&'a mut S),
}

impl<S: RenderSurface + Default> Target<'_, S> {
    /// A fresh owned surface.
    pub fn create() -> Self {
        Target::Owned(S::default())
    }
}

impl<'a, S: RenderSurface> Target<'a, S> {
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Target::Borrowed(_))
    }

    pub fn surface_mut(&mut self) -> &mut S {
        match self {
            Target::Owned(s) => s,
            Target::Borrowed(s) => &mut **s,
        }
    }

    /// Draw onto the target.  Owned surfaces come back as `Some`, borrowed ones as `None`.
    pub fn present(mut self, spectrogram: &Spectrogram) -> Result<Option<S>, SpecgramError> {
        self.surface_mut().draw(spectrogram)?;
        match self {
            Target::Owned(s) => Ok(Some(s)),
            Target::Borrowed(_) => Ok(None),
        }
    }
}
