// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The crate-wide error type.  Everything that can go wrong goes wrong
//! before any pixel is computed (bad configuration, impossible sizes)
//! or after the last one is (the output could not be written).  The
//! iteration itself cannot fail.

use failure::Fail;

/// Errors surfaced by the engine and its render targets.
#[derive(Debug, Fail)]
pub enum Error {
    /// A viewport, escape parameter, threshold or z0 matrix that can
    /// not describe a render.  Rejected before computation begins.
    #[fail(display = "Invalid configuration: {}", _0)]
    InvalidConfiguration(String),

    /// The requested raster can not even be counted in memory.
    #[fail(display = "Requested image is too large: {}", _0)]
    TooLarge(String),

    /// The computed image could not be written.  The image itself is
    /// still valid and can be written somewhere else.
    #[fail(display = "Could not write {}: {}", path, error)]
    RenderTarget {
        /// Where we tried to write.
        path: String,
        /// What the encoder told us.
        #[cause]
        error: image::ImageError,
    },

    /// One of the render threads panicked.
    #[fail(display = "A render worker panicked")]
    WorkerPanic,

    /// A background request already failed; this repeats its reason.
    #[fail(display = "Request {} failed: {}", generation, reason)]
    RequestFailed {
        /// The generation of the failed request.
        generation: u64,
        /// The message of the original error.
        reason: String,
    },
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Builds an `InvalidConfiguration` error from anything string-like.
pub(crate) fn invalid<S: Into<String>>(message: S) -> Error {
    Error::InvalidConfiguration(message.into())
}
