//! Scoped on-disk staging of reference clips.
//!
//! The model reads its reference from a file path. Decoded clips are written
//! to a `NamedTempFile` owned by the guard; dropping the guard deletes the
//! file on every exit path. Clips that already live on disk are borrowed and
//! never deleted.

use std::path::{Path, PathBuf};

use tracing::debug;
use voice_clone_domain::{ReferenceClip, SpeakerReference, VoiceError};

use crate::encoder::write_wav_file;

#[derive(Debug)]
pub enum StagedReference {
    /// Written by us; removed on drop.
    Temporary(tempfile::NamedTempFile),
    /// Owned by someone else; left alone.
    Borrowed(PathBuf),
}

impl StagedReference {
    /// Materialise `reference` as a WAV file the model can open.
    pub fn stage(reference: SpeakerReference, temp_dir: Option<&Path>) -> Result<Self, VoiceError> {
        let origin = reference.origin();
        match reference.into_clip() {
            ReferenceClip::OnDisk(path) => {
                debug!(?origin, path = %path.display(), "using reference clip in place");
                Ok(Self::Borrowed(path))
            }
            ReferenceClip::Decoded(buffer) => {
                let mut builder = tempfile::Builder::new();
                builder.prefix("voice-clone-ref-").suffix(".wav");
                let file = match temp_dir {
                    Some(dir) => builder.tempfile_in(dir),
                    None => builder.tempfile(),
                }
                .map_err(|e| VoiceError::Io(format!("failed to create temp file: {e}")))?;

                write_wav_file(file.path(), &buffer)?;
                debug!(?origin, path = %file.path().display(), frames = buffer.frames(), "staged reference clip");
                Ok(Self::Temporary(file))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Temporary(file) => file.path(),
            Self::Borrowed(path) => path,
        }
    }
}
