//! External container conversion through `ffmpeg`.
//!
//! Used only when the native readers give up (WebM/Opus, AAC in odd
//! containers, truncated headers ...). The tool performs decode, resample to
//! 22 050 Hz and down-mix to mono in a single pass.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};
use voice_clone_domain::{CANONICAL_SAMPLE_RATE, VoiceError};

/// Where an external tool lives, resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocation {
    name: String,
    path: Option<PathBuf>,
}

impl ToolLocation {
    /// Resolve `program`, preferring an explicit configured location.
    ///
    /// An explicit value containing a path separator must point at an
    /// existing file; a bare name is looked up on `PATH` like the default.
    pub fn resolve(program: &str, explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) if p.components().count() > 1 || p.is_absolute() => {
                if p.is_file() {
                    Some(p.to_path_buf())
                } else {
                    warn!(tool = program, path = %p.display(), "configured tool path does not exist");
                    None
                }
            }
            Some(p) => search_path(p.as_os_str()),
            None => search_path(OsStr::new(program)),
        };

        match &path {
            Some(p) => info!(tool = program, path = %p.display(), "resolved external tool"),
            None => warn!(tool = program, "external tool not found"),
        }

        Self {
            name: program.to_string(),
            path,
        }
    }

    /// A location that never resolves.
    pub fn unavailable(program: &str) -> Self {
        Self {
            name: program.to_string(),
            path: None,
        }
    }

    pub fn at(program: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: program.to_string(),
            path: Some(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

fn search_path(program: &OsStr) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let suffix = std::env::consts::EXE_SUFFIX;
        if suffix.is_empty() {
            return None;
        }
        let mut with_suffix = candidate.into_os_string();
        with_suffix.push(suffix);
        let with_suffix = PathBuf::from(with_suffix);
        with_suffix.is_file().then_some(with_suffix)
    })
}

/// Demuxers ffmpeg may pick for an uploaded clip. Playlist and concat
/// formats are absent so an upload cannot make ffmpeg open other inputs.
const ALLOWED_DEMUXERS: &str = "wav,w64,mp3,flac,ogg,matroska,mov,aac,aiff,amr,caf,asf";

/// Upload extensions kept on the temporary input; anything else becomes `.bin`.
const KNOWN_EXTENSIONS: &[&str] = &[
    "wav", "wave", "w64", "mp3", "flac", "ogg", "oga", "opus", "webm", "mka", "mkv", "m4a",
    "mp4", "mov", "3gp", "aac", "aif", "aiff", "amr", "caf", "wma",
];

fn input_suffix(input_name: &str) -> String {
    Path::new(input_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| KNOWN_EXTENSIONS.contains(&e.as_str()))
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| ".bin".to_string())
}

fn conversion_args(source: &Path, target: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-y",
        "-hide_banner",
        "-nostdin",
        "-loglevel",
        "error",
        "-protocol_whitelist",
        "file",
        "-format_whitelist",
        ALLOWED_DEMUXERS,
        "-i",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(source.as_os_str().to_owned());
    let rate = CANONICAL_SAMPLE_RATE.to_string();
    args.extend(
        ["-ac", "1", "-ar", rate.as_str(), "-c:a", "pcm_s16le", "-f", "wav"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(target.as_os_str().to_owned());
    args
}

/// Runs the conversion tool over scoped temporary files.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg: ToolLocation,
    temp_dir: Option<PathBuf>,
}

impl Transcoder {
    pub fn new(ffmpeg: ToolLocation) -> Self {
        Self {
            ffmpeg,
            temp_dir: None,
        }
    }

    /// Create temporary files under `dir` instead of the OS default.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// Convert `input` into a canonical mono 22 050 Hz 16-bit WAV.
    ///
    /// Both temporary files are dropped (and deleted) before returning, on
    /// success and failure alike.
    pub fn transcode(&self, input: &[u8], input_name: &str) -> Result<Vec<u8>, VoiceError> {
        let Some(ffmpeg) = self.ffmpeg.path() else {
            return Err(VoiceError::UnsupportedFormat(format!(
                "cannot decode {input_name} and no {} is available for conversion; please upload a WAV file",
                self.ffmpeg.name()
            )));
        };

        let source = self.temp_file(&input_suffix(input_name))?;
        std::fs::write(source.path(), input)?;
        let target = self.temp_file(".wav")?;

        debug!(tool = %ffmpeg.display(), input = %source.path().display(), "transcoding reference clip");

        let output = Command::new(ffmpeg)
            .args(conversion_args(source.path(), target.path()))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                warn!(tool = %ffmpeg.display(), error = %e, "failed to run ffmpeg");
                VoiceError::ConversionFailed("the conversion tool could not be started".into())
            })?;

        // stderr stays in the log; it can quote server paths.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(input = input_name, status = %output.status, stderr = %stderr.trim(), "ffmpeg conversion failed");
            return Err(VoiceError::ConversionFailed(format!(
                "could not convert {input_name} to WAV"
            )));
        }

        let converted = std::fs::read(target.path())?;
        info!(input = input_name, bytes = converted.len(), "converted reference clip with ffmpeg");
        Ok(converted)
    }

    fn temp_file(&self, suffix: &str) -> Result<tempfile::NamedTempFile, VoiceError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("voice-clone-").suffix(suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(|e| VoiceError::Io(format!("failed to create temp file: {e}")))
    }
}
