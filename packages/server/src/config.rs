//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use voice_clone_audio::{ToolLocation, Transcoder};

/// Voice-cloning TTS server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "VOICE_CLONE_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "VOICE_CLONE_PORT", default_value_t = 5002)]
    pub port: u16,

    /// Model identifier passed to the TTS front end
    #[arg(
        short,
        long,
        env = "VOICE_CLONE_MODEL",
        default_value = "tts_models/multilingual/multi-dataset/xtts_v2"
    )]
    pub model_name: String,

    /// TTS executable (bare name is looked up on PATH)
    #[arg(long, env = "VOICE_CLONE_TTS_BIN", default_value = "tts")]
    pub tts_bin: PathBuf,

    /// ffmpeg executable used to convert non-WAV uploads
    #[arg(long, env = "FFMPEG_PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Directory searched for a cached default voice (first `.wav`)
    #[arg(long, env = "VOICE_CLONE_VOICES_DIR", default_value = "temp_voices")]
    pub voices_dir: PathBuf,

    /// Directory for per-request temporary files
    #[arg(long, env = "VOICE_CLONE_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Maximum number of syntheses in flight
    #[arg(long, env = "VOICE_CLONE_MAX_CONCURRENCY", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_concurrency: u32,

    /// Maximum request body size in bytes
    #[arg(long, env = "VOICE_CLONE_MAX_UPLOAD_BYTES", default_value_t = 25 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Resolve ffmpeg once: explicit path if given, otherwise a `PATH` search.
    pub fn ffmpeg_location(&self) -> ToolLocation {
        ToolLocation::resolve("ffmpeg", self.ffmpeg.as_deref())
    }

    pub fn tts_location(&self) -> ToolLocation {
        ToolLocation::resolve("tts", Some(&self.tts_bin))
    }

    pub fn transcoder(&self) -> Transcoder {
        let transcoder = Transcoder::new(self.ffmpeg_location());
        match &self.temp_dir {
            Some(dir) => transcoder.with_temp_dir(dir),
            None => transcoder,
        }
    }
}
