use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Kind of an elementary stream inside a media container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecType {
    Video,
    Audio,
    #[serde(other)]
    Other,
}

/// Properties of a video stream that take part in quality ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStream {
    pub width: u32,
    pub height: u32,
    pub codec_name: String,
}

impl VideoStream {
    pub fn new(width: u32, height: u32, codec_name: impl Into<String>) -> Self {
        Self {
            width,
            height,
            codec_name: codec_name.into(),
        }
    }

    pub fn pixel_area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    Video(VideoStream),
    Audio,
    Other,
}

/// Container and stream metadata for one probed file.
///
/// Always holds at least one video stream; construction fails otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    bit_rate: u64,
    primary: VideoStream,
    streams: Vec<Stream>,
}

impl MediaDescriptor {
    /// Returns `None` when `streams` has no video stream.
    pub fn new(bit_rate: u64, streams: Vec<Stream>) -> Option<Self> {
        let primary = streams.iter().find_map(|s| match s {
            Stream::Video(v) => Some(v.clone()),
            _ => None,
        })?;
        Some(Self {
            bit_rate,
            primary,
            streams,
        })
    }

    /// Shorthand for a single-video-stream descriptor
    pub fn video(width: u32, height: u32, codec_name: &str, bit_rate: u64) -> Self {
        let primary = VideoStream::new(width, height, codec_name);
        Self {
            bit_rate,
            streams: vec![Stream::Video(primary.clone())],
            primary,
        }
    }

    pub fn bit_rate(&self) -> u64 {
        self.bit_rate
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// The first video stream, which is the one used for ranking
    pub fn primary_video(&self) -> &VideoStream {
        &self.primary
    }

    /// Parse the JSON printed by `ffprobe -show_format -show_streams -print_format json`
    pub fn from_ffprobe_json(path: &Path, json: &[u8]) -> Result<Self> {
        let output: FfprobeOutput =
            serde_json::from_slice(json).map_err(|e| Error::probe(path, e))?;

        let bit_rate = output.format.bit_rate.to_u64().ok_or_else(|| {
            Error::probe(path, format!("bit_rate {:?} is not an integer", output.format.bit_rate))
        })?;

        if output.streams.is_empty() {
            return Err(Error::probe(path, "no streams reported"));
        }

        // Only the first video stream is ranked, so only it must carry dimensions
        let mut streams = Vec::with_capacity(output.streams.len());
        let mut seen_video = false;
        for raw in output.streams {
            let stream = match raw.codec_type {
                CodecType::Video => match (raw.width, raw.height) {
                    (Some(width), Some(height)) if width > 0 && height > 0 => {
                        Stream::Video(VideoStream::new(width, height, raw.codec_name.unwrap_or_default()))
                    }
                    _ if seen_video => Stream::Other,
                    _ => return Err(Error::probe(path, "video stream without dimensions")),
                },
                CodecType::Audio => Stream::Audio,
                CodecType::Other => Stream::Other,
            };
            seen_video |= raw.codec_type == CodecType::Video;
            streams.push(stream);
        }

        Self::new(bit_rate, streams).ok_or_else(|| Error::MissingVideoStream(path.to_path_buf()))
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    bit_rate: BitRate,
}

/// ffprobe prints `bit_rate` as a string, other tools as a number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BitRate {
    Number(u64),
    Text(String),
}

impl BitRate {
    fn to_u64(&self) -> Option<u64> {
        match self {
            BitRate::Number(n) => Some(*n),
            BitRate::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: CodecType,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Source of media descriptors. Implementations must be shareable across workers.
pub trait Prober: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor>;
}

/// Runs the external `ffprobe` binary once per file, without retries
#[derive(Debug, Clone)]
pub struct Ffprobe {
    binary: PathBuf,
}

impl Ffprobe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Prober for Ffprobe {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor> {
        debug!("probing {}", path.display());

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams", "-i"])
            .arg(path)
            .output()
            .map_err(|e| Error::probe(path, format!("cannot run {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::probe(
                path,
                format!("{} exited with {}: {}", self.binary.display(), output.status, stderr.trim()),
            ));
        }

        MediaDescriptor::from_ffprobe_json(path, &output.stdout)
    }
}
