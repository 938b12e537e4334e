use std::collections::HashSet;
use log::{debug, warn};
use serde::Serialize;
use crate::error::{PlanError, Result};
use crate::ffprobe::{FFProbeData, FFProbeStream};
use crate::language;

/// Tag keys that may carry an attachment's MIME type
const MIME_TAG_KEYS: &[&str] = &["mimetype", "Content-Type"];

/// Image-based subtitle codecs (PGS)
const IMAGE_SUBTITLE_CODECS: &[&str] = &["hdmv_pgs_subtitle", "pgssub"];

/// Text-based subtitle codecs (SRT)
const TEXT_SUBTITLE_CODECS: &[&str] = &["subrip", "srt"];

/// Rendering family of a subtitle codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubtitleFormat {
    /// Bitmap subtitles (PGS); authoritative in dedup
    Image,
    /// SRT/subrip
    Text,
    /// Anything else (ASS, VobSub, WebVTT...); never deduplicated
    Other,
}

impl SubtitleFormat {
    fn from_codec(codec: &str) -> Self {
        if IMAGE_SUBTITLE_CODECS.contains(&codec) {
            SubtitleFormat::Image
        } else if TEXT_SUBTITLE_CODECS.contains(&codec) {
            SubtitleFormat::Text
        } else {
            SubtitleFormat::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoInfo {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub color_primaries: Option<String>,
    pub color_transfer: Option<String>,
    pub color_space: Option<String>,
    /// Embedded cover image (`attached_pic`), not a real video track
    pub is_cover_art: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioInfo {
    pub channels: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubtitleInfo {
    pub format: SubtitleFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentInfo {
    pub mime_type: Option<String>,
}

/// Kind-specific stream fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StreamKind {
    Video(VideoInfo),
    Audio(AudioInfo),
    Subtitle(SubtitleInfo),
    Attachment(AttachmentInfo),
}

/// Normalized, immutable view of one probed stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    /// Stream index in the source container
    pub index: i32,
    /// Lowercased codec name, empty when the probe did not report one
    pub codec_name: String,
    /// Lowercased language code, "und" when untagged
    pub language: String,
    /// Source title, empty when untagged
    pub title: String,
    pub is_forced: bool,
    pub is_default: bool,
    pub kind: StreamKind,
}

impl StreamDescriptor {
    pub fn is_audio(&self) -> bool {
        matches!(self.kind, StreamKind::Audio(_))
    }

    pub fn is_subtitle(&self) -> bool {
        matches!(self.kind, StreamKind::Subtitle(_))
    }

    /// Channel count for audio streams
    pub fn channels(&self) -> Option<u32> {
        match self.kind {
            StreamKind::Audio(info) => Some(info.channels),
            _ => None,
        }
    }

    pub fn video(&self) -> Option<&VideoInfo> {
        match &self.kind {
            StreamKind::Video(info) => Some(info),
            _ => None,
        }
    }

    pub fn subtitle_format(&self) -> Option<SubtitleFormat> {
        match self.kind {
            StreamKind::Subtitle(info) => Some(info.format),
            _ => None,
        }
    }

    /// MIME type of an attachment, if it carries a usable one
    pub fn mime_type(&self) -> Option<&str> {
        match &self.kind {
            StreamKind::Attachment(info) => info.mime_type.as_deref(),
            _ => None,
        }
    }

    /// Case-insensitive check against the source title
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
    }
}

/// Stream classifier turning raw probe records into typed descriptors
pub struct StreamClassifier;

impl StreamClassifier {
    /// Create a new stream classifier
    pub fn new() -> Self {
        StreamClassifier
    }

    /// Classify every stream of a probe report, preserving container order
    ///
    /// Fails when the probe data or its stream list is absent, or when stream
    /// indices are negative or repeated. Streams of other types (data, unknown)
    /// are skipped.
    pub fn classify(&self, probe: Option<&FFProbeData>) -> Result<Vec<StreamDescriptor>> {
        let probe = probe
            .ok_or_else(|| PlanError::InvalidInput("file has not been probed".to_string()))?;
        let streams = probe
            .streams
            .as_ref()
            .ok_or_else(|| PlanError::InvalidInput("probe data has no stream list".to_string()))?;

        let mut seen = HashSet::new();
        let mut descriptors = Vec::with_capacity(streams.len());

        for stream in streams {
            if stream.index < 0 {
                return Err(PlanError::InvalidInput(format!(
                    "negative stream index {}",
                    stream.index
                )));
            }
            if !seen.insert(stream.index) {
                return Err(PlanError::InvalidInput(format!(
                    "duplicate stream index {}",
                    stream.index
                )));
            }

            match self.classify_stream(stream) {
                Some(descriptor) => {
                    debug!(
                        "Stream #{}: {:?} codec={} lang={} forced={} default={}",
                        descriptor.index,
                        descriptor.kind,
                        descriptor.codec_name,
                        descriptor.language,
                        descriptor.is_forced,
                        descriptor.is_default
                    );
                    descriptors.push(descriptor);
                }
                None => {
                    warn!(
                        "Stream #{}: ignoring stream of type {:?}",
                        stream.index, stream.codec_type
                    );
                }
            }
        }

        Ok(descriptors)
    }

    fn classify_stream(&self, stream: &FFProbeStream) -> Option<StreamDescriptor> {
        let codec_name = stream
            .codec_name
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        let kind = match stream.codec_type.as_deref()? {
            "video" => StreamKind::Video(VideoInfo {
                width: stream.width,
                height: stream.height,
                color_primaries: stream.color_primaries.clone(),
                color_transfer: stream.color_transfer.clone(),
                color_space: stream.color_space.clone(),
                is_cover_art: stream.has_disposition("attached_pic"),
            }),
            "audio" => StreamKind::Audio(AudioInfo {
                channels: stream
                    .channels
                    .filter(|c| *c > 0)
                    .map(|c| c as u32)
                    .unwrap_or(2),
            }),
            "subtitle" => StreamKind::Subtitle(SubtitleInfo {
                format: SubtitleFormat::from_codec(&codec_name),
            }),
            "attachment" => StreamKind::Attachment(AttachmentInfo {
                mime_type: MIME_TAG_KEYS
                    .iter()
                    .filter_map(|key| stream.tag(key))
                    .map(str::trim)
                    .find(|mime| !mime.is_empty())
                    .map(str::to_string),
            }),
            _ => return None,
        };

        let title = stream.tag("title").unwrap_or("").to_string();

        // Title "forced" is a fallback: it can add the flag, never clear it
        let is_forced = stream.has_disposition("forced") || title.to_lowercase().contains("forced");

        Some(StreamDescriptor {
            index: stream.index,
            codec_name,
            language: language::normalize(stream.tag("language")),
            title,
            is_forced,
            is_default: stream.has_disposition("default"),
            kind,
        })
    }
}

/// Keyword heuristic for animated content, matched against the file path
pub fn detect_animation(path: &str, keywords: &[String]) -> bool {
    let path = path.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| path.contains(&k.to_lowercase()))
}
