use serde::Serialize;
use crate::quality::VideoEncoding;

/// Disposition flags of an output track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Disposition {
    pub default: bool,
    pub forced: bool,
}

impl Disposition {
    /// Muxer flag string: flags joined with `+`, or `0` when none apply
    pub fn flags(&self) -> String {
        match (self.default, self.forced) {
            (true, true) => "default+forced".to_string(),
            (true, false) => "default".to_string(),
            (false, true) => "forced".to_string(),
            (false, false) => "0".to_string(),
        }
    }
}

/// Audio track in the output, before codec resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioPlanEntry {
    /// Source stream index (for generated tracks: the stream that was downmixed)
    pub source_index: i32,
    /// Track is a filter-graph output rather than a source stream
    pub is_generated: bool,
    pub language: String,
    pub channels: u32,
    /// `0:<index>` for source streams, `[aud_norm_<index>]` for generated ones
    pub map_label: String,
    pub title: String,
    pub is_default_candidate: bool,
}

/// Codec decision for an audio track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AudioCodec {
    Copy,
    Encode {
        codec: String,
        bitrate_kbps: u32,
        /// Explicit output channel count, when the encoder should be told
        channels: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTrack {
    #[serde(flatten)]
    pub entry: AudioPlanEntry,
    pub codec: AudioCodec,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitlePlanEntry {
    pub source_index: i32,
    pub language: String,
    pub is_forced: bool,
    pub title: String,
}

/// Subtitle tracks are always stream-copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleTrack {
    #[serde(flatten)]
    pub entry: SubtitlePlanEntry,
    pub disposition: Disposition,
}

/// One labelled filter chain of the `-filter_complex` graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGraphSegment {
    pub input_label: String,
    /// Filters in application order
    pub chain: Vec<String>,
    pub output_label: String,
}

impl FilterGraphSegment {
    /// Comma-joined filter chain
    pub fn expression(&self) -> String {
        self.chain.join(",")
    }

    /// `[in]filters[out]` form used inside a filter graph
    pub fn render(&self) -> String {
        format!("[{}]{}[{}]", self.input_label, self.expression(), self.output_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoTrack {
    /// Explicit source index (never a `0:v` wildcard, which would pull in cover art)
    pub source_index: i32,
    pub encoding: VideoEncoding,
}

/// Compiled, immutable mux plan for one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MuxPlan {
    /// Global arguments as ordered flag/value pairs
    pub global_args: Vec<(String, String)>,
    pub video: Option<VideoTrack>,
    /// Output container format
    pub container: String,
    pub audio_tracks: Vec<AudioTrack>,
    pub subtitle_tracks: Vec<SubtitleTrack>,
    /// Attachment stream indices with a usable MIME tag
    pub attachments: Vec<i32>,
    /// Attachment codec/metadata arguments; empty when nothing is attached
    pub attachment_args: Vec<(String, String)>,
    pub filter_graph: Vec<FilterGraphSegment>,
    pub default_audio: Option<i32>,
    pub default_subtitle: Option<i32>,
}

impl MuxPlan {
    pub fn builder() -> MuxPlanBuilder {
        MuxPlanBuilder::default()
    }

    pub fn has_filter_graph(&self) -> bool {
        !self.filter_graph.is_empty()
    }
}

/// Builder for MuxPlan
#[derive(Debug, Default)]
pub struct MuxPlanBuilder {
    global_args: Vec<(String, String)>,
    video: Option<VideoTrack>,
    container: Option<String>,
    audio_tracks: Vec<AudioTrack>,
    subtitle_tracks: Vec<SubtitleTrack>,
    attachments: Vec<i32>,
    filter_graph: Vec<FilterGraphSegment>,
    default_audio: Option<i32>,
    default_subtitle: Option<i32>,
}

impl MuxPlanBuilder {
    /// Append a global flag/value pair.
    pub fn global_arg(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.global_args.push((flag.into(), value.into()));
        self
    }

    /// Set the video mapping.
    pub fn video(mut self, video: VideoTrack) -> Self {
        self.video = Some(video);
        self
    }

    /// Set the output container.
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Append audio tracks in output order.
    pub fn audio_tracks(mut self, tracks: impl IntoIterator<Item = AudioTrack>) -> Self {
        self.audio_tracks.extend(tracks);
        self
    }

    /// Append subtitle tracks in output order.
    pub fn subtitle_tracks(mut self, tracks: impl IntoIterator<Item = SubtitleTrack>) -> Self {
        self.subtitle_tracks.extend(tracks);
        self
    }

    /// Map an attachment stream.
    pub fn attachment(mut self, index: i32) -> Self {
        self.attachments.push(index);
        self
    }

    /// Append filter graph segments.
    pub fn filter_segments(mut self, segments: impl IntoIterator<Item = FilterGraphSegment>) -> Self {
        self.filter_graph.extend(segments);
        self
    }

    pub fn default_audio(mut self, index: Option<i32>) -> Self {
        self.default_audio = index;
        self
    }

    pub fn default_subtitle(mut self, index: Option<i32>) -> Self {
        self.default_subtitle = index;
        self
    }

    /// Build the plan.
    pub fn build(self) -> MuxPlan {
        // Attachment metadata must be copied back explicitly or the global
        // metadata strip removes the MIME tag
        let attachment_args = if self.attachments.is_empty() {
            Vec::new()
        } else {
            vec![
                ("-c:t".to_string(), "copy".to_string()),
                ("-map_metadata:s:t".to_string(), "0:s:t".to_string()),
            ]
        };

        MuxPlan {
            global_args: self.global_args,
            video: self.video,
            container: self.container.unwrap_or_else(|| "matroska".to_string()),
            audio_tracks: self.audio_tracks,
            subtitle_tracks: self.subtitle_tracks,
            attachments: self.attachments,
            attachment_args,
            filter_graph: self.filter_graph,
            default_audio: self.default_audio,
            default_subtitle: self.default_subtitle,
        }
    }
}
