use std::collections::HashMap;
use std::path::Path;
use log::{info, warn};
use crate::classifier::{StreamClassifier, StreamDescriptor, StreamKind};
use crate::config::PlannerConfig;
use crate::defaults::DefaultTrackSelector;
use crate::downmix::DownmixPlanner;
use crate::error::Result;
use crate::ffprobe::FFProbeData;
use crate::plan::{
    AudioCodec, AudioPlanEntry, AudioTrack, Disposition, MuxPlan, SubtitleTrack, VideoTrack,
};
use crate::quality::QualityCalculator;
use crate::sorter;
use crate::subtitles::{self, SubtitleFilter};

/// One source file as handed to the compiler
#[derive(Debug, Clone)]
pub struct MediaSource {
    /// File path or other identifier; its file stem becomes the output title
    pub id: String,
    pub probe: Option<FFProbeData>,
    pub is_animation: bool,
    /// Re-encode video; when false the video stream is copied
    pub transcode_video: bool,
}

impl MediaSource {
    pub fn new(id: impl Into<String>, probe: Option<FFProbeData>) -> Self {
        MediaSource {
            id: id.into(),
            probe,
            is_animation: false,
            transcode_video: true,
        }
    }

    pub fn with_animation(mut self, is_animation: bool) -> Self {
        self.is_animation = is_animation;
        self
    }

    pub fn with_transcode_video(mut self, transcode_video: bool) -> Self {
        self.transcode_video = transcode_video;
        self
    }

    /// File name without directory and extension
    pub fn title(&self) -> String {
        Path::new(&self.id)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Compiles probe data into a mux plan
///
/// Holds only configuration; every call works on its own data, so one
/// compiler can serve concurrent callers.
pub struct PlanCompiler {
    config: PlannerConfig,
}

impl PlanCompiler {
    pub fn new(config: PlannerConfig) -> Self {
        PlanCompiler { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Compile a mux plan
    ///
    /// Fails only when the probe data or its stream list is missing or
    /// malformed. Missing audio, subtitles, video or attachments narrow the
    /// plan instead.
    pub fn compile(&self, source: &MediaSource) -> Result<MuxPlan> {
        info!("📋 Compiling mux plan for {}", source.id);

        let streams = StreamClassifier::new().classify(source.probe.as_ref())?;
        let by_index: HashMap<i32, &StreamDescriptor> =
            streams.iter().map(|s| (s.index, s)).collect();

        // Stereo tracks replaced by a downmix never become the default
        let downmix_planner = DownmixPlanner::new(&self.config.downmix);
        let replaced = downmix_planner.replaced_stereo(&streams);
        let audio_candidates: Vec<StreamDescriptor> = streams
            .iter()
            .filter(|s| !replaced.contains(&s.index))
            .cloned()
            .collect();

        // Defaults
        let selector = DefaultTrackSelector::new(&self.config.languages);
        let default_audio = selector.select_audio(&audio_candidates);
        let survivors = SubtitleFilter::new(&self.config.languages).filter(&streams);
        let default_subtitle =
            selector.select_subtitle(&survivors, default_audio.map(|s| s.language.as_str()));

        let default_audio_index = default_audio.map(|s| s.index);
        let default_subtitle_index = default_subtitle.map(|s| s.index);

        // Audio
        let downmix = downmix_planner.plan(&streams, default_audio_index);
        let mut audio_entries = downmix.entries;
        sorter::sort_audio(&mut audio_entries);

        let audio_tracks: Vec<AudioTrack> = audio_entries
            .into_iter()
            .map(|entry| {
                let codec = self.audio_codec(&entry, by_index.get(&entry.source_index).copied());
                let disposition = Disposition {
                    default: entry.is_default_candidate,
                    forced: false,
                };
                AudioTrack { entry, codec, disposition }
            })
            .collect();

        // Subtitles
        let mut subtitle_entries: Vec<_> =
            survivors.iter().map(|s| subtitles::subtitle_entry(s)).collect();
        sorter::sort_subtitles(&mut subtitle_entries);

        let subtitle_tracks = subtitle_entries.into_iter().map(|entry| {
            let disposition = Disposition {
                default: Some(entry.source_index) == default_subtitle_index,
                forced: entry.is_forced,
            };
            SubtitleTrack { entry, disposition }
        });

        let mut builder = MuxPlan::builder()
            .global_arg("-map_metadata:g", "-1")
            .global_arg("-metadata", format!("title={}", source.title()))
            .global_arg("-map_chapters", "0")
            .container(self.config.video.container.clone())
            .audio_tracks(audio_tracks)
            .subtitle_tracks(subtitle_tracks)
            .filter_segments(downmix.segments)
            .default_audio(default_audio_index)
            .default_subtitle(default_subtitle_index);

        // Video: first real video stream, never cover art
        let video = streams
            .iter()
            .find_map(|s| s.video().filter(|v| !v.is_cover_art).map(|v| (s.index, v)));
        match video {
            Some((index, info)) => {
                let encoding = QualityCalculator::new(&self.config.video).select(
                    info,
                    source.is_animation,
                    source.transcode_video,
                );
                builder = builder.video(VideoTrack { source_index: index, encoding });
            }
            None => warn!("No video stream besides cover art, plan carries no video mapping"),
        }

        for stream in streams.iter().filter(|s| matches!(s.kind, StreamKind::Attachment(_))) {
            if stream.mime_type().is_some() {
                builder = builder.attachment(stream.index);
            } else {
                warn!("Skipping attachment stream #{}: no mimetype tag", stream.index);
            }
        }

        let plan = builder.build();
        info!(
            "✅ Plan: {} audio, {} subtitle, {} attachment(s), {} downmix segment(s)",
            plan.audio_tracks.len(),
            plan.subtitle_tracks.len(),
            plan.attachments.len(),
            plan.filter_graph.len()
        );
        Ok(plan)
    }

    /// Generated tracks are always encoded; originals are copied unless
    /// re-encoding is enabled and the codec is not a passthrough codec
    fn audio_codec(&self, entry: &AudioPlanEntry, source: Option<&StreamDescriptor>) -> AudioCodec {
        if entry.is_generated {
            return AudioCodec::Encode {
                codec: self.config.downmix.codec.clone(),
                bitrate_kbps: self.config.downmix.bitrate_kbps,
                channels: None,
            };
        }

        let audio = &self.config.audio;
        let passthrough = source
            .map(|s| audio.passthrough_codecs.contains(&s.codec_name))
            .unwrap_or(false);

        if !audio.reencode_originals || passthrough {
            return AudioCodec::Copy;
        }

        AudioCodec::Encode {
            codec: audio.codec.clone(),
            bitrate_kbps: audio.bitrates.for_channels(entry.channels),
            channels: Some(entry.channels),
        }
    }
}
