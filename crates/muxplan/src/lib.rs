pub mod error;
pub mod config;
pub mod ffprobe;
pub mod language;
pub mod classifier;
pub mod defaults;
pub mod subtitles;
pub mod downmix;
pub mod sorter;
pub mod quality;
pub mod plan;
pub mod assembler;
pub mod render;

#[cfg(test)]
mod test_support;

pub use error::{PlanError, Result};
pub use config::PlannerConfig;
pub use ffprobe::{FFProbeData, FFProbeFormat, FFProbeStream};
pub use classifier::{detect_animation, StreamClassifier, StreamDescriptor, StreamKind};
pub use plan::{AudioCodec, AudioTrack, Disposition, FilterGraphSegment, MuxPlan, SubtitleTrack};
pub use quality::VideoEncoding;
pub use assembler::{MediaSource, PlanCompiler};
pub use render::CommandRenderer;
