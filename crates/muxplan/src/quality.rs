use log::{info, warn};
use serde::Serialize;
use crate::classifier::VideoInfo;
use crate::config::VideoConfig;
use crate::ffprobe::is_hdr_transfer;

/// Frame size assumed when the probe omits width or height
const FALLBACK_WIDTH: i32 = 1920;
const FALLBACK_HEIGHT: i32 = 1080;

/// Pixel-count tier of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionTier {
    /// 4K and above
    Uhd,
    /// 720p-ish up to below 4K
    Hd,
    Sd,
}

/// Colour metadata passed through explicitly for HDR sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorMetadata {
    pub primaries: String,
    pub transfer: String,
    pub space: String,
    pub chroma_location: String,
}

/// Encoding parameters for the selected video stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoEncodeParams {
    pub encoder: String,
    pub crf: u8,
    pub preset: u8,
    pub pixel_format: String,
    pub tier: ResolutionTier,
    pub is_hdr: bool,
    /// Encoder-private parameters, in emission order
    pub encoder_params: Vec<String>,
    /// Flag that carries `encoder_params`; `None` when the encoder takes none
    pub params_flag: Option<String>,
    /// Video filter chain (`-vf`), empty when no filtering applies
    pub filters: Vec<String>,
    pub color: Option<ColorMetadata>,
}

/// What happens to the video stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VideoEncoding {
    Copy,
    Encode(VideoEncodeParams),
}

/// Quality calculator for determining CRF, filters and encoder parameters
pub struct QualityCalculator<'a> {
    config: &'a VideoConfig,
}

impl<'a> QualityCalculator<'a> {
    /// Create a new quality calculator
    pub fn new(config: &'a VideoConfig) -> Self {
        QualityCalculator { config }
    }

    /// Select video handling for a stream; copies when transcoding is off
    pub fn select(&self, video: &VideoInfo, is_animation: bool, transcode: bool) -> VideoEncoding {
        if !transcode {
            info!("🎬 Video: stream copy (transcoding disabled)");
            return VideoEncoding::Copy;
        }

        let params = self.calculate_params(video, is_animation);
        self.log_quality_decisions(&params, is_animation);
        VideoEncoding::Encode(params)
    }

    /// Calculate encoding parameters without logging
    pub fn calculate_params(&self, video: &VideoInfo, is_animation: bool) -> VideoEncodeParams {
        let width = video.width.filter(|w| *w > 0).unwrap_or(FALLBACK_WIDTH);
        let height = video.height.filter(|h| *h > 0).unwrap_or(FALLBACK_HEIGHT);
        let pixel_count = width as u64 * height as u64;

        let is_hdr = is_hdr_transfer(video.color_transfer.as_deref());
        let tier = self.resolution_tier(pixel_count);
        let crf = self.calculate_crf(tier, is_hdr, is_animation);

        let mut encoder_params = self.config.base_encoder_params.clone();
        let mut filters = Vec::new();

        if is_animation {
            // Denoise replaces grain synthesis and sharpening
            encoder_params.push("enable-tf=0".to_string());
            filters.push(self.config.denoise_filter.clone());
        } else if is_hdr {
            encoder_params.push("enable-qm=1".to_string());
            encoder_params.push(format!("film-grain={}", self.film_grain(tier, true)));
            if let Some(sharpen) = &self.config.hdr_sharpen_filter {
                filters.push(sharpen.clone());
            }
        } else {
            encoder_params.push(format!("film-grain={}", self.film_grain(tier, false)));
        }

        let color = is_hdr.then(|| self.color_metadata(video));

        VideoEncodeParams {
            encoder: self.config.encoder.clone(),
            crf,
            preset: self.config.preset,
            pixel_format: self.config.pixel_format.clone(),
            tier,
            is_hdr,
            encoder_params,
            params_flag: self.config.params_flag(),
            filters,
            color,
        }
    }

    fn resolution_tier(&self, pixel_count: u64) -> ResolutionTier {
        let table = &self.config.crf;
        if pixel_count >= table.uhd_min_pixels {
            ResolutionTier::Uhd
        } else if pixel_count >= table.hd_min_pixels {
            ResolutionTier::Hd
        } else {
            ResolutionTier::Sd
        }
    }

    /// CRF from the tier table, lowered for HDR, raised for animation
    fn calculate_crf(&self, tier: ResolutionTier, is_hdr: bool, is_animation: bool) -> u8 {
        let table = &self.config.crf;
        let pair = match tier {
            ResolutionTier::Uhd => table.uhd,
            ResolutionTier::Hd => table.hd,
            ResolutionTier::Sd => table.sd,
        };
        let crf = if is_hdr { pair.hdr } else { pair.sdr };

        if is_animation {
            crf.saturating_add(self.config.animation_crf_offset)
        } else {
            crf
        }
    }

    fn film_grain(&self, tier: ResolutionTier, is_hdr: bool) -> u8 {
        let grain = &self.config.film_grain;
        match (tier, is_hdr) {
            (ResolutionTier::Uhd, true) => grain.uhd_hdr,
            (_, true) => grain.hdr,
            (ResolutionTier::Uhd, false) => grain.uhd_sdr,
            (_, false) => grain.sdr,
        }
    }

    /// Source colour values, falling back to HDR10 defaults per field
    fn color_metadata(&self, video: &VideoInfo) -> ColorMetadata {
        let fallback = &self.config.hdr_fallback;
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != "unknown")
                .unwrap_or(default)
                .to_string()
        };

        ColorMetadata {
            primaries: pick(&video.color_primaries, &fallback.primaries),
            transfer: pick(&video.color_transfer, &fallback.transfer),
            space: pick(&video.color_space, &fallback.space),
            chroma_location: fallback.chroma_location.clone(),
        }
    }

    fn log_quality_decisions(&self, params: &VideoEncodeParams, is_animation: bool) {
        info!(
            "🎯 CRF selection: {} ({:?} tier, hdr={}, animation={})",
            params.crf, params.tier, params.is_hdr, is_animation
        );
        if let Some(color) = &params.color {
            info!(
                "🎨 HDR colour passthrough: primaries={} transfer={} space={}",
                color.primaries, color.transfer, color.space
            );
        }
        if !params.filters.is_empty() {
            info!("🧹 Video filters: {}", params.filters.join(","));
        }
        match &params.params_flag {
            Some(flag) => info!("⚙️  Encoder params ({}): {}", flag, params.encoder_params.join(":")),
            None if !params.encoder_params.is_empty() => warn!(
                "Encoder {} has no params flag, dropping: {}",
                params.encoder,
                params.encoder_params.join(":")
            ),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use proptest::prelude::*;

    fn video_info(width: i32, height: i32, transfer: Option<&str>) -> VideoInfo {
        VideoInfo {
            width: Some(width),
            height: Some(height),
            color_primaries: None,
            color_transfer: transfer.map(str::to_string),
            color_space: None,
            is_cover_art: false,
        }
    }

    fn encode(video: &VideoInfo, is_animation: bool) -> VideoEncodeParams {
        let config = PlannerConfig::default();
        let calculator = QualityCalculator::new(&config.video);
        match calculator.select(video, is_animation, true) {
            VideoEncoding::Encode(params) => params,
            VideoEncoding::Copy => panic!("expected an encode decision"),
        }
    }

    #[test]
    fn test_uhd_hdr_tier_is_below_uhd_sdr() {
        let hdr = encode(&video_info(3840, 2160, Some("smpte2084")), false);
        let sdr = encode(&video_info(3840, 2160, Some("bt709")), false);

        assert_eq!(hdr.tier, ResolutionTier::Uhd);
        assert_eq!(hdr.crf, 21);
        assert_eq!(sdr.crf, 23);
        assert!(hdr.crf < sdr.crf);
    }

    #[test]
    fn test_hdr_color_passthrough_with_fallbacks() {
        let mut video = video_info(3840, 2160, Some("arib-std-b67"));
        video.color_primaries = Some("bt2020".to_string());
        let params = encode(&video, false);

        let color = params.color.unwrap();
        assert_eq!(color.primaries, "bt2020");
        assert_eq!(color.transfer, "arib-std-b67");
        assert_eq!(color.space, "bt2020nc");
        assert_eq!(color.chroma_location, "topleft");
        assert_eq!(params.filters, vec!["cas=0.5".to_string()]);
        assert_eq!(
            params.encoder_params,
            vec!["tune=0", "enable-overlays=1", "scd=1", "enable-qm=1", "film-grain=8"]
        );
    }

    #[test]
    fn test_sdr_has_no_color_metadata() {
        let params = encode(&video_info(1920, 1080, None), false);
        assert_eq!(params.tier, ResolutionTier::Hd);
        assert_eq!(params.crf, 22);
        assert!(params.color.is_none());
        assert!(params.filters.is_empty());
        assert_eq!(params.encoder_params.last().unwrap(), "film-grain=12");
    }

    #[test]
    fn test_missing_dimensions_fall_back_to_hd() {
        let mut video = video_info(0, 0, None);
        video.width = None;
        video.height = None;
        assert_eq!(encode(&video, false).tier, ResolutionTier::Hd);
    }

    #[test]
    fn test_copy_when_transcode_disabled() {
        let config = PlannerConfig::default();
        let calculator = QualityCalculator::new(&config.video);
        let video = video_info(3840, 2160, Some("smpte2084"));
        assert_eq!(calculator.select(&video, true, false), VideoEncoding::Copy);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Animation swaps grain synthesis for denoise and raises CRF by the offset
        #[test]
        fn test_animation_replaces_grain_with_denoise(
            (width, height) in prop_oneof![
                Just((3840, 2160)),
                Just((1920, 1080)),
                Just((720, 576)),
            ],
            hdr in prop::bool::ANY,
        ) {
            let transfer = if hdr { Some("smpte2084") } else { None };
            let video = video_info(width, height, transfer);
            let live = encode(&video, false);
            let anim = encode(&video, true);

            prop_assert_eq!(anim.crf, live.crf + 2);
            prop_assert_eq!(anim.filters.clone(), vec!["hqdn3d=1.5:1.5:3:3".to_string()]);
            prop_assert!(anim.encoder_params.iter().all(|p| !p.starts_with("film-grain")));
            prop_assert!(anim.encoder_params.contains(&"enable-tf=0".to_string()));
            prop_assert_eq!(anim.color.is_some(), hdr);
        }

        /// HDR never selects a higher CRF than SDR at the same resolution
        #[test]
        fn test_hdr_never_worse_than_sdr(width in 320i32..7680, height in 240i32..4320) {
            let hdr = encode(&video_info(width, height, Some("smpte2084")), false);
            let sdr = encode(&video_info(width, height, Some("bt709")), false);
            prop_assert_eq!(hdr.tier, sdr.tier);
            prop_assert!(hdr.crf <= sdr.crf);
        }
    }
}
