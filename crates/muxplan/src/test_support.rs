//! Raw probe stream fixtures for unit tests

use std::collections::HashMap;
use crate::ffprobe::{FFProbeData, FFProbeFormat, FFProbeStream};

pub fn probe_of(streams: Vec<FFProbeStream>) -> FFProbeData {
    FFProbeData {
        streams: Some(streams),
        format: Some(FFProbeFormat {
            filename: Some("/media/Movies/Test Movie (2020).mkv".to_string()),
            format_name: Some("matroska,webm".to_string()),
            tags: None,
        }),
    }
}

fn tags(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    let map: HashMap<String, String> = pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn disposition(default: bool, forced: bool) -> Option<HashMap<String, i32>> {
    Some(
        [("default", default), ("forced", forced), ("attached_pic", false)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v as i32))
            .collect(),
    )
}

pub fn video(index: i32, width: i32, height: i32) -> FFProbeStream {
    FFProbeStream {
        index,
        codec_type: Some("video".to_string()),
        codec_name: Some("h264".to_string()),
        width: Some(width),
        height: Some(height),
        color_transfer: Some("bt709".to_string()),
        disposition: disposition(true, false),
        ..Default::default()
    }
}

pub fn hdr_video(index: i32, width: i32, height: i32) -> FFProbeStream {
    FFProbeStream {
        codec_name: Some("hevc".to_string()),
        color_transfer: Some("smpte2084".to_string()),
        color_primaries: Some("bt2020".to_string()),
        color_space: Some("bt2020nc".to_string()),
        ..video(index, width, height)
    }
}

pub fn audio(index: i32, language: &str, channels: i32) -> FFProbeStream {
    FFProbeStream {
        index,
        codec_type: Some("audio".to_string()),
        codec_name: Some("ac3".to_string()),
        channels: Some(channels),
        tags: tags(&[("language", language)]),
        disposition: disposition(false, false),
        ..Default::default()
    }
}

pub fn titled_audio(index: i32, language: &str, channels: i32, title: &str) -> FFProbeStream {
    FFProbeStream {
        tags: tags(&[("language", language), ("title", title)]),
        ..audio(index, language, channels)
    }
}

pub fn default_audio(index: i32, language: &str, channels: i32) -> FFProbeStream {
    FFProbeStream {
        disposition: disposition(true, false),
        ..audio(index, language, channels)
    }
}

pub fn subtitle(index: i32, codec: &str, language: &str, forced: bool, title: &str) -> FFProbeStream {
    FFProbeStream {
        index,
        codec_type: Some("subtitle".to_string()),
        codec_name: Some(codec.to_string()),
        tags: tags(&[("language", language), ("title", title)]),
        disposition: disposition(false, forced),
        ..Default::default()
    }
}

pub fn pgs(index: i32, language: &str, forced: bool) -> FFProbeStream {
    subtitle(index, "hdmv_pgs_subtitle", language, forced, "")
}

pub fn srt(index: i32, language: &str, forced: bool) -> FFProbeStream {
    subtitle(index, "subrip", language, forced, "")
}

pub fn attachment(index: i32, mime: Option<&str>) -> FFProbeStream {
    FFProbeStream {
        index,
        codec_type: Some("attachment".to_string()),
        codec_name: Some("ttf".to_string()),
        tags: tags(&[("filename", "font.ttf"), ("mimetype", mime.unwrap_or(""))]),
        ..Default::default()
    }
}

pub fn data_stream(index: i32) -> FFProbeStream {
    FFProbeStream {
        index,
        codec_type: Some("data".to_string()),
        codec_name: Some("bin_data".to_string()),
        ..Default::default()
    }
}
