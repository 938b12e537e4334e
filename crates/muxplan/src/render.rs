use crate::plan::{AudioCodec, MuxPlan, VideoTrack};
use crate::quality::VideoEncoding;

/// Renders a mux plan into the argument vector ffmpeg expects
pub struct CommandRenderer;

impl CommandRenderer {
    /// Create a new command renderer
    pub fn new() -> Self {
        CommandRenderer
    }

    /// Output arguments for a plan (no input or output file)
    ///
    /// Order: global args, filter graph, video, container, audio, subtitles,
    /// attachments. Audio and subtitle flags use per-output indices.
    pub fn render(&self, plan: &MuxPlan) -> Vec<String> {
        let mut args = Vec::new();

        for (flag, value) in &plan.global_args {
            args.push(flag.clone());
            args.push(value.clone());
        }

        if plan.has_filter_graph() {
            let graph: Vec<String> = plan.filter_graph.iter().map(|s| s.render()).collect();
            args.push("-filter_complex".to_string());
            args.push(graph.join(";"));
        }

        if let Some(video) = &plan.video {
            self.render_video(video, &mut args);
        }
        args.push("-f".to_string());
        args.push(plan.container.clone());

        for (n, track) in plan.audio_tracks.iter().enumerate() {
            args.push("-map".to_string());
            args.push(track.entry.map_label.clone());

            match &track.codec {
                AudioCodec::Copy => {
                    args.push(format!("-c:a:{}", n));
                    args.push("copy".to_string());
                }
                AudioCodec::Encode { codec, bitrate_kbps, channels } => {
                    args.push(format!("-c:a:{}", n));
                    args.push(codec.clone());
                    args.push(format!("-b:a:{}", n));
                    args.push(format!("{}k", bitrate_kbps));
                    if let Some(ch) = channels {
                        args.push(format!("-ac:a:{}", n));
                        args.push(ch.to_string());
                    }
                }
            }

            args.push(format!("-disposition:a:{}", n));
            args.push(track.disposition.flags());
            args.push(format!("-metadata:s:a:{}", n));
            args.push(format!("language={}", track.entry.language));
            args.push(format!("-metadata:s:a:{}", n));
            args.push(format!("title={}", track.entry.title));
        }

        for (n, track) in plan.subtitle_tracks.iter().enumerate() {
            args.push("-map".to_string());
            args.push(format!("0:{}", track.entry.source_index));
            args.push(format!("-c:s:{}", n));
            args.push("copy".to_string());
            args.push(format!("-disposition:s:{}", n));
            args.push(track.disposition.flags());
            args.push(format!("-metadata:s:s:{}", n));
            args.push(format!("language={}", track.entry.language));
            args.push(format!("-metadata:s:s:{}", n));
            args.push(format!("title={}", track.entry.title));
        }

        for index in &plan.attachments {
            args.push("-map".to_string());
            args.push(format!("0:{}", index));
        }
        for (flag, value) in &plan.attachment_args {
            args.push(flag.clone());
            args.push(value.clone());
        }

        args
    }

    fn render_video(&self, video: &VideoTrack, args: &mut Vec<String>) {
        // Explicit index so cover art is never picked up
        args.push("-map".to_string());
        args.push(format!("0:{}", video.source_index));

        let params = match &video.encoding {
            VideoEncoding::Copy => {
                args.push("-c:v".to_string());
                args.push("copy".to_string());
                return;
            }
            VideoEncoding::Encode(params) => params,
        };

        if let Some(color) = &params.color {
            args.push("-color_primaries".to_string());
            args.push(color.primaries.clone());
            args.push("-color_trc".to_string());
            args.push(color.transfer.clone());
            args.push("-colorspace".to_string());
            args.push(color.space.clone());
            args.push("-chroma_sample_location".to_string());
            args.push(color.chroma_location.clone());
        }

        if !params.filters.is_empty() {
            args.push("-vf".to_string());
            args.push(params.filters.join(","));
        }

        args.push("-c:v".to_string());
        args.push(params.encoder.clone());
        args.push("-preset".to_string());
        args.push(params.preset.to_string());
        args.push("-pix_fmt".to_string());
        args.push(params.pixel_format.clone());
        args.push("-crf".to_string());
        args.push(params.crf.to_string());

        if let Some(flag) = &params.params_flag {
            if !params.encoder_params.is_empty() {
                args.push(flag.clone());
                args.push(params.encoder_params.join(":"));
            }
        }
    }
}

/// Quote one argument for a POSIX shell
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_:=./,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Single shell command line from a program and its arguments
pub fn shell_line<I, S>(program: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    std::iter::once(shell_quote(program))
        .chain(args.into_iter().map(|a| shell_quote(a.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{MediaSource, PlanCompiler};
    use crate::config::PlannerConfig;
    use crate::test_support::*;

    fn render(source: MediaSource) -> Vec<String> {
        render_with(source, PlannerConfig::default())
    }

    fn render_with(source: MediaSource, config: PlannerConfig) -> Vec<String> {
        let plan = PlanCompiler::new(config).compile(&source).unwrap();
        CommandRenderer::new().render(&plan)
    }

    fn position(args: &[String], needle: &str) -> usize {
        args.iter().position(|a| a == needle).unwrap()
    }

    #[test]
    fn test_downmix_command_shape() {
        let probe = probe_of(vec![video(0, 1920, 1080), audio(1, "ger", 6), audio(2, "eng", 2)]);
        let args = render(MediaSource::new("/m/Film.mkv", Some(probe)).with_transcode_video(false));

        assert_eq!(&args[..6], &["-map_metadata:g", "-1", "-metadata", "title=Film", "-map_chapters", "0"]);
        assert_eq!(args[6], "-filter_complex");
        assert!(args[7].starts_with("[0:1]pan=stereo|"));
        assert!(args[7].ends_with("alimiter=limit=0.9[aud_norm_1]"));
        assert_eq!(&args[8..14], &["-map", "0:0", "-c:v", "copy", "-f", "matroska"]);

        let expected: Vec<&str> = vec![
            "-map", "0:1", "-c:a:0", "copy", "-disposition:a:0", "default",
            "-metadata:s:a:0", "language=ger", "-metadata:s:a:0", "title=GER 5.1",
            "-map", "[aud_norm_1]", "-c:a:1", "libopus", "-b:a:1", "192k", "-disposition:a:1", "0",
            "-metadata:s:a:1", "language=ger", "-metadata:s:a:1", "title=GER Stereo",
            "-map", "0:2", "-c:a:2", "copy", "-disposition:a:2", "0",
            "-metadata:s:a:2", "language=eng", "-metadata:s:a:2", "title=ENG 2.0",
        ];
        assert_eq!(&args[14..], expected.as_slice());
    }

    #[test]
    fn test_hdr_video_args() {
        let probe = probe_of(vec![hdr_video(0, 3840, 2160)]);
        let args = render(MediaSource::new("hdr.mkv", Some(probe)));

        assert_eq!(args[position(&args, "-color_trc") + 1], "smpte2084");
        assert_eq!(args[position(&args, "-vf") + 1], "cas=0.5");
        assert_eq!(args[position(&args, "-crf") + 1], "21");
        assert_eq!(
            args[position(&args, "-svtav1-params") + 1],
            "tune=0:enable-overlays=1:scd=1:enable-qm=1:film-grain=8"
        );
        assert!(position(&args, "-color_primaries") < position(&args, "-c:v"));
    }

    #[test]
    fn test_encoder_params_follow_configured_encoder() {
        let probe = probe_of(vec![video(0, 1920, 1080)]);
        let source = MediaSource::new("a.mkv", Some(probe)).with_animation(true);

        let mut config = PlannerConfig::default();
        config.video.encoder = "libx265".to_string();
        let args = render_with(source.clone(), config);
        assert_eq!(args[position(&args, "-c:v") + 1], "libx265");
        assert!(args[position(&args, "-x265-params") + 1].ends_with("enable-tf=0"));
        assert!(!args.contains(&"-svtav1-params".to_string()));

        let mut config = PlannerConfig::default();
        config.video.encoder = "hevc_nvenc".to_string();
        let args = render_with(source, config);
        assert_eq!(args[position(&args, "-crf") + 2], "-f");
        assert!(!args.iter().any(|a| a.ends_with("-params")));
    }

    #[test]
    fn test_subtitle_and_attachment_args() {
        let probe = probe_of(vec![pgs(3, "ger", true), attachment(4, Some("font/ttf"))]);
        let args = render(MediaSource::new("s.mkv", Some(probe)));

        assert_eq!(args[position(&args, "-disposition:s:0") + 1], "default+forced");
        assert_eq!(args[position(&args, "-c:t") + 1], "copy");
        assert_eq!(args[position(&args, "-map_metadata:s:t") + 1], "0:s:t");
        assert!(!args.contains(&"-filter_complex".to_string()));
    }

    #[test]
    fn test_shell_quoting() {
        assert_eq!(shell_quote("-c:a:0"), "-c:a:0");
        assert_eq!(shell_quote("title=GER 5.1"), "'title=GER 5.1'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_line("ffmpeg", ["-i", "a b.mkv"]), "ffmpeg -i 'a b.mkv'");
    }
}
