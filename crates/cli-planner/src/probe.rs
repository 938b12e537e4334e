use std::path::Path;
use anyhow::{anyhow, Context, Result};
use log::debug;
use muxplan::FFProbeData;
use tokio::process::Command;

/// Whether the input is a saved ffprobe report rather than a media file
pub fn is_probe_report(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Load probe data from a saved report or by running ffprobe on a media file
pub async fn load_probe(input: &Path, ffprobe_bin: &Path) -> Result<FFProbeData> {
    let json = if is_probe_report(input) {
        debug!("Reading probe report: {}", input.display());
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read probe report: {}", input.display()))?
    } else {
        execute_ffprobe(ffprobe_bin, input).await?
    };

    FFProbeData::from_json(&json)
        .with_context(|| format!("Failed to parse ffprobe JSON for: {}", input.display()))
}

/// Run ffprobe and capture its JSON report
pub async fn execute_ffprobe(ffprobe_bin: &Path, file_path: &Path) -> Result<String> {
    if !file_path.exists() {
        return Err(anyhow!("File does not exist: {}", file_path.display()));
    }

    debug!("Executing FFprobe for: {}", file_path.display());

    let output = Command::new(ffprobe_bin)
        .arg("-v")
        .arg("error")
        .arg("-print_format")
        .arg("json")
        .arg("-show_streams")
        .arg("-show_format")
        .arg(file_path)
        .output()
        .await
        .with_context(|| format!(
            "Failed to execute FFprobe for: {}. Ensure FFprobe is installed and accessible at: {}",
            file_path.display(),
            ffprobe_bin.display()
        ))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);

        return Err(anyhow!(
            "FFprobe failed (exit code {}) for {}:\nSTDERR: {}",
            exit_code,
            file_path.display(),
            stderr
        ));
    }

    String::from_utf8(output.stdout).context("FFprobe output is not valid UTF-8")
}
