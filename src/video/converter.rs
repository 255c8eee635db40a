use crate::core::error::{ToolError, ToolResult};
use crate::core::request::ConversionRequest;
use crate::core::scale::filter_chain;
use crate::worker::{JobContext, JobOutcome};
use std::ffi::OsString;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Arguments passed to ffmpeg, without the program itself.
pub fn conversion_args(request: &ConversionRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-i".into(),
        request.input.clone().into_os_string(),
        "-y".into(),
        // Keeps the rotation metadata, so the display size matches the request
        "-map_metadata".into(),
        "0".into(),
    ];

    if let Some(pixel_format) = &request.pixel_format {
        args.push("-pix_fmt".into());
        args.push(pixel_format.into());
    }

    let filters = request.scale_plan().filters();
    if !filters.is_empty() {
        args.push("-vf".into());
        args.push(filter_chain(&filters).into());
    }

    args.push(request.output.clone().into_os_string());
    args
}

pub fn conversion_command(ffmpeg: &Path, request: &ConversionRequest) -> Command {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(conversion_args(request));
    cmd
}

/// Printable form of the command line, for the status line and logs.
pub fn describe_command(ffmpeg: &Path, request: &ConversionRequest) -> String {
    let mut parts = vec![ffmpeg.display().to_string()];
    parts.extend(
        conversion_args(request)
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned()),
    );
    parts.join(" ")
}

/// Runs one ffmpeg conversion to completion, failure or cancellation.
pub fn run_conversion(
    ffmpeg: &Path,
    request: &ConversionRequest,
    ctx: &JobContext,
) -> ToolResult<JobOutcome> {
    let command_line = describe_command(ffmpeg, request);
    log::info!("Executing: {}", command_line);
    ctx.status(format!("Conversion command: {}", command_line));

    let mut child = conversion_command(ffmpeg, request)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("failed to capture ffmpeg stderr"))?;

    // stderr must be drained concurrently or ffmpeg blocks on a full pipe
    let duration = request.source_duration;
    let progress_ctx = ctx.clone();
    let stderr_thread = thread::spawn(move || drain_stderr(stderr, duration, &progress_ctx));

    let status = loop {
        if ctx.is_cancelled() {
            log::info!("Conversion cancelled, terminating ffmpeg");
            if let Err(e) = child.kill() {
                log::warn!("Failed to kill ffmpeg: {}", e);
            }
            let _ = child.wait();
            let _ = stderr_thread.join();
            return Ok(JobOutcome::Stopped);
        }

        if let Some(status) = child.try_wait()? {
            break status;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let diagnostics = stderr_thread.join().unwrap_or_default();

    if status.success() {
        log::info!("ffmpeg finished: {}", request.output.display());
        ctx.progress(100);
        Ok(JobOutcome::Completed("Video conversion finished.".to_string()))
    } else if ctx.is_cancelled() {
        Ok(JobOutcome::Stopped)
    } else {
        log::error!("ffmpeg exited with {:?}", status.code());
        Err(ToolError::ToolFailed {
            tool: "ffmpeg".to_string(),
            diagnostics,
        })
    }
}

/// Collects stderr and turns `time=` markers into progress events.
fn drain_stderr(stderr: impl Read, duration: Option<f64>, ctx: &JobContext) -> String {
    let mut reader = BufReader::new(stderr);
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut segment_start = 0;
    let mut last_percent = None;

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                log::warn!("Error reading ffmpeg stderr: {}", e);
                break;
            }
        };
        raw.extend_from_slice(&chunk[..read]);

        // ffmpeg rewrites its status line with '\r', so both count as separators
        while let Some(offset) = raw[segment_start..].iter().position(|&b| b == b'\r' || b == b'\n') {
            let end = segment_start + offset;
            let segment = String::from_utf8_lossy(&raw[segment_start..end]);
            if let (Some(total), Some(position)) = (duration, parse_time_marker(&segment)) {
                let percent = ((position / total) * 100.0).floor().clamp(0.0, 100.0) as u8;
                if last_percent != Some(percent) && !ctx.is_cancelled() {
                    ctx.progress(percent);
                    last_percent = Some(percent);
                }
            }
            segment_start = end + 1;
        }
    }

    String::from_utf8_lossy(&raw).trim_end().to_string()
}

/// Reads the `time=HH:MM:SS.xx` field of an ffmpeg status line.
pub fn parse_time_marker(line: &str) -> Option<f64> {
    let start = line.rfind("time=")? + "time=".len();
    let value = line[start..].split_whitespace().next()?;

    let mut seconds = 0.0;
    for part in value.split(':') {
        let part: f64 = part.parse().ok()?;
        seconds = seconds * 60.0 + part;
    }

    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scale::ScaleMode;
    use std::path::PathBuf;

    fn request(pixel_format: Option<&str>, mode: ScaleMode) -> ConversionRequest {
        ConversionRequest {
            input: PathBuf::from("in.mov"),
            output: PathBuf::from("out/in_converted.mp4"),
            format: "mp4".to_string(),
            pixel_format: pixel_format.map(str::to_string),
            width: 1279,
            height: 720,
            scale_mode: mode,
            rotation: 0,
            source_duration: None,
        }
    }

    fn args_of(request: &ConversionRequest) -> Vec<String> {
        conversion_args(request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_args_with_pixel_format_and_exact_scale() {
        let args = args_of(&request(Some("yuv420p"), ScaleMode::Exact));
        assert_eq!(
            args,
            [
                "-i", "in.mov", "-y", "-map_metadata", "0", "-pix_fmt", "yuv420p", "-vf",
                "scale=1280:720", "out/in_converted.mp4"
            ]
        );
    }

    #[test]
    fn test_args_keep_original_pixel_format() {
        let args = args_of(&request(None, ScaleMode::AspectPad));
        assert!(!args.contains(&"-pix_fmt".to_string()));
        assert_eq!(args[5], "-vf");
        assert_eq!(
            args[6],
            "scale=1280:720:force_original_aspect_ratio=decrease,scale=trunc(iw/2)*2:trunc(ih/2)*2,pad=1280:720:-1:-1:black"
        );
    }

    #[test]
    fn test_args_without_resolution() {
        let mut req = request(None, ScaleMode::Exact);
        req.width = 0;
        let args = args_of(&req);
        assert_eq!(args, ["-i", "in.mov", "-y", "-map_metadata", "0", "out/in_converted.mp4"]);
    }

    #[test]
    fn test_describe_command() {
        let line = describe_command(Path::new("ffmpeg"), &request(None, ScaleMode::Exact));
        assert!(line.starts_with("ffmpeg -i in.mov -y -map_metadata 0"));
        assert!(line.ends_with("out/in_converted.mp4"));
    }

    #[test]
    fn test_parse_time_marker() {
        let line = "frame=  120 fps= 30 q=28.0 size=     512kB time=00:00:04.00 bitrate=1048.6kbits/s speed=1.0x";
        assert_eq!(parse_time_marker(line), Some(4.0));
        assert_eq!(parse_time_marker("time=01:02:03.50 x"), Some(3723.5));
        assert_eq!(parse_time_marker("time=N/A bitrate=N/A"), None);
        assert_eq!(parse_time_marker("Stream mapping:"), None);
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use crate::worker::{Worker, WorkerEvent, WorkerState};
        use std::os::unix::fs::PermissionsExt;

        fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn run(ffmpeg: PathBuf, request: ConversionRequest) -> Worker {
            Worker::spawn("test-convert", move |ctx| run_conversion(&ffmpeg, &request, ctx)).unwrap()
        }

        #[test]
        fn test_successful_conversion() {
            let dir = tempfile::tempdir().unwrap();
            let ffmpeg = fake_ffmpeg(dir.path(), "exit 0");

            let mut worker = run(ffmpeg, request(None, ScaleMode::AspectFit));
            let events = worker.wait();

            assert!(matches!(&events[0], WorkerEvent::Status(s) if s.starts_with("Conversion command: ")));
            assert_eq!(events.last(), Some(&WorkerEvent::Completed("Video conversion finished.".to_string())));
            assert_eq!(worker.state(), WorkerState::Completed);
        }

        #[test]
        fn test_failure_surfaces_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let ffmpeg = fake_ffmpeg(dir.path(), "echo \"Unknown encoder 'libfoo'\" >&2\nexit 1");

            let mut worker = run(ffmpeg, request(None, ScaleMode::Exact));
            let events = worker.wait();

            assert_eq!(
                events.last(),
                Some(&WorkerEvent::Failed("ffmpeg failed: Unknown encoder 'libfoo'".to_string()))
            );
            assert_eq!(worker.state(), WorkerState::Failed);
        }

        #[test]
        fn test_progress_from_time_markers() {
            let dir = tempfile::tempdir().unwrap();
            let ffmpeg = fake_ffmpeg(
                dir.path(),
                "printf 'frame=1 time=00:00:02.50 bitrate=1\\rframe=2 time=00:00:05.00 bitrate=1\\r' >&2\nexit 0",
            );

            let mut req = request(None, ScaleMode::Exact);
            req.source_duration = Some(10.0);
            let mut worker = run(ffmpeg, req);
            let events = worker.wait();

            let progress: Vec<u8> = events
                .iter()
                .filter_map(|e| match e {
                    WorkerEvent::Progress(p) => Some(*p),
                    _ => None,
                })
                .collect();
            assert_eq!(progress, vec![25, 50, 100]);
        }

        #[test]
        fn test_missing_tool_fails() {
            let mut worker = run(
                PathBuf::from("/definitely/not/ffmpeg"),
                request(None, ScaleMode::Exact),
            );
            let events = worker.wait();
            assert!(matches!(events.last(), Some(WorkerEvent::Failed(_))));
        }

        #[test]
        fn test_stop_terminates_process() {
            let dir = tempfile::tempdir().unwrap();
            let ffmpeg = fake_ffmpeg(dir.path(), "exec sleep 30");

            let mut worker = run(ffmpeg, request(None, ScaleMode::Exact));
            std::thread::sleep(Duration::from_millis(200));

            let started = std::time::Instant::now();
            let events = worker.stop();

            assert!(started.elapsed() < Duration::from_secs(10));
            assert_eq!(events.last(), Some(&WorkerEvent::Stopped));
            assert!(!events.iter().any(|e| matches!(e, WorkerEvent::Completed(_) | WorkerEvent::Failed(_))));
            assert_eq!(worker.state(), WorkerState::Stopped);
        }
    }
}
