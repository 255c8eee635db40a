use crate::core::error::ToolResult;
use crate::core::request::ExtractionRequest;
use crate::core::sampling::{frame_filename, progress_percent, SamplingPolicy};
use crate::video::frames::{save_jpeg, FfmpegFrameSource, FrameSource};
use crate::worker::{JobContext, JobOutcome, WorkerEvent};
use std::path::Path;

/// Creates the output directory, opens the video with ffmpeg and runs the
/// sampling loop.
pub fn run_extraction(
    ffmpeg: &Path,
    ffprobe: &Path,
    request: &ExtractionRequest,
    jpeg_quality: u8,
    ctx: &JobContext,
) -> ToolResult<JobOutcome> {
    if !request.output_dir.exists() {
        log::info!("Creating output directory {}", request.output_dir.display());
        std::fs::create_dir_all(&request.output_dir)?;
    }

    let mut source = FfmpegFrameSource::open(ffmpeg, ffprobe, &request.video)?;
    extract_frames(&mut source, request, jpeg_quality, ctx)
}

/// Reads `source` to the end, saving every frame the sampling policy keeps.
///
/// Cancellation is checked before each read. Frames already written stay on disk.
pub fn extract_frames<S: FrameSource>(
    source: &mut S,
    request: &ExtractionRequest,
    jpeg_quality: u8,
    ctx: &JobContext,
) -> ToolResult<JobOutcome> {
    let policy = SamplingPolicy::new(request.extract_all, source.frame_rate(), request.target_fps);
    let total_frames = source.frame_count().unwrap_or(0);

    log::info!(
        "Extracting from {}: interval {} frames (source {:.3} fps, target {} fps, {}s spacing requested, extract all: {})",
        request.video.display(),
        policy.interval(),
        source.frame_rate(),
        request.target_fps,
        request.interval_secs,
        request.extract_all
    );

    let mut frames_read: u64 = 0;
    let mut saved: u64 = 0;

    loop {
        if ctx.is_cancelled() {
            log::info!("Extraction cancelled after {} frames ({} saved)", frames_read, saved);
            return Ok(JobOutcome::Stopped);
        }

        let frame = match source.next_frame()? {
            Some(frame) => frame,
            None => break,
        };

        if policy.keeps(frames_read) {
            let filename = frame_filename(saved);
            save_jpeg(&frame, &request.output_dir.join(&filename), jpeg_quality)?;
            saved += 1;
            ctx.emit(WorkerEvent::FrameSaved {
                count: saved,
                filename,
            });
        }

        frames_read += 1;
        if let Some(percent) = progress_percent(frames_read, total_frames) {
            ctx.progress(percent);
        }
    }

    log::info!("Extraction finished: {} of {} frames saved", saved, frames_read);
    Ok(JobOutcome::Completed(format!(
        "Extraction finished: {} frames saved.",
        saved
    )))
}
