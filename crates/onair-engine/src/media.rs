use livekit::options::TrackPublishOptions;
use livekit::prelude::*;
use livekit::track::TrackSource as LkTrackSource;
use livekit::webrtc::prelude::*;
use livekit::webrtc::video_source::native::NativeVideoSource;

use onair_core::engine::EngineError;

/// Default capture resolution.
const VIDEO_WIDTH: u32 = 1280;
const VIDEO_HEIGHT: u32 = 720;

/// Create the source the local preview feeds captured frames into.
pub(crate) fn create_preview_source() -> NativeVideoSource {
    NativeVideoSource::new(
        VideoResolution {
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
        },
        false, // not a screencast
    )
}

/// Publish the camera track for a broadcaster.
pub(crate) async fn publish_camera(
    room: &Room,
    source: NativeVideoSource,
) -> Result<(), EngineError> {
    let track = LocalVideoTrack::create_video_track("camera", RtcVideoSource::Native(source));

    room.local_participant()
        .publish_track(
            LocalTrack::Video(track),
            TrackPublishOptions {
                source: LkTrackSource::Camera,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| EngineError::Join(format!("publish video: {e}")))?;

    tracing::info!("camera track published");
    Ok(())
}
