use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use adbreak_player::{PlayerConfig, Playlist, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PlayerConfig::from_env();
    tracing::info!(
        placeholder = %config.plugin.placeholder_url,
        midroll_ms = config.cue_points.midroll_offset_ms,
        speed = config.speed,
        "starting sample player"
    );

    let playlist = match &config.playlist {
        Some(path) => Playlist::load(path)
            .with_context(|| format!("failed to load playlist {}", path.display()))?,
        None => Playlist::sample(),
    };

    let session = Session::new(&config);
    for video in &playlist.videos {
        tracing::info!(video = %video.id, name = %video.name, "playing video");
        session
            .run_video_paced(video, config.speed)
            .await
            .with_context(|| format!("failed to play video {}", video.id))?;
    }

    tracing::info!(
        videos = playlist.videos.len(),
        breaks = session.surfaces().created(),
        "playlist finished"
    );
    Ok(())
}
