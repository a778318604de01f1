use anomaly::{AnomalyConfig, Inference, LogSink};
use base::{CancelToken, log};
use std::path::PathBuf;
use video::ImageSequence;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_stdout_logger();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <config.json> <frame-dir> [model.safetensors]", args[0]);
        std::process::exit(1);
    }

    let config = AnomalyConfig::from_json_file(&args[1])?;
    let frame_dir = PathBuf::from(&args[2]);
    let model_path = args.get(3).map(PathBuf::from);
    log::info!(
        "watching {} at {:?}, threshold {}",
        frame_dir.display(),
        config.shape.dims(),
        config.threshold
    );

    let inference = Inference::cpu();
    let mut classifier = inference.use_classifier(&config, model_path.as_deref())?;
    let mut source = ImageSequence::open(&frame_dir)?;

    let cancel = CancelToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Ctrl-C received, stopping");
                cancel.cancel();
            }
        }
    });

    let summary =
        tokio::task::spawn_blocking(move || classifier.run(&mut source, &mut LogSink, &cancel))
            .await??;

    println!(
        "{} frames, {} scored, {} anomalous, {} rejected{}",
        summary.frames,
        summary.scored,
        summary.anomalous,
        summary.rejected,
        if summary.canceled { " (canceled)" } else { "" }
    );
    Ok(())
}
