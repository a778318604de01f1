use anomaly::{CanonicalShape, ClipWindower, Inference, Trainer, dataset};
use base::log;
use std::time::Instant;

const EPOCHS: usize = 20;
const BATCH_SIZE: usize = 8;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_stdout_logger();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <shape.json> <dataset-dir>... <out.safetensors>", args[0]);
        std::process::exit(1);
    }

    let shape = CanonicalShape::from_json_file(&args[1])?;
    let output = &args[args.len() - 1];
    let per_dir = args[2..args.len() - 1]
        .iter()
        .map(dataset::list_sources)
        .collect::<Result<Vec<_>, _>>()?;
    let names = dataset::flatten(per_dir);
    log::info!("{} source videos", names.len());

    let inference = Inference::cpu();
    let windower = ClipWindower::new(shape)?;
    let training_set = dataset::load_training_set(&names, &windower, inference.device())?;

    let clips = training_set.dim(0)?;
    let batches = (0..clips)
        .step_by(BATCH_SIZE)
        .map(|start| training_set.narrow(0, start, BATCH_SIZE.min(clips - start)))
        .collect::<Result<Vec<_>, _>>()?;

    let model = inference.use_autoencoder(&shape.dims())?;
    log::info!(
        "{} parameters, {} batches of up to {BATCH_SIZE}",
        model.parameter_count(),
        batches.len()
    );

    let start = Instant::now();
    let mut trainer = Trainer::new(&model)?;
    let history = trainer.fit(&batches, EPOCHS)?;
    log::info!("trained {} epochs in {:.1?}", history.len(), start.elapsed());

    let evaluation = trainer.evaluate(&training_set)?;
    println!("final loss {:.6}, accuracy {:.4}", evaluation.loss, evaluation.accuracy);

    model.save(output)?;
    Ok(())
}
