//! Command line tool to write per-label predictions of a trained classifier

use anyhow::anyhow;
use burn::backend::{libtorch::LibTorchDevice, LibTorch};
use burn_text_classifiers::{
    cli::{Architecture, Dataset},
    datasets::jigsaw,
    models::{cnn, concat, dense, lstm},
    pipelines::multi_label::{self, inference, training, ModelConfig},
    predictions::{save_predictions, PredictionFrame},
    utils::{files::read_file, tensors::to_rows},
};
use pico_args::Arguments;

type Backend = LibTorch;

const HELP: &str = "\
Usage: infer ARCHITECTURE [OPTIONS]

Arguments:
  ARCHITECTURE         The trained architecture to use ('cnn', 'lstm', 'dense' or 'concat')

Options:
  -h, --help           Print help
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -i, --input          A text file with one comment per line (defaults to the dataset's test split)
  -o, --output         Where to write the predictions CSV (defaults to the artifact directory)
  -p, --prefix         Prefix for the prediction column names
  -b, --batch-size     Batch size (defaults to the training batch size)
  -g, --gpu            Run on the first CUDA device
";

#[derive(Debug)]
struct Args {
    /// The architecture to use
    architecture: String,

    data_dir: String,
    input: Option<String>,
    output: Option<String>,
    prefix: Option<String>,
    batch_size: Option<usize>,
    gpu: bool,
}

/// `None` when help was requested
fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let args = Args {
        data_dir: pargs
            .opt_value_from_str(["-d", "--data-dir"])?
            .unwrap_or_else(|| "data".to_string()),
        input: pargs.opt_value_from_str(["-i", "--input"])?,
        output: pargs.opt_value_from_str(["-o", "--output"])?,
        prefix: pargs.opt_value_from_str(["-p", "--prefix"])?,
        batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
        gpu: pargs.contains(["-g", "--gpu"]),
        architecture: pargs.free_from_str()?,
    };

    Ok(Some(args))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = parse_args()? else {
        println!("{}", HELP);
        return Ok(());
    };

    let architecture = Architecture::try_from(args.architecture.as_str())?;
    let artifact_dir = training::artifact_dir(&args.data_dir, &architecture.to_string());

    let device = if args.gpu {
        LibTorchDevice::Cuda(0)
    } else {
        LibTorchDevice::Cpu
    };

    let frame = match architecture {
        Architecture::Cnn => predict::<cnn::Config>(device, &artifact_dir, &args).await?,
        Architecture::Lstm => predict::<lstm::Config>(device, &artifact_dir, &args).await?,
        Architecture::Dense => predict::<dense::Config>(device, &artifact_dir, &args).await?,
        Architecture::Concat => predict::<concat::Config>(device, &artifact_dir, &args).await?,
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| format!("{}/predictions.csv", artifact_dir));

    frame.write_csv(&output)?;

    println!("Wrote {} predictions to {}", frame.len(), output);

    Ok(())
}

/// Ids and texts to classify, from the input file or the dataset's test split
async fn load_inputs(
    args: &Args,
    training: &training::Config,
) -> anyhow::Result<(Vec<String>, Vec<String>)> {
    if let Some(input) = &args.input {
        let texts = read_file(input).await?;
        let ids = (1..=texts.len()).map(|line| line.to_string()).collect();

        return Ok((ids, texts));
    }

    let dataset = Dataset::try_from(training.dataset_name.as_str())?;

    match dataset {
        Dataset::Jigsaw => {
            let comments = jigsaw::load_comments(&args.data_dir, "test")?;

            Ok(comments
                .into_iter()
                .map(|comment| (comment.id, comment.comment_text))
                .unzip())
        }
    }
}

async fn predict<C: ModelConfig>(
    device: LibTorchDevice,
    artifact_dir: &str,
    args: &Args,
) -> anyhow::Result<PredictionFrame> {
    let artifacts = inference::load::<Backend, C>(device, artifact_dir)?;

    let (ids, texts) = load_inputs(args, &artifacts.training).await?;
    if texts.is_empty() {
        return Err(anyhow!("Nothing to classify"));
    }

    log::info!("Classifying {} texts", texts.len());

    let batch_size = args.batch_size.unwrap_or(artifacts.training.batch_size);
    let predictions = multi_label::infer(&artifacts.model, &artifacts.batcher, texts, batch_size)
        .map(to_rows)
        .unwrap_or_default();

    let mut frame = PredictionFrame::new(ids);
    save_predictions(
        &mut frame,
        &predictions,
        &artifacts.training.labels[..],
        args.prefix.as_deref(),
    )?;

    Ok(frame)
}
