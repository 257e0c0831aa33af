//! Command line tool to train a multi-label classifier

use anyhow::anyhow;
use burn::backend::{libtorch::LibTorchDevice, Autodiff, LibTorch};
use burn_text_classifiers::{
    cli::{Architecture, Dataset},
    datasets::{jigsaw, train_valid_split, LoadableDataset},
    models::{cnn, concat, dense, lstm, EmbeddingMatrix},
    pipelines::multi_label::{self, training},
    vocabulary::Vocabulary,
};
use pico_args::Arguments;

type Backend = Autodiff<LibTorch>;

const HELP: &str = "\
Usage: train ARCHITECTURE DATASET [OPTIONS]

Arguments:
  ARCHITECTURE         The architecture to train ('cnn', 'lstm', 'dense' or 'concat')
  DATASET              The dataset to use (e.g., 'jigsaw')

Options:
  -h, --help           Print help
  -e, --embeddings     Pretrained word vectors (defaults to '<data-dir>/embeddings/vectors.vec')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Batch size
  -l, --max-seq-len    Words kept per comment
  -g, --gpus           Number of CUDA devices to train across (defaults to CPU)
  --train-embeds       Update the pretrained embeddings during training
";

#[derive(Debug)]
struct Args {
    architecture: String,
    dataset: String,
    embeddings: Option<String>,
    data_dir: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    max_seq_len: Option<usize>,
    gpus: Option<usize>,
    train_embeds: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            embeddings: pargs.opt_value_from_str(["-e", "--embeddings"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            max_seq_len: pargs.opt_value_from_str(["-l", "--max-seq-len"])?,
            gpus: pargs.opt_value_from_str(["-g", "--gpus"])?,
            train_embeds: pargs.contains("--train-embeds"),
            architecture: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => {
                    anyhow!("Missing required argument: ARCHITECTURE")
                }
                _ => anyhow!("{}", e),
            })?,
            dataset: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: DATASET"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let architecture = Architecture::try_from(args.architecture.as_str())?;
    let dataset = Dataset::try_from(args.dataset.as_str())?;

    let mut config = training::Config::new(
        architecture.to_string(),
        dataset.to_string(),
        dataset.labels(),
    );

    if let Some(num_epochs) = args.num_epochs {
        config.num_epochs = num_epochs;
    }

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    if let Some(max_seq_len) = args.max_seq_len {
        config.max_seq_len = max_seq_len;
    }

    if let Some(gpus) = args.gpus {
        config.gpus = gpus;
    }

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.to_string();
    }

    match dataset {
        Dataset::Jigsaw => handle_jigsaw(architecture, config, &args).await,
    }
}

fn devices(gpus: usize) -> Vec<LibTorchDevice> {
    if gpus == 0 {
        vec![LibTorchDevice::Cpu]
    } else {
        (0..gpus).map(LibTorchDevice::Cuda).collect()
    }
}

async fn handle_jigsaw(
    architecture: Architecture,
    config: training::Config,
    args: &Args,
) -> anyhow::Result<()> {
    let dataset = jigsaw::Dataset::load(&config.data_dir, "train").await?;

    let texts = dataset.texts();
    let vocabulary = Vocabulary::fit(&texts[..], Some(config.max_words));
    log::info!("Fitted a vocabulary of {} words", vocabulary.len());

    let embeddings_path = args
        .embeddings
        .clone()
        .unwrap_or_else(|| format!("{}/embeddings/vectors.vec", config.data_dir));
    let embeddings = EmbeddingMatrix::from_word_vectors(&embeddings_path, &vocabulary).await?;

    let (train, valid) = train_valid_split(dataset, config.valid_fraction, config.seed);

    let devices = devices(config.gpus);
    let device = devices[0].clone();
    let num_classes = config.labels.len();

    let evaluation = match architecture {
        Architecture::Cnn => {
            let model_config = cnn::Config::for_embeddings(&embeddings, num_classes)
                .with_train_embeds(args.train_embeds);
            let model = model_config.init::<Backend>(&embeddings, &device)?;

            multi_label::train::<Backend, _, _, jigsaw::Item, _>(
                devices,
                model,
                &model_config,
                vocabulary,
                train,
                valid,
                config,
            )?
            .1
        }
        Architecture::Lstm => {
            let model_config = lstm::Config::for_embeddings(&embeddings, num_classes)
                .with_train_embeds(args.train_embeds);
            let model = model_config.init::<Backend>(&embeddings, &device)?;

            multi_label::train::<Backend, _, _, jigsaw::Item, _>(
                devices,
                model,
                &model_config,
                vocabulary,
                train,
                valid,
                config,
            )?
            .1
        }
        Architecture::Dense => {
            let model_config = dense::Config::for_embeddings(&embeddings, num_classes)
                .with_train_embeds(args.train_embeds);
            let model = model_config.init::<Backend>(&embeddings, &device)?;

            multi_label::train::<Backend, _, _, jigsaw::Item, _>(
                devices,
                model,
                &model_config,
                vocabulary,
                train,
                valid,
                config,
            )?
            .1
        }
        Architecture::Concat => {
            let model_config = concat::Config::for_embeddings(&embeddings, num_classes)
                .with_train_embeds(args.train_embeds);
            let model = model_config.init::<Backend>(&embeddings, &device)?;

            multi_label::train::<Backend, _, _, jigsaw::Item, _>(
                devices,
                model,
                &model_config,
                vocabulary,
                train,
                valid,
                config,
            )?
            .1
        }
    };

    match evaluation.mean() {
        Some(auc) => println!("Mean validation ROC AUC: {:.4}", auc),
        None => println!("Validation ROC AUC is undefined for every label"),
    }

    Ok(())
}
