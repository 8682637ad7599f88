//! Fit both pipelines and write their artifacts.
//!
//! Usage:
//!   diabeto-train --data <csv> [options]
//!   diabeto-train --synthetic <rows> [options]
//!
//! Options:
//!   --data <path>         Training CSV with a header row
//!   --synthetic <n>       Generate n synthetic records instead of reading a CSV
//!   --target <column>     Target column (default: diagnosed_diabetes)
//!   --out-dir <path>      Artifact directory (default: .)
//!   --max-depth <n>       Decision-tree depth limit (default: unlimited)
//!   --valid <fraction>    Held-out fraction for evaluation (default: 0.2)
//!   --seed <n>            Seed for the split and synthetic data (default: 42)
//!   --json                Also write the JSON mirror of each artifact

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rand::prelude::*;

use diabeto::data::{read_labeled_records, LabeledRecords};
use diabeto::logging::init_tracing;
use diabeto::testing::synthetic_records;
use diabeto::training::{Accuracy, Confusion, LogLoss, Metric, TreeParams};
use diabeto::{Pipeline, PipelineKind, TrainConfig};

const USAGE: &str = "diabeto-train\n\n  --data <path>       Training CSV\n  --synthetic <n>     Synthetic rows instead of a CSV\n  --target <column>   Target column (default: diagnosed_diabetes)\n  --out-dir <path>    Artifact directory (default: .)\n  --max-depth <n>     Tree depth limit\n  --valid <fraction>  Held-out fraction (default: 0.2)\n  --seed <n>          Seed (default: 42)\n  --json              Also write JSON mirrors";

#[derive(Debug, Clone)]
struct Args {
    data: Option<PathBuf>,
    synthetic: Option<usize>,
    target: String,
    out_dir: PathBuf,
    max_depth: Option<usize>,
    valid_fraction: f64,
    seed: u64,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        data: None,
        synthetic: None,
        target: "diagnosed_diabetes".to_string(),
        out_dir: PathBuf::from("."),
        max_depth: None,
        valid_fraction: 0.2,
        seed: 42,
        json: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--data" => args.data = Some(PathBuf::from(value()?)),
            "--synthetic" => args.synthetic = Some(value()?.parse().context("--synthetic")?),
            "--target" => args.target = value()?,
            "--out-dir" => args.out_dir = PathBuf::from(value()?),
            "--max-depth" => args.max_depth = Some(value()?.parse().context("--max-depth")?),
            "--valid" => args.valid_fraction = value()?.parse().context("--valid")?,
            "--seed" => args.seed = value()?.parse().context("--seed")?,
            "--json" => args.json = true,
            "--help" | "-h" => {
                eprintln!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument `{other}`\n\n{USAGE}"),
        }
    }

    if args.data.is_some() == args.synthetic.is_some() {
        bail!("exactly one of --data or --synthetic is required\n\n{USAGE}");
    }
    if !(0.0..1.0).contains(&args.valid_fraction) {
        bail!("--valid must be in [0, 1), got {}", args.valid_fraction);
    }
    Ok(args)
}

/// Shuffle with `seed` and split off `valid_fraction` of the records.
fn split(data: LabeledRecords, valid_fraction: f64, seed: u64) -> (LabeledRecords, LabeledRecords) {
    let mut idx: Vec<usize> = (0..data.len()).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_valid = (data.len() as f64 * valid_fraction).round() as usize;

    let take = |indices: &[usize]| LabeledRecords {
        records: indices.iter().map(|&i| data.records[i].clone()).collect(),
        targets: indices.iter().map(|&i| data.targets[i]).collect(),
    };
    (take(&idx[n_valid..]), take(&idx[..n_valid]))
}

fn main() -> Result<()> {
    init_tracing();
    let args = parse_args()?;

    let data = match (&args.data, args.synthetic) {
        (Some(path), _) => read_labeled_records(path, &args.target)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, Some(n)) => {
            let (records, targets) = synthetic_records(n, args.seed);
            LabeledRecords { records, targets }
        }
        (None, None) => bail!("no data source\n\n{USAGE}"),
    };
    if data.is_empty() {
        bail!("no training records");
    }

    let (train, valid) = split(data, args.valid_fraction, args.seed);
    let train_frame = train.to_frame().context("building training frame")?;
    let train_targets = train.targets();
    tracing::info!(n_train = train.len(), n_valid = valid.len(), "split data");

    let config = TrainConfig::builder()
        .tree(TreeParams::builder().maybe_max_depth(args.max_depth).build())
        .build();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for kind in PipelineKind::ALL {
        let pipeline = Pipeline::fit(kind, &train_frame, train_targets.view(), &config)
            .with_context(|| format!("fitting {kind} pipeline"))?;

        if !valid.is_empty() {
            report(&pipeline, &valid)?;
        }

        let path = args.out_dir.join(kind.default_artifact());
        pipeline.save(&path).with_context(|| format!("writing {}", path.display()))?;

        if args.json {
            let json_path = path.with_extension("json");
            let file = File::create(&json_path).with_context(|| format!("creating {}", json_path.display()))?;
            pipeline
                .write_json(BufWriter::new(file))
                .with_context(|| format!("writing {}", json_path.display()))?;
        }
    }
    Ok(())
}

fn report(pipeline: &Pipeline, valid: &LabeledRecords) -> Result<()> {
    let frame = valid.to_frame().context("building validation frame")?;
    let proba = pipeline.predict_proba_frame(&frame)?.to_vec();
    let classes = pipeline.predict_frame(&frame)?.to_vec();

    let predicted: Vec<f64> = classes.iter().map(|&c| f64::from(c)).collect();
    let accuracy = Accuracy::default().compute(&predicted, &valid.targets);
    let logloss = LogLoss.compute(&proba, &valid.targets);
    let confusion = Confusion::from_classes(&classes, &valid.targets);
    tracing::info!(
        kind = %pipeline.kind(),
        accuracy,
        logloss,
        precision = confusion.precision(),
        recall = confusion.recall(),
        "validation"
    );
    Ok(())
}
