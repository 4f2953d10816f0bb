use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::Context;
use ndarray::Array2;
use structopt::StructOpt;

use minutia::image::resize_to_rows;
use minutia::{
    load_template, match_fingerprints, verdict_message, EnhanceOptions, Fingerprint, MatchMode,
    Verdict,
};

/// Compare two fingerprints; the process exit code is the verdict code
#[derive(StructOpt, Debug)]
struct Options {
    /// Base fingerprint: image file or .fpt template
    base: PathBuf,

    /// Probe fingerprint: image file or .fpt template
    input: PathBuf,

    /// Matching strategy: original, tree, core or combined
    #[structopt(short = "m", long, default_value = "original")]
    mode: MatchMode,

    /// Rescale image inputs to 350 rows before processing
    #[structopt(short = "r", long)]
    resize: bool,

    /// Directory keeping the persisted ring filter bank
    #[structopt(long)]
    bank_dir: Option<PathBuf>,
}

fn load_fingerprint(path: &Path, opt: &Options) -> anyhow::Result<Fingerprint> {
    if path.extension().and_then(|e| e.to_str()) == Some("fpt") {
        let minutiae = load_template(path).context("cannot load template")?;
        return Ok(Fingerprint::from_minutiae(minutiae));
    }

    let decoded = image::open(path).context("cannot open image")?;
    let mut gray = decoded.to_luma8();
    if opt.resize {
        gray = resize_to_rows(&gray, 350);
    }
    let (w, h) = gray.dimensions();
    let raw = Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
        gray.get_pixel(x as u32, y as u32)[0]
    });
    Ok(Fingerprint::analyze(
        raw,
        &EnhanceOptions::default(),
        opt.bank_dir.as_deref(),
    ))
}

fn run(opt: &Options) -> anyhow::Result<Verdict> {
    let base = load_fingerprint(&opt.base, opt)
        .with_context(|| format!("base fingerprint {}", opt.base.display()))?;
    let input = load_fingerprint(&opt.input, opt)
        .with_context(|| format!("probe fingerprint {}", opt.input.display()))?;
    Ok(match_fingerprints(&base, &input, opt.mode))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opt: Options = Options::from_args();

    match run(&opt) {
        Ok(verdict) => {
            println!("{}", verdict_message(verdict));
            exit(verdict.code());
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            exit(-1);
        }
    }
}
