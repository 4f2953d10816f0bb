use std::path::PathBuf;

use anyhow::Context;
use ndarray::Array2;
use structopt::StructOpt;

use minutia::image::{gray_from_mask, gray_from_plane, resize_to_rows};
use minutia::{save_template, EnhanceOptions, Fingerprint};

/// Enroll a fingerprint image: run the enhancement pipeline and write the
/// derived products plus a minutiae template
#[derive(StructOpt, Debug)]
struct Options {
    /// Input grayscale image
    input: PathBuf,

    /// Output directory; defaults to the input's directory
    #[structopt(short = "o", long)]
    out_dir: Option<PathBuf>,

    /// Rescale the input to 350 rows before processing
    #[structopt(short = "r", long)]
    resize: bool,

    /// Directory keeping the persisted ring filter bank
    #[structopt(long)]
    bank_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opt: Options = Options::from_args();

    let decoded = image::open(&opt.input).context("cannot open input image")?;
    let mut gray = decoded.to_luma8();
    if opt.resize {
        gray = resize_to_rows(&gray, 350);
    }
    let (w, h) = gray.dimensions();
    let raw = Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
        gray.get_pixel(x as u32, y as u32)[0]
    });

    let fp = Fingerprint::analyze(raw, &EnhanceOptions::default(), opt.bank_dir.as_deref());

    let stem = opt
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("fingerprint")
        .to_owned();
    let out_dir = match opt.out_dir {
        Some(dir) => dir,
        None => opt
            .input
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&out_dir).context("cannot create output directory")?;

    gray_from_plane(&fp.normalized)
        .save(out_dir.join(format!("normalized_{}.bmp", stem)))
        .context("cannot write normalized image")?;
    gray_from_mask(&fp.binary)
        .save(out_dir.join(format!("binary_{}.bmp", stem)))
        .context("cannot write binary image")?;
    gray_from_mask(&fp.skeleton)
        .save(out_dir.join(format!("skeletoned_{}.bmp", stem)))
        .context("cannot write skeleton image")?;
    save_template(out_dir.join(format!("{}.fpt", stem)), &fp.minutiae)
        .context("cannot write template")?;

    println!(
        "{}: {} minutiae, {} core points, quality {:.3}",
        stem,
        fp.minutiae.len(),
        fp.core_points.len(),
        fp.quality
    );
    Ok(())
}
