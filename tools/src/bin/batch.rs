use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::iter::{ParallelBridge, ParallelIterator};
use structopt::StructOpt;

use minutia::{load_template, match_fingerprints, Fingerprint, MatchMode, Verdict};

/// Compare every probe template against every gallery template
#[derive(StructOpt, Debug)]
struct Options {
    /// Directory containing probe .fpt templates
    #[structopt(short = "P", long)]
    probes: PathBuf,

    /// Directory containing gallery .fpt templates
    #[structopt(short = "G", long)]
    galleries: PathBuf,

    /// Matching strategy: original, tree, core or combined
    #[structopt(short = "m", long, default_value = "original")]
    mode: MatchMode,

    /// Number of worker threads
    #[structopt(short = "T", long, default_value = "4")]
    threads: u32,

    /// Print only pairs that matched
    #[structopt(long)]
    only_matches: bool,

    /// Output file; stdout when absent
    #[structopt(short = "o", long)]
    output: Option<PathBuf>,
}

fn template_files(directory: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in std::fs::read_dir(directory).context("cannot read directory")? {
        let entry = entry.context("cannot read entry")?;
        if !entry.metadata().context("cannot read metadata")?.is_file() {
            continue;
        }
        if entry.path().extension().and_then(OsStr::to_str) != Some("fpt") {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

struct Outcome<'data> {
    probe: &'data PathBuf,
    gallery: &'data PathBuf,
    verdict: Verdict,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opt: Options = Options::from_args();

    let probes = template_files(&opt.probes).context("probe directory")?;
    let galleries = template_files(&opt.galleries).context("gallery directory")?;
    anyhow::ensure!(!probes.is_empty(), "no probe templates found");
    anyhow::ensure!(!galleries.is_empty(), "no gallery templates found");

    let cache: HashMap<&Path, Fingerprint> = probes
        .iter()
        .chain(galleries.iter())
        .par_bridge()
        .map(|path| {
            let minutiae = load_template(path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            Ok((path.as_path(), Fingerprint::from_minutiae(minutiae)))
        })
        .collect::<anyhow::Result<_>>()?;
    tracing::info!(
        probes = probes.len(),
        galleries = galleries.len(),
        "templates loaded"
    );

    let output = opt.output.clone();
    let mode = opt.mode;
    let only_matches = opt.only_matches;
    crossbeam::scope(|scope| {
        let (tx_pair, rx_pair) = crossbeam::channel::bounded::<(&PathBuf, &PathBuf)>(1000);
        let (tx_done, rx_done) = crossbeam::channel::unbounded::<Outcome>();

        for _ in 0..opt.threads.max(1) {
            let rx_pair = rx_pair.clone();
            let tx_done = tx_done.clone();
            let cache = &cache;
            scope.spawn(move |_| {
                for (probe, gallery) in rx_pair {
                    let verdict = match_fingerprints(
                        &cache[probe.as_path()],
                        &cache[gallery.as_path()],
                        mode,
                    );
                    if !only_matches || verdict == Verdict::Match {
                        tx_done
                            .send(Outcome {
                                probe,
                                gallery,
                                verdict,
                            })
                            .unwrap();
                    }
                }
            });
        }
        drop(rx_pair);
        drop(tx_done);

        let probes = &probes;
        let galleries = &galleries;
        scope.spawn(move |_| {
            for probe in probes.iter() {
                for gallery in galleries.iter() {
                    tx_pair.send((probe, gallery)).unwrap();
                }
            }
        });

        // single printer keeps the output stream whole
        scope.spawn(move |_| {
            fn print_into_stream(
                output: &mut impl Write,
                rx: crossbeam::channel::Receiver<Outcome>,
            ) -> (usize, usize) {
                let mut compared = 0;
                let mut matched = 0;
                for Outcome {
                    probe,
                    gallery,
                    verdict,
                } in rx
                {
                    compared += 1;
                    if verdict == Verdict::Match {
                        matched += 1;
                    }
                    writeln!(
                        output,
                        "{} {} {}",
                        probe.display(),
                        gallery.display(),
                        verdict.code()
                    )
                    .unwrap();
                }
                (compared, matched)
            }

            let (compared, matched) = if let Some(file) = output.as_ref() {
                let file = std::fs::File::create(file).expect("cannot open output file");
                let mut buff = std::io::BufWriter::new(file);
                print_into_stream(&mut buff, rx_done)
            } else {
                let stdout = std::io::stdout();
                let stdout = stdout.lock();
                let mut buff = std::io::BufWriter::new(stdout);
                print_into_stream(&mut buff, rx_done)
            };
            eprintln!("{} comparisons, {} matches", compared, matched);
        });
    })
    .expect("cannot spawn tasks");

    Ok(())
}
