//! Spectral quality index. The power spectrum is integrated over a bank of
//! concentric ring filters; a clean dominant ridge frequency concentrates the
//! energy in few rings and scores high, a flat spectrum scores near zero.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use num_complex::Complex32;
use rustfft::FftPlanner;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of concentric disks; the bank holds one band fewer.
pub const DEFAULT_FILTER_COUNT: usize = 16;

const RADIUS_STEP: f32 = 6.0;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("filter bank io: {0}")]
    Io(#[from] std::io::Error),
    #[error("filter bank holds {found} bands, expected {expected}")]
    BandCount { expected: usize, found: usize },
    #[error("filter bank row {row} does not match {cols} columns")]
    RowShape { row: usize, cols: usize },
}

/// Ring-bandpass filter bank, deterministic per (rows, cols, filters).
pub struct RingBank {
    rows: usize,
    cols: usize,
    bands: Vec<Array2<u8>>,
}

impl RingBank {
    pub fn build(rows: usize, cols: usize, filters: usize) -> RingBank {
        let cy = rows as f32 / 2.0;
        let cx = cols as f32 / 2.0;
        let disk = |radius: f32| {
            Array2::from_shape_fn((rows, cols), |(y, x)| {
                let dy = y as f32 - cy;
                let dx = x as f32 - cx;
                if (dy * dy + dx * dx).sqrt() <= radius {
                    1u8
                } else {
                    0u8
                }
            })
        };

        let mut bands = Vec::with_capacity(filters.saturating_sub(1));
        for i in 0..filters.saturating_sub(1) {
            let inner = disk(RADIUS_STEP + RADIUS_STEP * i as f32);
            let outer = disk(RADIUS_STEP + RADIUS_STEP * (i + 1) as f32);
            bands.push(Array2::from_shape_fn((rows, cols), |idx| {
                outer[idx] & !inner[idx]
            }));
        }
        RingBank { rows, cols, bands }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Writes the bank in the interchange text format: one comma-separated
    /// 0/1 row per line, `#` on its own line after each band. The write is
    /// atomic: a sibling temp file is renamed over the target.
    pub fn save(&self, path: &Path) -> Result<(), BankError> {
        let tmp: PathBuf = path.with_extension("tmp");
        {
            let mut out = std::io::BufWriter::new(fs::File::create(&tmp)?);
            for band in &self.bands {
                for y in 0..self.rows {
                    let line: Vec<&str> = (0..self.cols)
                        .map(|x| if band[[y, x]] != 0 { "1" } else { "0" })
                        .collect();
                    writeln!(out, "{}", line.join(","))?;
                }
                writeln!(out, "#")?;
            }
            out.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Character-by-character reader of the text format: `#` advances the
    /// band, newline advances the row, commas are skipped, digits set cells.
    pub fn load(path: &Path, rows: usize, cols: usize, filters: usize) -> Result<RingBank, BankError> {
        let text = fs::read_to_string(path)?;
        let expected = filters.saturating_sub(1);

        let mut bands = Vec::with_capacity(expected);
        let mut current = Array2::zeros((rows, cols));
        let mut row = 0usize;
        let mut col = 0usize;
        for ch in text.chars() {
            match ch {
                '#' => {
                    bands.push(std::mem::replace(&mut current, Array2::zeros((rows, cols))));
                    row = 0;
                    col = 0;
                }
                '\n' => {
                    if col > 0 {
                        if col != cols {
                            return Err(BankError::RowShape { row, cols });
                        }
                        row += 1;
                    }
                    col = 0;
                }
                ',' => {}
                d if d.is_ascii_digit() => {
                    if row >= rows || col >= cols {
                        return Err(BankError::RowShape { row, cols });
                    }
                    current[[row, col]] = d as u8 - b'0';
                    col += 1;
                }
                _ => {}
            }
        }

        if bands.len() != expected {
            return Err(BankError::BandCount {
                expected,
                found: bands.len(),
            });
        }
        Ok(RingBank { rows, cols, bands })
    }

    /// Reloads a persisted bank when one exists, building (and best-effort
    /// persisting) it otherwise.
    pub fn load_or_build(
        cache_dir: Option<&Path>,
        rows: usize,
        cols: usize,
        filters: usize,
    ) -> RingBank {
        let path = cache_dir
            .map(|dir| dir.join(format!("ringbank_{}x{}_{}.txt", rows, cols, filters)));

        if let Some(path) = path.as_ref() {
            if path.exists() {
                match RingBank::load(path, rows, cols, filters) {
                    Ok(bank) => {
                        debug!(path = %path.display(), "filter bank loaded");
                        return bank;
                    }
                    Err(err) => warn!(%err, "stale filter bank file, rebuilding"),
                }
            }
        }

        let bank = RingBank::build(rows, cols, filters);
        if let Some(path) = path.as_ref() {
            if let Err(err) = bank.save(path) {
                warn!(%err, "cannot persist filter bank");
            }
        }
        bank
    }
}

/// Entropy-based quality scorer over one image geometry. The ring bank is
/// owned by the instance; the cache file is touched at construction only.
pub struct QualityScorer {
    bank: RingBank,
}

impl QualityScorer {
    /// `rows`/`cols` are the *input image* dimensions; the spectrum is padded
    /// to the DFT-friendly power-of-two size per axis.
    pub fn new(rows: usize, cols: usize, cache_dir: Option<&Path>) -> QualityScorer {
        let padded_rows = rows.next_power_of_two();
        let padded_cols = cols.next_power_of_two();
        QualityScorer {
            bank: RingBank::load_or_build(cache_dir, padded_rows, padded_cols, DEFAULT_FILTER_COUNT),
        }
    }

    /// Upper bound of the score scale: log of the band count.
    pub fn max_score(&self) -> f32 {
        (self.bank.band_count() as f32).ln()
    }

    /// Quality in [0, max_score]; higher is better.
    pub fn score(&self, image: &Array2<f32>) -> f32 {
        let (h, w) = image.dim();
        let rows = self.bank.rows();
        let cols = self.bank.cols();
        assert!(h <= rows && w <= cols, "image exceeds scorer geometry");

        // original in the top-left of the padded frame, spectrum centered by
        // alternating the sign per pixel
        let mut data = vec![Complex32::new(0.0, 0.0); rows * cols];
        for y in 0..h {
            for x in 0..w {
                let sign = if (y + x) % 2 == 0 { 1.0 } else { -1.0 };
                data[y * cols + x] = Complex32::new(image[[y, x]] * sign, 0.0);
            }
        }

        let mut planner = FftPlanner::<f32>::new();
        let row_fft = planner.plan_fft_forward(cols);
        for r in 0..rows {
            row_fft.process(&mut data[r * cols..(r + 1) * cols]);
        }
        let col_fft = planner.plan_fft_forward(rows);
        let mut column = vec![Complex32::new(0.0, 0.0); rows];
        for c in 0..cols {
            for r in 0..rows {
                column[r] = data[r * cols + c];
            }
            col_fft.process(&mut column);
            for r in 0..rows {
                data[r * cols + c] = column[r];
            }
        }

        let power: Vec<f32> = data.iter().map(|v| v.norm_sqr()).collect();

        let mut energies = vec![0.0f64; self.bank.band_count()];
        for (i, band) in self.bank.bands.iter().enumerate() {
            let mut acc = 0.0f64;
            for (idx, &b) in band.iter().enumerate() {
                if b != 0 {
                    acc += power[idx] as f64;
                }
            }
            energies[i] = acc;
        }

        let total: f64 = energies.iter().sum();
        if total <= f64::EPSILON {
            return 0.0;
        }

        let mut entropy = 0.0f64;
        for &e in &energies {
            let p = e / total;
            if p > 0.0 {
                entropy -= p * p.ln();
            }
        }

        let quality = self.max_score() - entropy as f32;
        quality.max(0.0).min(self.max_score())
    }
}
