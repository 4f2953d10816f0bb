use std::fs::File;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use image::GrayImage;
use structopt::StructOpt;

use sensor::{read_frame, FRAME_COLS, FRAME_ROWS};

/// Capture one frame from the fingerprint sensor
#[derive(StructOpt, Debug)]
struct Options {
    /// Serial port device path, already configured for 57600 baud and a
    /// one-second timeout
    #[structopt(short = "p", long, default_value = "/dev/ttyUSB0")]
    port: PathBuf,

    /// Output bitmap path
    #[structopt(short = "o", long, default_value = "capture.bmp")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opt: Options = Options::from_args();

    let mut port = File::open(&opt.port).context("cannot open serial port")?;
    let frame = read_frame(&mut port).context("capture failed")?;

    match frame {
        Some(frame) => {
            // spread the 4-bit samples over the 8-bit range
            let img = GrayImage::from_fn(frame.cols as u32, frame.rows as u32, |x, y| {
                image::Luma([frame.get(y as usize, x as usize) * 17])
            });
            img.save(&opt.output).context("cannot write bitmap")?;
            println!(
                "captured {}x{} frame into {}",
                FRAME_COLS,
                FRAME_ROWS,
                opt.output.display()
            );
            Ok(())
        }
        None => {
            eprintln!("capture timed out");
            exit(1);
        }
    }
}
