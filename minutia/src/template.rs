//! Line-oriented text templates: `x y angle kind` per minutia, with kind
//! `E` for endings and `B` for bifurcations.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use thiserror::Error;

use crate::types::{Minutia, MinutiaKind};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template io: {0}")]
    Io(#[from] io::Error),
    #[error("malformed template line {0}")]
    Malformed(usize),
}

pub fn save_template(path: impl AsRef<Path>, minutiae: &[Minutia]) -> Result<(), TemplateError> {
    let mut out = io::BufWriter::new(fs::File::create(path)?);
    for m in minutiae {
        let kind = match m.kind {
            MinutiaKind::Ending => 'E',
            MinutiaKind::Bifurcation => 'B',
        };
        writeln!(out, "{} {} {:.4} {}", m.x, m.y, m.angle, kind)?;
    }
    Ok(())
}

pub fn load_template(path: impl AsRef<Path>) -> Result<Vec<Minutia>, TemplateError> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);

    let mut minutiae = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let x = parse_field::<i32>(parts.next(), index)?;
        let y = parse_field::<i32>(parts.next(), index)?;
        let angle = parse_field::<f32>(parts.next(), index)?;
        let kind = match parts.next() {
            Some("E") => MinutiaKind::Ending,
            Some("B") => MinutiaKind::Bifurcation,
            _ => return Err(TemplateError::Malformed(index + 1)),
        };
        minutiae.push(Minutia {
            id: minutiae.len().into(),
            y,
            x,
            angle,
            kind,
        });
    }
    Ok(minutiae)
}

fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    line_index: usize,
) -> Result<T, TemplateError> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or(TemplateError::Malformed(line_index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_minutiae() {
        let dir = std::env::temp_dir().join("minutia-template-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("probe.fpt");

        let minutiae = vec![
            Minutia {
                id: 0usize.into(),
                y: 120,
                x: 85,
                angle: 1.2345,
                kind: MinutiaKind::Ending,
            },
            Minutia {
                id: 1usize.into(),
                y: 40,
                x: 230,
                angle: 0.25,
                kind: MinutiaKind::Bifurcation,
            },
        ];
        save_template(&path, &minutiae).unwrap();
        let loaded = load_template(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!((loaded[0].y, loaded[0].x), (120, 85));
        assert_eq!(loaded[0].kind, MinutiaKind::Ending);
        assert!((loaded[0].angle - 1.2345).abs() < 1e-4);
        assert_eq!(loaded[1].kind, MinutiaKind::Bifurcation);
    }

    #[test]
    fn malformed_lines_are_reported_with_their_number() {
        let dir = std::env::temp_dir().join("minutia-template-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.fpt");
        fs::write(&path, "12 15 0.5 E\nnot a line\n").unwrap();

        match load_template(&path) {
            Err(TemplateError::Malformed(line)) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {:?}", other.map(|v| v.len())),
        }
        fs::remove_file(&path).unwrap();
    }
}
