use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: XyzParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count (value: '{value}')")]
    InvalidAtomCount { value: String },
    #[error("Invalid coordinate for axis {axis} (value: '{value}')")]
    InvalidCoordinate { axis: char, value: String },
    #[error("Atom record has fewer than 4 fields")]
    RecordTooShort,
    #[error("File ended early: expected {expected} atom records, found {found}")]
    UnexpectedEof { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub element: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XyzDocument {
    pub comment: String,
    pub atoms: Vec<AtomRecord>,
}

impl XyzDocument {
    pub fn new(comment: impl Into<String>, atoms: Vec<AtomRecord>) -> Self {
        Self {
            comment: comment.into(),
            atoms,
        }
    }

    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, XyzError> {
        let mut lines = reader.lines();

        let count_line = lines.next().transpose()?.unwrap_or_default();
        let expected: usize =
            count_line
                .trim()
                .parse()
                .map_err(|_| XyzError::Parse {
                    line: 1,
                    kind: XyzParseErrorKind::InvalidAtomCount {
                        value: count_line.trim().to_string(),
                    },
                })?;

        let comment = match lines.next().transpose()? {
            Some(line) => line.trim_end().to_string(),
            None if expected == 0 => String::new(),
            None => {
                return Err(XyzError::Parse {
                    line: 2,
                    kind: XyzParseErrorKind::UnexpectedEof {
                        expected,
                        found: 0,
                    },
                });
            }
        };

        let mut atoms = Vec::with_capacity(expected);
        for (offset, line_res) in lines.enumerate() {
            if atoms.len() == expected {
                break;
            }
            let line = line_res?;
            let line_num = offset + 3;
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return Err(XyzError::Parse {
                    line: line_num,
                    kind: XyzParseErrorKind::RecordTooShort,
                });
            }

            let parse_coord = |axis: char, value: &str| -> Result<f64, XyzError> {
                value.parse().map_err(|_| XyzError::Parse {
                    line: line_num,
                    kind: XyzParseErrorKind::InvalidCoordinate {
                        axis,
                        value: value.to_string(),
                    },
                })
            };

            atoms.push(AtomRecord {
                element: parts[0].to_string(),
                x: parse_coord('x', parts[1])?,
                y: parse_coord('y', parts[2])?,
                z: parse_coord('z', parts[3])?,
            });
        }

        if atoms.len() < expected {
            return Err(XyzError::Parse {
                line: atoms.len() + 2,
                kind: XyzParseErrorKind::UnexpectedEof {
                    expected,
                    found: atoms.len(),
                },
            });
        }

        Ok(Self { comment, atoms })
    }

    pub fn read_from_path(path: &Path) -> Result<Self, XyzError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), XyzError> {
        writeln!(writer, "{}", self.atoms.len())?;
        writeln!(writer, "{}", self.comment)?;
        for atom in &self.atoms {
            writeln!(
                writer,
                "{:<2} {:>14.8} {:>14.8} {:>14.8}",
                atom.element, atom.x, atom.y, atom.z
            )?;
        }
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), XyzError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    // Hill-style ordering: carbon, hydrogen, then the rest alphabetically.
    pub fn formula(&self) -> String {
        if self.atoms.is_empty() {
            return "Unknown".to_string();
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for atom in &self.atoms {
            let element = atom.element.trim_end_matches(|c: char| c.is_ascii_digit());
            *counts.entry(element).or_insert(0) += 1;
        }

        let mut parts = Vec::new();
        for element in ["C", "H"] {
            if let Some(count) = counts.remove(element) {
                parts.push(format_element(element, count));
            }
        }
        let mut rest: Vec<_> = counts.into_iter().collect();
        rest.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (element, count) in rest {
            parts.push(format_element(element, count));
        }
        parts.concat()
    }
}

fn format_element(element: &str, count: usize) -> String {
    if count == 1 {
        element.to_string()
    } else {
        format!("{}{}", element, count)
    }
}
