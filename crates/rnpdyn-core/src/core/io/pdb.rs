use crate::core::io::traits::{FileNotFound, MolecularFile};
use crate::core::models::atom::Atom;
use crate::core::models::builder::{
    ChainFilter, DuplicateAtomError, DuplicatePolicy, StructureBuilder,
};
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::models::trajectory::{FrameId, Trajectory};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

const ATOM_RECORD: &str = "ATOM";
const FRAME_MARKER: &str = "MODEL";
const FRAME_END: &str = "ENDMDL";

// Every retained ATOM record must reach the end of the z coordinate field.
const MIN_ATOM_RECORD_LEN: usize = 54;

const SERIAL_COLS: (usize, usize) = (6, 11);
const NAME_COLS: (usize, usize) = (12, 16);
const ALT_LOC_COL: usize = 16;
const RES_NAME_COLS: (usize, usize) = (17, 20);
const RES_SEQ_COLS: (usize, usize) = (22, 26);
const X_COLS: (usize, usize) = (30, 38);
const Y_COLS: (usize, usize) = (38, 46);
const Z_COLS: (usize, usize) = (46, 54);
const SEGMENT_COLS: (usize, usize) = (72, 76);
const FRAME_NUMBER_COLS: (usize, usize) = (10, 14);

/// Frame id given to a file that contains ATOM records but no MODEL marker.
pub const IMPLICIT_FRAME_ID: FrameId = 1;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    NotFound(#[from] FileNotFound),
    #[error("Malformed record on line {line}: {kind}")]
    MalformedRecord {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Line {line}: {source}")]
    DuplicateAtom {
        line: usize,
        #[source]
        source: DuplicateAtomError,
    },
    #[error("Value '{value}' does not fit the {width}-column {field} field")]
    FieldOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdbParseErrorKind {
    #[error("ATOM record is {length} characters long, at least {required} are required")]
    LineTooShort { length: usize, required: usize },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Invalid MODEL number (value: '{value}')")]
    InvalidFrameNumber { value: String },
    #[error("Columns {columns} split a multi-byte character")]
    SplitCharacter { columns: String },
}

/// Record filtering applied while reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbReadOptions {
    /// Segment identifiers (columns 73-76) to keep; records of any other
    /// segment are dropped as they are read.
    pub chains: ChainFilter,
    pub duplicate_policy: DuplicatePolicy,
}

impl PdbReadOptions {
    pub fn new<I, S>(chains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chains: chains.into_iter().collect(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Keeps records of every segment.
    pub fn all_chains() -> Self {
        Self {
            chains: ChainFilter::All,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Raw text of a column window, clipped to the line length.
///
/// `None` when a window boundary falls inside a multi-byte character.
fn column(line: &str, (start, end): (usize, usize)) -> Option<&str> {
    let end = end.min(line.len());
    if start >= end {
        return Some("");
    }
    line.get(start..end)
}

fn field(line: &str, line_num: usize, cols: (usize, usize)) -> Result<&str, PdbError> {
    column(line, cols)
        .map(str::trim)
        .ok_or_else(|| PdbError::MalformedRecord {
            line: line_num,
            kind: PdbParseErrorKind::SplitCharacter {
                columns: column_label(cols),
            },
        })
}

fn column_label((start, end): (usize, usize)) -> String {
    format!("{}-{}", start + 1, end)
}

fn is_atom_record(line: &str) -> bool {
    line.get(0..4) == Some(ATOM_RECORD)
}

fn is_frame_marker(line: &str) -> bool {
    line.contains(FRAME_MARKER)
}

fn parse_coordinate(line: &str, line_num: usize, cols: (usize, usize)) -> Result<f64, PdbError> {
    let value = field(line, line_num, cols)?;
    value.parse().map_err(|_| PdbError::MalformedRecord {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: column_label(cols),
            value: value.to_string(),
        },
    })
}

/// Extracts the frame number from a MODEL record.
///
/// The fixed window (columns 11-14) is tried first. Markers that do not start
/// the line, or that separate the number from the keyword with a tab or a
/// single space, fall back to the first token after the keyword.
fn parse_frame_id(line: &str, line_num: usize) -> Result<FrameId, PdbError> {
    if let Some(id) = column(line, FRAME_NUMBER_COLS).and_then(|f| f.trim().parse().ok()) {
        return Ok(id);
    }
    let token = line
        .split_whitespace()
        .skip_while(|t| !t.contains(FRAME_MARKER))
        .nth(1)
        .unwrap_or("");
    token.parse().map_err(|_| PdbError::MalformedRecord {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFrameNumber {
            value: token.to_string(),
        },
    })
}

/// Feeds one line into the builder. Returns whether the line was an ATOM record.
fn parse_record(
    builder: &mut StructureBuilder<'_>,
    line_num: usize,
    line: &str,
) -> Result<bool, PdbError> {
    if !is_atom_record(line) {
        return Ok(false);
    }
    if line.len() < MIN_ATOM_RECORD_LEN {
        return Err(PdbError::MalformedRecord {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort {
                length: line.len(),
                required: MIN_ATOM_RECORD_LEN,
            },
        });
    }

    let alt_loc = column(line, (ALT_LOC_COL, ALT_LOC_COL + 1))
        .and_then(|code| code.chars().next())
        .ok_or_else(|| PdbError::MalformedRecord {
            line: line_num,
            kind: PdbParseErrorKind::SplitCharacter {
                columns: column_label((ALT_LOC_COL, ALT_LOC_COL + 1)),
            },
        })?;
    if !builder.admits_alt_loc(alt_loc) {
        return Ok(true);
    }

    let chain_id = field(line, line_num, SEGMENT_COLS)?;
    if !builder.admits_chain(chain_id) {
        return Ok(true);
    }

    let x = parse_coordinate(line, line_num, X_COLS)?;
    let y = parse_coordinate(line, line_num, Y_COLS)?;
    let z = parse_coordinate(line, line_num, Z_COLS)?;

    let atom = Atom::new(
        field(line, line_num, SERIAL_COLS)?,
        field(line, line_num, NAME_COLS)?,
        Point3::new(x, y, z),
    );
    builder
        .add_atom(
            chain_id,
            field(line, line_num, RES_SEQ_COLS)?,
            field(line, line_num, RES_NAME_COLS)?,
            atom,
        )
        .map_err(|source| PdbError::DuplicateAtom {
            line: line_num,
            source,
        })?;
    Ok(true)
}

fn parse_structure<L: AsRef<str>>(
    lines: impl Iterator<Item = Result<(usize, L), PdbError>>,
    options: &PdbReadOptions,
) -> Result<Structure, PdbError> {
    let mut builder = StructureBuilder::new(&options.chains, options.duplicate_policy);
    for item in lines {
        let (line_num, line) = item?;
        parse_record(&mut builder, line_num, line.as_ref())?;
    }
    Ok(builder.build())
}

fn store_frame(trajectory: &mut Trajectory, id: FrameId, structure: Structure) {
    if trajectory.insert(id, structure).is_some() {
        warn!(frame = id, "MODEL number seen twice; keeping the later frame.");
    }
}

fn parse_trajectory<L: AsRef<str>>(
    lines: impl Iterator<Item = Result<(usize, L), PdbError>>,
    options: &PdbReadOptions,
) -> Result<Trajectory, PdbError> {
    let new_builder = move || StructureBuilder::new(&options.chains, options.duplicate_policy);

    let mut trajectory = Trajectory::new();
    let mut preamble = new_builder();
    let mut preamble_records = 0usize;
    let mut current: Option<(FrameId, StructureBuilder<'_>)> = None;

    for item in lines {
        let (line_num, line) = item?;
        let line = line.as_ref();

        if is_frame_marker(line) {
            let id = parse_frame_id(line, line_num)?;
            if let Some((closed_id, builder)) = current.replace((id, new_builder())) {
                store_frame(&mut trajectory, closed_id, builder.build());
            }
            continue;
        }

        match current.as_mut() {
            Some((_, builder)) => {
                parse_record(builder, line_num, line)?;
            }
            None => {
                if parse_record(&mut preamble, line_num, line)? {
                    preamble_records += 1;
                }
            }
        }
    }

    match current {
        Some((id, builder)) => {
            store_frame(&mut trajectory, id, builder.build());
            if preamble_records > 0 {
                warn!(
                    records = preamble_records,
                    "Discarded ATOM records found before the first MODEL marker."
                );
            }
        }
        None => {
            debug!("No MODEL marker found; reading the whole input as a single frame.");
            store_frame(&mut trajectory, IMPLICIT_FRAME_ID, preamble.build());
        }
    }

    debug!(frames = trajectory.len(), "Trajectory parsed.");
    Ok(trajectory)
}

fn numbered_lines<S: AsRef<str>>(
    lines: &[S],
) -> impl Iterator<Item = Result<(usize, &str), PdbError>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| Ok((i + 1, line.as_ref())))
}

fn check_width<'a>(field: &'static str, value: &'a str, width: usize) -> Result<&'a str, PdbError> {
    if value.len() > width {
        return Err(PdbError::FieldOverflow {
            field,
            value: value.to_string(),
            width,
        });
    }
    Ok(value)
}

fn format_coordinate(value: f64) -> Result<String, PdbError> {
    let text = format!("{:>8.3}", value);
    check_width("coordinate", &text, 8)?;
    Ok(text)
}

// Atom names shorter than four characters start in column 14.
fn format_atom_name(name: &str) -> Result<String, PdbError> {
    let name = check_width("atom name", name, 4)?;
    if name.len() < 4 {
        Ok(format!(" {:<3}", name))
    } else {
        Ok(name.to_string())
    }
}

fn write_atom_line(
    writer: &mut impl Write,
    chain_id: &str,
    residue_id: &str,
    residue: &Residue,
    atom: &Atom,
) -> Result<(), PdbError> {
    let marker = atom.annotation.or(residue.annotation).unwrap_or(0.0);
    writeln!(
        writer,
        "{:<6}{:>5} {}{:1}{:>3} {:1}{:>4}{:1}   {}{}{}{:>6.2}{:>6.2}      {:<4}",
        ATOM_RECORD,
        check_width("serial", &atom.serial, 5)?,
        format_atom_name(&atom.name)?,
        "",
        check_width("residue name", &residue.name, 3)?,
        "",
        check_width("residue sequence", residue_id, 4)?,
        "",
        format_coordinate(atom.position.x)?,
        format_coordinate(atom.position.y)?,
        format_coordinate(atom.position.z)?,
        1.0,
        marker,
        check_width("segment", chain_id, 4)?,
    )?;
    Ok(())
}

fn write_atoms(structure: &Structure, writer: &mut impl Write) -> Result<(), PdbError> {
    for chain in structure.chains() {
        for (residue_id, residue) in chain.residues() {
            for atom in residue.atoms() {
                write_atom_line(writer, &chain.id, residue_id, residue, atom)?;
            }
        }
    }
    Ok(())
}

/// Fixed-column PDB coordinate files restricted to ATOM and MODEL records.
///
/// The domain of each atom is read from the segment identifier (columns 73-76)
/// rather than the single-character chain column.
pub struct PdbFile;

impl PdbFile {
    /// Parses a single conformation from in-memory lines.
    pub fn parse_structure_lines<S: AsRef<str>>(
        lines: &[S],
        options: &PdbReadOptions,
    ) -> Result<Structure, PdbError> {
        parse_structure(numbered_lines(lines), options)
    }

    /// Parses a multi-frame file from in-memory lines.
    pub fn parse_trajectory_lines<S: AsRef<str>>(
        lines: &[S],
        options: &PdbReadOptions,
    ) -> Result<Trajectory, PdbError> {
        parse_trajectory(numbered_lines(lines), options)
    }
}

impl MolecularFile for PdbFile {
    type ReadOptions = PdbReadOptions;
    type Error = PdbError;

    fn read_structure(
        reader: &mut impl BufRead,
        options: &Self::ReadOptions,
    ) -> Result<Structure, Self::Error> {
        let lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l)).map_err(PdbError::from));
        parse_structure(lines, options)
    }

    fn read_trajectory(
        reader: &mut impl BufRead,
        options: &Self::ReadOptions,
    ) -> Result<Trajectory, Self::Error> {
        let lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l)).map_err(PdbError::from));
        parse_trajectory(lines, options)
    }

    fn write_structure(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        write_atoms(structure, writer)?;
        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_trajectory(
        trajectory: &Trajectory,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for (id, structure) in trajectory.frames() {
            let id = id.to_string();
            writeln!(writer, "{:<6}    {:>4}", FRAME_MARKER, check_width("MODEL number", &id, 4)?)?;
            write_atoms(structure, writer)?;
            writeln!(writer, "{}", FRAME_END)?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
