use crate::core::models::structure::Structure;
use crate::core::models::trajectory::Trajectory;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Raised when an input file does not exist.
#[derive(Debug, Error)]
#[error("File not found: {}", path.display())]
pub struct FileNotFound {
    pub path: PathBuf,
}

/// Defines the interface for reading and writing molecular file formats.
///
/// This trait provides a common API for coordinate file I/O, covering both
/// single conformations and multi-frame trajectories. Implementors handle
/// format-specific parsing and serialization; path-based helpers are provided
/// on top of the reader/writer methods.
pub trait MolecularFile {
    /// Options controlling which records are kept while reading.
    type ReadOptions;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error> + From<FileNotFound>;

    /// Reads a single conformation from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_structure(
        reader: &mut impl BufRead,
        options: &Self::ReadOptions,
    ) -> Result<Structure, Self::Error>;

    /// Reads every frame of a multi-frame file from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_trajectory(
        reader: &mut impl BufRead,
        options: &Self::ReadOptions,
    ) -> Result<Trajectory, Self::Error>;

    /// Writes a single conformation to a writer.
    fn write_structure(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes every frame of a trajectory, in ascending frame order.
    fn write_trajectory(
        trajectory: &Trajectory,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads a single conformation from a file path.
    ///
    /// # Errors
    ///
    /// Returns a [`FileNotFound`]-derived error if the path does not exist, or
    /// any error of [`read_structure`](Self::read_structure).
    fn read_structure_from_path<P: AsRef<Path>>(
        path: P,
        options: &Self::ReadOptions,
    ) -> Result<Structure, Self::Error> {
        let mut reader = open_reader::<Self::Error>(path.as_ref())?;
        Self::read_structure(&mut reader, options)
    }

    /// Reads every frame of a multi-frame file from a file path.
    fn read_trajectory_from_path<P: AsRef<Path>>(
        path: P,
        options: &Self::ReadOptions,
    ) -> Result<Trajectory, Self::Error> {
        let mut reader = open_reader::<Self::Error>(path.as_ref())?;
        Self::read_trajectory(&mut reader, options)
    }

    /// Writes a single conformation to a file path.
    ///
    /// The destination is only replaced once the whole file has been written.
    fn write_structure_to_path<P: AsRef<Path>>(
        structure: &Structure,
        path: P,
    ) -> Result<(), Self::Error> {
        write_atomically(path, |writer| Self::write_structure(structure, writer))
    }

    /// Writes a trajectory to a file path.
    ///
    /// The destination is only replaced once the whole file has been written.
    fn write_trajectory_to_path<P: AsRef<Path>>(
        trajectory: &Trajectory,
        path: P,
    ) -> Result<(), Self::Error> {
        write_atomically(path, |writer| Self::write_trajectory(trajectory, writer))
    }
}

fn open_reader<E>(path: &Path) -> Result<BufReader<File>, E>
where
    E: From<io::Error> + From<FileNotFound>,
{
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FileNotFound {
            path: path.to_path_buf(),
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Writes a file through a temporary sibling and renames it into place.
///
/// If `write` fails, the temporary file is discarded and an existing file at
/// `path` is left untouched.
///
/// # Errors
///
/// Returns the error produced by `write`, or an I/O error if the temporary file
/// cannot be created, flushed or persisted.
pub fn write_atomically<P, E, F>(path: P, write: F) -> Result<(), E>
where
    P: AsRef<Path>,
    E: From<io::Error>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), E>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.persist(path).map_err(io::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn write_atomically_creates_file_with_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_atomically::<_, io::Error, _>(&path, |w| writeln!(w, "hello")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn failed_write_leaves_existing_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "original").unwrap();

        let result = write_atomically::<_, io::Error, _>(&path, |w| {
            write!(w, "partial")?;
            Err(io::Error::other("boom"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn open_reader_reports_missing_file() {
        #[derive(Debug)]
        enum TestError {
            Io,
            NotFound(PathBuf),
        }
        impl From<io::Error> for TestError {
            fn from(_: io::Error) -> Self {
                TestError::Io
            }
        }
        impl From<FileNotFound> for TestError {
            fn from(e: FileNotFound) -> Self {
                TestError::NotFound(e.path)
            }
        }

        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.pdb");
        let result: Result<_, TestError> = open_reader(&missing);
        match result {
            Err(TestError::NotFound(path)) => assert_eq!(path, missing),
            Err(TestError::Io) => panic!("expected NotFound, got Io"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
