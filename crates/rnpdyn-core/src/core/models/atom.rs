use nalgebra::Point3;

/// Represents a single atom of a parsed structure or trajectory frame.
///
/// The serial identifier is kept as the raw text of the source record so that
/// re-serialized files reproduce the original numbering exactly, including
/// serials that are not plain integers (e.g. hybrid-36 encodings).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial identifier from the source record (columns 7-11).
    pub serial: String,
    /// The name of the atom (e.g., "CA", "N", "P").
    pub name: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Derived per-atom marker written to the B-factor column on export.
    ///
    /// Analysis never reads this value back.
    pub annotation: Option<f64>,
}

impl Atom {
    /// Creates a new `Atom` without an annotation.
    ///
    /// # Arguments
    ///
    /// * `serial` - The serial identifier as found in the source file.
    /// * `name` - The name of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(serial: &str, name: &str, position: Point3<f64>) -> Self {
        Self {
            serial: serial.to_string(),
            name: name.to_string(),
            position,
            annotation: None,
        }
    }
}
