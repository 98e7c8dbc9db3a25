use crate::core::models::residue::Residue;
use nalgebra::{Point3, Vector3};

pub fn squared_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Unweighted centroid of a set of points, or `None` for an empty set.
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Point3<f64>> {
    let (sum, count) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, count), p| {
            (sum + p.coords, count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(Point3::from(sum / count as f64))
    }
}

/// Center of mass of a residue, with every atom weighted equally.
///
/// Returns `None` when the residue has no atoms.
pub fn center_of_mass(residue: &Residue) -> Option<Point3<f64>> {
    centroid(residue.atoms().map(|atom| &atom.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    const EPS: f64 = 1e-12;

    #[test]
    fn squared_distance_of_a_point_to_itself_is_zero() {
        let p = Point3::new(-3.2, 7.1, 0.5);
        assert_eq!(squared_distance(&p, &p), 0.0);
    }

    #[test]
    fn distance_is_symmetric_and_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((distance(&a, &b) - 5.0).abs() < EPS);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert!((squared_distance(&a, &b) - 25.0).abs() < EPS);
    }

    #[test]
    fn center_of_mass_is_unweighted_mean_of_atoms() {
        let mut residue = Residue::new("ALA");
        residue.insert_atom(Atom::new("1", "N", Point3::new(0.0, 0.0, 0.0)));
        residue.insert_atom(Atom::new("2", "CA", Point3::new(2.0, 0.0, 0.0)));
        residue.insert_atom(Atom::new("3", "C", Point3::new(1.0, 3.0, 0.0)));

        let com = center_of_mass(&residue).unwrap();
        assert!((com - Point3::new(1.0, 1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn center_of_mass_of_empty_residue_is_none() {
        assert!(center_of_mass(&Residue::new("GLY")).is_none());
    }

    #[test]
    fn centroid_of_single_point_is_that_point() {
        let p = Point3::new(1.5, -2.0, 4.0);
        assert_eq!(centroid([&p]), Some(p));
    }
}
