/// Utility function to compute the Euclidean distance between two points.
///
/// # Arguments
///
/// * `a` - A point in 3D space.
/// * `b` - Another point in 3D space.
///
/// # Returns
///
/// The Euclidean distance between the two points.
///
/// Example:
/// ```
/// use depthscale_3d::ops::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 6.0, 3.0];
/// assert_eq!(euclidean_distance(&a, &b), 5.0);
/// ```
pub fn euclidean_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::euclidean_distance;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&[0.0; 3], &[0.0; 3]), 0.0);
        assert_relative_eq!(
            euclidean_distance(&[1.0, 1.0, 1.0], &[0.0, 0.0, 0.0]),
            3f32.sqrt()
        );
        // symmetric
        assert_eq!(
            euclidean_distance(&[1.0, -2.0, 0.5], &[0.0, 4.0, 2.0]),
            euclidean_distance(&[0.0, 4.0, 2.0], &[1.0, -2.0, 0.5])
        );
    }
}
