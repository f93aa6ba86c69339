//! A mutable 2D value used for positions, velocities and forces.

/// A point or direction in world units. `y` grows downwards, like the terminal.
#[derive(Debug, Default, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[expect(
    clippy::exhaustive_structs,
    reason = "A 2D vector is never going to grow a third dimension"
)]
pub struct Vector2 {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Vector2 {
    /// Instantiate
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Add another vector to this one in place.
    pub fn add(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }

    /// Subtract another vector from this one in place.
    pub fn subtract(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl core::ops::AddAssign for Vector2 {
    fn add_assign(&mut self, other: Self) {
        self.add(other);
    }
}

impl core::ops::SubAssign for Vector2 {
    fn sub_assign(&mut self, other: Self) {
        self.subtract(other);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_and_subtract_in_place() {
        let mut position = Vector2::new(1.0, 2.0);
        position.add(Vector2::new(0.5, -4.0));
        assert_eq!(position, Vector2::new(1.5, -2.0));

        position.subtract(Vector2::new(1.5, 1.0));
        assert_eq!(position, Vector2::new(0.0, -3.0));
    }

    #[test]
    fn operators_match_methods() {
        let mut velocity = Vector2::zero();
        velocity += Vector2::new(3.0, 4.0);
        velocity -= Vector2::new(1.0, 1.0);
        assert_eq!(velocity, Vector2::new(2.0, 3.0));
    }
}
