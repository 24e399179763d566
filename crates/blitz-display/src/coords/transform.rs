use std::ops::{Mul, MulAssign};

/// 4x4 homogeneous transform, stored column-major.
///
/// Composition order is fixed: `a * b` applies `b` first, then `a`.
/// The in-place builders ([`translate`](Self::translate), [`scale`](Self::scale))
/// post-multiply, so the operation issued last is the first one applied to a
/// point. This matches the classic GL matrix-stack convention:
///
/// ```
/// use blitz_display::coords::Transform;
///
/// let mut m = Transform::identity();
/// m.translate(10.0, 0.0, 0.0);
/// m.scale(2.0, 2.0, 1.0);
/// // scale first, then translate
/// assert_eq!(m.transform_point(1.0, 1.0), (12.0, 2.0));
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    m: [f32; 16],
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            m: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    #[inline]
    pub const fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        let mut t = Self::identity();
        t.m[12] = dx;
        t.m[13] = dy;
        t.m[14] = dz;
        t
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32, sz: f32) -> Self {
        let mut t = Self::identity();
        t.m[0] = sx;
        t.m[5] = sy;
        t.m[10] = sz;
        t
    }

    /// Restores the identity.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::identity();
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// `self = self * translation(dx, dy, dz)`.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) -> &mut Self {
        *self = *self * Self::translation(dx, dy, dz);
        self
    }

    /// `self = self * scaling(sx, sy, sz)`.
    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        *self = *self * Self::scaling(sx, sy, sz);
        self
    }

    /// Column-major values, ready for a `mat4` uniform upload.
    #[inline]
    pub const fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    #[inline]
    pub fn as_cols(&self) -> &[f32; 16] {
        &self.m
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    /// Applies the transform to the point `(x, y, 0, 1)` and drops `z`/`w`.
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let px = self.m[0] * x + self.m[4] * y + self.m[12];
        let py = self.m[1] * x + self.m[5] * y + self.m[13];
        (px, py)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += a[k * 4 + row] * b[col * 4 + k];
                }
                out[col * 4 + row] = acc;
            }
        }
        Transform { m: out }
    }
}

impl MulAssign for Transform {
    #[inline]
    fn mul_assign(&mut self, rhs: Transform) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── identity ──────────────────────────────────────────────────────────

    #[test]
    fn identity_is_neutral_on_both_sides() {
        let mut t = Transform::identity();
        t.translate(3.0, -2.0, 1.0).scale(4.0, 5.0, 1.0);
        assert_eq!(Transform::identity() * t, t);
        assert_eq!(t * Transform::identity(), t);
    }

    #[test]
    fn reset_restores_identity() {
        let mut t = Transform::translation(1.0, 2.0, 3.0);
        t.scale(2.0, 2.0, 2.0);
        assert!(!t.is_identity());
        t.reset();
        assert!(t.is_identity());
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn translation_lives_in_last_column() {
        let t = Transform::translation(7.0, 8.0, 9.0);
        let cols = t.to_cols_array();
        assert_eq!(&cols[12..15], &[7.0, 8.0, 9.0]);
        assert_eq!(t.get(0, 3), 7.0);
        assert_eq!(t.get(1, 3), 8.0);
        assert_eq!(t.get(2, 3), 9.0);
    }

    // ── composition order ─────────────────────────────────────────────────

    #[test]
    fn mul_applies_right_hand_side_first() {
        let t = Transform::translation(10.0, 0.0, 0.0);
        let s = Transform::scaling(2.0, 2.0, 1.0);
        // t * s: scale, then translate
        assert_eq!((t * s).transform_point(1.0, 1.0), (12.0, 2.0));
        // s * t: translate, then scale
        assert_eq!((s * t).transform_point(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn builders_post_multiply() {
        let mut m = Transform::identity();
        m.translate(-1.0, -1.0, 0.0);
        m.scale(0.5, 0.25, 1.0);
        let expected = Transform::translation(-1.0, -1.0, 0.0) * Transform::scaling(0.5, 0.25, 1.0);
        assert_eq!(m, expected);
        assert_eq!(m.transform_point(2.0, 4.0), (0.0, 0.0));
    }

    #[test]
    fn mul_assign_matches_mul() {
        let a = Transform::scaling(3.0, 3.0, 1.0);
        let b = Transform::translation(1.0, 2.0, 0.0);
        let mut c = a;
        c *= b;
        assert_eq!(c, a * b);
    }
}
