//! Mathematical types shared by the core, renderer and audio crates.
//!
//! Matrices are column-major (`m[column][row]`) with OpenGL clip conventions.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - position, color, direction
///
/// Serialized as a plain `[x, y, z]` array so scene files stay compact.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Vector with all components set to `v`.
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Component-wise linear interpolation: `self * (1 - t) + other * t`.
    ///
    /// Exact at both ends: `t = 0` yields `self`, `t = 1` yields `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Component-wise absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Integer grid cell containing this point.
    #[must_use]
    pub fn floor_to_cell(self) -> [i32; 3] {
        [
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        ]
    }

    /// Integer grid cell nearest to this point.
    #[must_use]
    pub fn round_to_cell(self) -> [i32; 3] {
        [
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        ]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(arr: [f32; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// 4D Vector - homogeneous coordinates and tesseract vertices
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec4 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl Vec4 {
    /// Creates a new Vec4
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f32; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }
}

/// 4x4 matrix, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    /// Columns of the matrix.
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Right-handed view matrix looking from `eye` towards `center`.
    #[must_use]
    pub fn look_at_rh(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        let f = (center - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Self {
            cols: [
                [s.x, u.x, -f.x, 0.0],
                [s.y, u.y, -f.y, 0.0],
                [s.z, u.z, -f.z, 0.0],
                [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
            ],
        }
    }

    /// Right-handed perspective projection with a `[-1, 1]` depth range.
    ///
    /// `fov_y` is in radians.
    #[must_use]
    pub fn perspective_rh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let tan_half = (fov_y * 0.5).tan();
        let mut m = Self { cols: [[0.0; 4]; 4] };
        m.cols[0][0] = 1.0 / (aspect * tan_half);
        m.cols[1][1] = 1.0 / tan_half;
        m.cols[2][2] = -(far + near) / (far - near);
        m.cols[2][3] = -1.0;
        m.cols[3][2] = -(2.0 * far * near) / (far - near);
        m
    }

    /// Non-uniform scale matrix.
    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = scale.x;
        m.cols[1][1] = scale.y;
        m.cols[2][2] = scale.z;
        m
    }

    /// Translation matrix.
    #[must_use]
    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    /// Rotation by `angle` radians in the plane spanned by two axes (0..4).
    ///
    /// Used for 4D rotations where the plane includes the W axis.
    #[must_use]
    pub fn plane_rotation(angle: f32, axis_a: usize, axis_b: usize) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[axis_a][axis_a] = c;
        m.cols[axis_a][axis_b] = -s;
        m.cols[axis_b][axis_a] = s;
        m.cols[axis_b][axis_b] = c;
        m
    }

    /// Matrix product `self * rhs`.
    #[must_use]
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Self { cols: out }
    }

    /// Matrix-vector product.
    #[must_use]
    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        let v = v.to_array();
        let mut out = [0.0f32; 4];
        for (r, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|c| self.cols[c][r] * v[c]).sum();
        }
        Vec4::from_array(out)
    }

    /// Inverse of a rotation + translation matrix (such as a view matrix).
    #[must_use]
    pub fn rigid_inverse(&self) -> Self {
        let mut out = Self::IDENTITY;
        for c in 0..3 {
            for r in 0..3 {
                out.cols[c][r] = self.cols[r][c];
            }
        }
        let t = Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2]);
        for r in 0..3 {
            let row = Vec3::new(out.cols[0][r], out.cols[1][r], out.cols[2][r]);
            out.cols[3][r] = -row.dot(t);
        }
        out
    }

    /// Transforms a point (w = 1) and drops the homogeneous coordinate.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let v = self.mul_vec4(Vec4::new(p.x, p.y, p.z, 1.0));
        Vec3::new(v.x, v.y, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0); // 1*4 + 2*5 + 3*6
        assert_eq!(Vec3::new(1.0, 0.0, 0.0).cross(Vec3::Y), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_lerp_endpoints_exact() {
        let a = Vec3::new(0.1, 0.2, 0.3);
        let b = Vec3::new(0.9, 0.8, 0.7);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_vec3_serde_as_array() {
        #[derive(Deserialize)]
        struct Holder {
            p: Vec3,
        }
        let h: Holder = toml::from_str("p = [1.0, 2.5, -3.0]").unwrap();
        assert_eq!(h.p, Vec3::new(1.0, 2.5, -3.0));
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let eye = Vec3::new(6.0, 5.0, 15.0);
        let view = Mat4::look_at_rh(eye, eye + Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        assert!(approx(view.transform_point(eye), Vec3::ZERO));

        // A point straight ahead lands on the negative Z axis.
        let ahead = view.transform_point(eye + Vec3::new(0.0, 0.0, -2.0));
        assert!(approx(ahead, Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_rigid_inverse() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::look_at_rh(eye, Vec3::new(4.0, 0.0, -1.0), Vec3::Y);
        let product = view.mul(&view.rigid_inverse());
        for c in 0..4 {
            for r in 0..4 {
                let expected = if c == r { 1.0 } else { 0.0 };
                assert!((product.cols[c][r] - expected).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_plane_rotation_quarter_turn() {
        let rot = Mat4::plane_rotation(std::f32::consts::FRAC_PI_2, 0, 3);
        let v = rot.mul_vec4(Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert!(v.x.abs() < 1e-6);
        assert!((v.w + 1.0).abs() < 1e-6);
    }
}
