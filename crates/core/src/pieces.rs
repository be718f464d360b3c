//! Pieces module - shape templates and matrix rotation
//!
//! Every piece is a small rectangular 0/1 matrix (at most 4x4). Rotation is
//! the raw 90° clockwise matrix rotation (transpose, then reverse each row)
//! with no wall kicks and no pivot compensation: the rotated matrix keeps the
//! same top-left anchor.

use arrayvec::ArrayVec;

use crate::types::PieceKind;

/// Largest side of any shape matrix
pub const MAX_SHAPE_SIDE: usize = 4;

/// Offset of a single filled cell relative to the shape's top-left corner,
/// as (column, row).
pub type MinoOffset = (i32, i32);

/// A rectangular matrix of filled/empty flags, row-major.
///
/// `Shape` is `Copy`: handing one out always produces an independent value,
/// so rotating a piece can never touch the template it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    rows: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl Shape {
    /// Build a shape from rows of 0/1 flags (any non-zero value counts as filled).
    ///
    /// Returns `None` for ragged input, an empty matrix or a side above 4.
    pub fn from_rows(rows: &[&[u8]]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len())?;
        if height == 0
            || width == 0
            || height > MAX_SHAPE_SIDE
            || width > MAX_SHAPE_SIDE
            || rows.iter().any(|r| r.len() != width)
        {
            return None;
        }

        let mut out = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                out[r][c] = v != 0;
            }
        }
        Some(Self {
            width: width as u8,
            height: height as u8,
            rows: out,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether the cell at (row, col) is filled. Out-of-range reads are empty.
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height as usize && col < self.width as usize && self.rows[row][col]
    }

    /// Rotate 90° clockwise: transpose, then reverse each resulting row.
    ///
    /// A `h x w` matrix becomes `w x h`, and `new[r][c] = old[h - 1 - c][r]`.
    pub fn rotated(&self) -> Self {
        let h = self.height as usize;
        let w = self.width as usize;
        let mut out = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, out_row) in out.iter_mut().enumerate().take(w) {
            for (c, slot) in out_row.iter_mut().enumerate().take(h) {
                *slot = self.rows[h - 1 - c][r];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            rows: out,
        }
    }

    /// Offsets (column, row) of every filled cell, row-major.
    pub fn filled(&self) -> ArrayVec<MinoOffset, 16> {
        let mut out = ArrayVec::new();
        for r in 0..self.height as usize {
            for c in 0..self.width as usize {
                if self.rows[r][c] {
                    out.push((c as i32, r as i32));
                }
            }
        }
        out
    }

    /// Rows of 0/1 flags, top to bottom
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.height as usize)
            .map(|r| {
                (0..self.width as usize)
                    .map(|c| u8::from(self.rows[r][c]))
                    .collect()
            })
            .collect()
    }
}

const fn pattern<const W: usize, const H: usize>(src: [[u8; W]; H]) -> Shape {
    let mut rows = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
    let mut r = 0;
    while r < H {
        let mut c = 0;
        while c < W {
            rows[r][c] = src[r][c] != 0;
            c += 1;
        }
        r += 1;
    }
    Shape {
        width: W as u8,
        height: H as u8,
        rows,
    }
}

const I_SHAPE: Shape = pattern([[1, 1, 1, 1]]);
const T_SHAPE: Shape = pattern([[0, 1, 0], [1, 1, 1]]);
const O_SHAPE: Shape = pattern([[1, 1], [1, 1]]);
const S_SHAPE: Shape = pattern([[0, 1, 1], [1, 1, 0]]);
const Z_SHAPE: Shape = pattern([[1, 1, 0], [0, 1, 1]]);
const L_SHAPE: Shape = pattern([[1, 1, 1], [1, 0, 0]]);
const J_SHAPE: Shape = pattern([[1, 1, 1], [0, 0, 1]]);

/// Spawn template for a piece kind (a fresh copy every call)
pub fn template(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => I_SHAPE,
        PieceKind::T => T_SHAPE,
        PieceKind::O => O_SHAPE,
        PieceKind::S => S_SHAPE,
        PieceKind::Z => Z_SHAPE,
        PieceKind::L => L_SHAPE,
        PieceKind::J => J_SHAPE,
    }
}
