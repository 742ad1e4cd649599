//! Shape masks and quarter-turn rotation
//!
//! A shape is the solid/empty pattern inside an item's bounding box.
//! Masks and socket points are rotated by the same point map, so a socket
//! stays glued to the physical cell it was authored on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Largest width or height a shape may have in the default configuration
pub const MAX_SHAPE_SIZE: u8 = 5;

/// Character for a solid cell in the row text form
pub const SOLID: char = '#';
/// Character for an empty cell in the row text form
pub const EMPTY: char = '.';

/// Clockwise quarter-turn orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

/// Rotation step outside 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rotation step {0} is not in 0..=3")]
pub struct InvalidRotation(pub u8);

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Build from a step count, wrapping modulo 4
    pub fn from_steps(steps: u32) -> Self {
        Self::ALL[(steps % 4) as usize]
    }

    /// Number of clockwise quarter turns (0..=3)
    pub fn steps(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Apply `other` after `self`
    pub fn then(self, other: Rotation) -> Rotation {
        Self::from_steps(u32::from(self.steps() + other.steps()))
    }

    /// One more clockwise quarter turn
    pub fn clockwise(self) -> Rotation {
        self.then(Rotation::R90)
    }

    /// The rotation that undoes this one
    pub fn inverse(self) -> Rotation {
        Self::from_steps(u32::from(4 - self.steps()))
    }

    /// Whether width and height trade places
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

impl TryFrom<u8> for Rotation {
    type Error = InvalidRotation;

    fn try_from(steps: u8) -> Result<Self, Self::Error> {
        match steps {
            0..=3 => Ok(Self::ALL[steps as usize]),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> u8 {
        rotation.steps()
    }
}

/// A cell coordinate local to a shape's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOffset {
    pub x: u8,
    pub y: u8,
}

impl CellOffset {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Map a point inside a `width`x`height` box through `rotation`.
///
/// The result lives in the rotated box, which is `height`x`width` for odd
/// steps. Returns `None` for a point outside the source box.
pub fn rotate_point(
    point: CellOffset,
    width: u8,
    height: u8,
    rotation: Rotation,
) -> Option<CellOffset> {
    let CellOffset { x, y } = point;
    if x >= width || y >= height {
        return None;
    }
    let rotated = match rotation {
        Rotation::R0 => CellOffset::new(x, y),
        Rotation::R90 => CellOffset::new(height - 1 - y, x),
        Rotation::R180 => CellOffset::new(width - 1 - x, height - 1 - y),
        Rotation::R270 => CellOffset::new(y, width - 1 - x),
    };
    Some(rotated)
}

/// Rotate a whole mask; see [`ShapeMask::rotated`]
pub fn rotate(mask: &ShapeMask, rotation: Rotation) -> ShapeMask {
    mask.rotated(rotation)
}

/// Immutable rectangular occupancy pattern, row-major
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ShapeMask {
    width: u8,
    height: u8,
    cells: Vec<bool>,
}

impl ShapeMask {
    /// Build a mask, enforcing the default size limit
    pub fn new(width: u8, height: u8, cells: Vec<bool>) -> Result<Self, InventoryError> {
        Self::with_limit(width, height, cells, MAX_SHAPE_SIZE)
    }

    /// Build a mask whose sides may not exceed `max_size`
    pub fn with_limit(
        width: u8,
        height: u8,
        cells: Vec<bool>,
        max_size: u8,
    ) -> Result<Self, InventoryError> {
        if width == 0 || height == 0 {
            return Err(InventoryError::InvalidTemplate(format!(
                "shape must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        if width > max_size || height > max_size {
            return Err(InventoryError::InvalidTemplate(format!(
                "shape {}x{} exceeds the {}x{} limit",
                width, height, max_size, max_size
            )));
        }
        if cells.len() != width as usize * height as usize {
            return Err(InventoryError::InvalidTemplate(format!(
                "shape {}x{} needs {} cells, got {}",
                width,
                height,
                width as usize * height as usize,
                cells.len()
            )));
        }
        if !cells.iter().any(|&c| c) {
            return Err(InventoryError::InvalidTemplate(
                "shape has no solid cells".to_string(),
            ));
        }
        Ok(Self { width, height, cells })
    }

    /// A fully solid rectangle
    pub fn rect(width: u8, height: u8) -> Result<Self, InventoryError> {
        Self::new(width, height, vec![true; width as usize * height as usize])
    }

    /// Parse rows of `#` (solid) and `.` (empty)
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, InventoryError> {
        Self::from_rows_with_limit(rows, MAX_SHAPE_SIZE)
    }

    pub fn from_rows_with_limit<S: AsRef<str>>(
        rows: &[S],
        max_size: u8,
    ) -> Result<Self, InventoryError> {
        let height = u8::try_from(rows.len()).map_err(|_| {
            InventoryError::InvalidTemplate(format!("{} rows is too many", rows.len()))
        })?;
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let width = u8::try_from(width).map_err(|_| {
            InventoryError::InvalidTemplate(format!("row width {} is too wide", width))
        })?;

        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width as usize {
                return Err(InventoryError::InvalidTemplate(format!(
                    "row {} is {:?}, expected {} cells",
                    y, row, width
                )));
            }
            for c in row.chars() {
                match c {
                    SOLID => cells.push(true),
                    EMPTY => cells.push(false),
                    other => {
                        return Err(InventoryError::InvalidTemplate(format!(
                            "unexpected character {:?} in row {}",
                            other, y
                        )))
                    }
                }
            }
        }
        Self::with_limit(width, height, cells, max_size)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// `(width, height)` of the bounding box
    pub fn size(&self) -> (u8, u8) {
        (self.width, self.height)
    }

    /// Raw row-major cells
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Whether a local cell is solid; out-of-box reads are empty
    pub fn get(&self, x: u8, y: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Whether a point lies inside the bounding box
    pub fn contains(&self, offset: CellOffset) -> bool {
        offset.x < self.width && offset.y < self.height
    }

    /// Number of solid cells
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Solid cells in row-major order
    pub fn solid_cells(&self) -> impl Iterator<Item = CellOffset> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &solid)| solid)
            .map(move |(i, _)| CellOffset::new((i % width) as u8, (i / width) as u8))
    }

    /// Rows in `#`/`.` text form
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|&c| if c { SOLID } else { EMPTY }).collect())
            .collect()
    }

    /// Copy with one cell set, re-validated. Editor toggles go through here
    /// so an edit can never leave an empty shape behind.
    pub fn with_cell(&self, x: u8, y: u8, solid: bool) -> Result<Self, InventoryError> {
        if x >= self.width || y >= self.height {
            return Err(InventoryError::InvalidTemplate(format!(
                "cell ({}, {}) is outside the {}x{} shape",
                x, y, self.width, self.height
            )));
        }
        let mut cells = self.cells.clone();
        cells[y as usize * self.width as usize + x as usize] = solid;
        // The size was valid already; only the solid-cell rule can fail
        Self::with_limit(self.width, self.height, cells, u8::MAX)
    }

    /// Size of the box after `rotation`
    pub fn rotated_size(&self, rotation: Rotation) -> (u8, u8) {
        if rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Rotate clockwise by `rotation`, returning a new mask
    pub fn rotated(&self, rotation: Rotation) -> ShapeMask {
        if rotation == Rotation::R0 {
            return self.clone();
        }
        let (new_width, new_height) = self.rotated_size(rotation);
        let mut cells = vec![false; self.cells.len()];
        for cell in self.solid_cells() {
            if let Some(p) = rotate_point(cell, self.width, self.height, rotation) {
                cells[p.y as usize * new_width as usize + p.x as usize] = true;
            }
        }
        ShapeMask {
            width: new_width,
            height: new_height,
            cells,
        }
    }
}

impl fmt::Display for ShapeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for ShapeMask {
    type Error = InventoryError;

    /// No size cap here; template loading applies its own limit.
    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_rows_with_limit(&rows, u8::MAX)
    }
}

impl From<ShapeMask> for Vec<String> {
    fn from(mask: ShapeMask) -> Vec<String> {
        mask.rows()
    }
}
