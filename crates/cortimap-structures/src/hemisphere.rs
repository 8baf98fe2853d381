//! Per-hemisphere bookkeeping.
//!
//! Operators, meshes and masks are always maintained per hemisphere and only concatenated
//! at the outward-facing boundary of the mapper.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the two independently-indexed halves of the cortical mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    /// Short file-name tag ("lh" / "rh").
    pub fn tag(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

impl Display for Hemisphere {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Hemisphere::Left => write!(f, "left"),
            Hemisphere::Right => write!(f, "right"),
        }
    }
}

/// A left/right pair of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hemispheres<T> {
    pub left: T,
    pub right: T,
}

impl<T> Hemispheres<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn get(&self, hemisphere: Hemisphere) -> &T {
        match hemisphere {
            Hemisphere::Left => &self.left,
            Hemisphere::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, hemisphere: Hemisphere) -> &mut T {
        match hemisphere {
            Hemisphere::Left => &mut self.left,
            Hemisphere::Right => &mut self.right,
        }
    }

    pub fn by_ref(&self) -> Hemispheres<&T> {
        Hemispheres {
            left: &self.left,
            right: &self.right,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Hemispheres<U> {
        Hemispheres {
            left: f(self.left),
            right: f(self.right),
        }
    }

    /// Like [`Hemispheres::map`] but the closure also receives which side it is called for,
    /// and errors short-circuit.
    pub fn try_map_with<U, E, F>(self, mut f: F) -> Result<Hemispheres<U>, E>
    where
        F: FnMut(Hemisphere, T) -> Result<U, E>,
    {
        Ok(Hemispheres {
            left: f(Hemisphere::Left, self.left)?,
            right: f(Hemisphere::Right, self.right)?,
        })
    }

    pub fn zip<U>(self, other: Hemispheres<U>) -> Hemispheres<(T, U)> {
        Hemispheres {
            left: (self.left, other.left),
            right: (self.right, other.right),
        }
    }

    /// Iterates `(Hemisphere, &T)` left first.
    pub fn iter(&self) -> impl Iterator<Item = (Hemisphere, &T)> {
        [(Hemisphere::Left, &self.left), (Hemisphere::Right, &self.right)].into_iter()
    }

    pub fn into_array(self) -> [T; 2] {
        [self.left, self.right]
    }
}
