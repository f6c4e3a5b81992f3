use super::shanten;
use crate::hand::tile_list_to_string;
use crate::tile::{TILE_KINDS, Tile};
use std::fmt;

use derivative::Derivative;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tiles that advance the hand by one step when drawn, with the number of
/// copies still unseen.
///
/// A wait may be recorded with 0 copies left: it would advance the hand but
/// every copy is already visible. Such waits still matter for furiten.
#[derive(Derivative, Clone, Copy, PartialEq, Eq)]
#[derivative(Default)]
pub struct Waits {
    #[derivative(Default(value = "[false; TILE_KINDS]"))]
    is_wait: [bool; TILE_KINDS],
    #[derivative(Default(value = "[0; TILE_KINDS]"))]
    left: [u8; TILE_KINDS],
}

impl Waits {
    #[inline]
    pub fn insert(&mut self, tile: Tile, left: u8) {
        self.is_wait[tile.as_usize()] = true;
        self.left[tile.as_usize()] = left;
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, tile: Tile) -> bool {
        self.is_wait[tile.as_usize()]
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, tile: Tile) -> Option<u8> {
        if self.is_wait[tile.as_usize()] {
            Some(self.left[tile.as_usize()])
        } else {
            None
        }
    }

    /// Total copies left across all waits.
    #[must_use]
    pub fn all_count(&self) -> u32 {
        self.iter().map(|(_, left)| left as u32).sum()
    }

    /// Number of distinct wait kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.is_wait.iter().filter(|&&w| w).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_wait.contains(&true)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tile, u8)> + '_ {
        Tile::all()
            .filter(|t| self.is_wait[t.as_usize()])
            .map(|t| (t, self.left[t.as_usize()]))
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.iter().map(|(t, _)| t)
    }
}

impl fmt::Debug for Waits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for Waits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} waits [{}]", self.all_count(), tile_list_to_string(self.tiles()))
    }
}

impl Serialize for Waits {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (tile, left) in self.iter() {
            map.serialize_entry(&tile, &left)?;
        }
        map.end()
    }
}

/// Unseen copies assuming only the hand itself is visible.
#[must_use]
pub fn left_tiles_from_hand(tiles: &[u8; TILE_KINDS]) -> [u8; TILE_KINDS] {
    let mut left = [0; TILE_KINDS];
    left.iter_mut()
        .zip(tiles)
        .for_each(|(l, &c)| *l = 4_u8.saturating_sub(c));
    left
}

/// Shanten and waits of a 3n+1 hand.
///
/// Every kind not already held four times is tried as a draw; it is a wait iff
/// it strictly lowers shanten. When `left_tiles` is `None` the pool is derived
/// from the hand alone.
#[must_use]
pub fn calc_shanten_and_waits13(
    tiles: &[u8; TILE_KINDS],
    left_tiles: Option<&[u8; TILE_KINDS]>,
) -> (i8, Waits) {
    let left = match left_tiles {
        Some(l) => *l,
        None => left_tiles_from_hand(tiles),
    };

    let len_div3 = tiles.iter().sum::<u8>() / 3;
    let shanten = shanten::calc_all(tiles, len_div3);

    let mut tiles = *tiles;
    let mut waits = Waits::default();
    for tile in Tile::all() {
        let i = tile.as_usize();
        if tiles[i] == 4 {
            continue;
        }
        tiles[i] += 1;
        if shanten::calc_all(&tiles, len_div3) < shanten {
            waits.insert(tile, left[i]);
        }
        tiles[i] -= 1;
    }

    (shanten, waits)
}
