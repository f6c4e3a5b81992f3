use crate::hand::{ParsedTile, parse_tiles};
use crate::tile::Tile;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Error, Result, bail, ensure};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MeldKind {
    #[default]
    Pon,
    Chi,
}

/// A called set: two tiles from hand plus one tile claimed from another
/// player's discard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Meld {
    pub kind: MeldKind,
    /// Sorted.
    pub tiles: [Tile; 3],
    pub self_tiles: [Tile; 2],
    pub called_tile: Tile,
    pub red_five_from_others: bool,
    /// Red fives taken out of the hand to form this meld.
    pub red_fives_from_hand: u8,
}

impl Meld {
    #[must_use]
    pub const fn pon(tile: Tile, red_five_from_others: bool) -> Self {
        Self {
            kind: MeldKind::Pon,
            tiles: [tile; 3],
            self_tiles: [tile; 2],
            called_tile: tile,
            red_five_from_others,
            red_fives_from_hand: 0,
        }
    }

    /// `a` and `b` come from the hand; the caller ensures the three tiles
    /// form a run.
    #[must_use]
    pub fn chi(a: Tile, b: Tile, called_tile: Tile, red_five_from_others: bool) -> Self {
        let mut tiles = [a, b, called_tile];
        tiles.sort_unstable();
        Self {
            kind: MeldKind::Chi,
            tiles,
            self_tiles: [a, b],
            called_tile,
            red_five_from_others,
            red_fives_from_hand: 0,
        }
    }

    /// Red fives held in this meld, from either source.
    #[must_use]
    pub const fn red_fives(&self) -> u8 {
        self.red_fives_from_hand + self.red_five_from_others as u8
    }
}

/// Parses `"345m"` style meld notation. The first tile written is the called
/// one; `0` marks a red five.
impl FromStr for Meld {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parsed = parse_tiles(s).with_context(|| format!("parsing meld \"{s}\""))?;
        let [called, a, b] = parsed[..] else {
            bail!("a meld needs exactly three tiles, got \"{s}\"");
        };
        let ParsedTile { tile: called_tile, is_red } = called;
        let reds = a.is_red as u8 + b.is_red as u8;

        let mut meld = if called_tile == a.tile && called_tile == b.tile {
            Meld::pon(called_tile, is_red)
        } else {
            let meld = Meld::chi(a.tile, b.tile, called_tile, is_red);
            let [x, y, z] = meld.tiles;
            ensure!(
                !x.is_jihai() && x.kind() == z.kind() && x.as_u8() + 1 == y.as_u8() && y.as_u8() + 1 == z.as_u8(),
                "\"{s}\" is neither a triplet nor a run"
            );
            meld
        };
        meld.red_fives_from_hand = reds;
        Ok(meld)
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MeldKind::Pon => "pon",
            MeldKind::Chi => "chi",
        };
        write!(
            f,
            "{kind}({}{}+{})",
            self.self_tiles[0], self.self_tiles[1], self.called_tile
        )
    }
}
