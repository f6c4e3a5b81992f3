use super::Meld;
use super::scoped::{Scoped, Undo};
use crate::hand::{hand_with_red, tiles_to_string};
use crate::tile::{TILE_KINDS, Tile};
use std::fmt;

use anyhow::{Result, ensure};
use derivative::Derivative;
use tinyvec::ArrayVec;

/// Everything the search knows about one player: the concealed hand, called
/// sets, what has been seen, and the unseen pool.
///
/// Hypothetical moves go through the methods returning [`Scoped`], which
/// restore the state when dropped.
#[derive(Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
pub struct PlayerInfo {
    /// Concealed tiles, red fives included.
    #[derivative(Default(value = "[0; TILE_KINDS]"))]
    hand: [u8; TILE_KINDS],
    /// Red fives in the concealed hand, per suit.
    red_fives: [u8; 3],
    melds: ArrayVec<[Meld; 4]>,
    #[derivative(Default(value = "[0; TILE_KINDS]"))]
    left_tiles: [u8; TILE_KINDS],
    /// Set only while a winning shape is being checked.
    win_tile: Option<Tile>,

    pub dora_indicators: ArrayVec<[Tile; 5]>,
    pub round_wind: Tile,
    pub seat_wind: Tile,
    pub is_riichi: bool,
    /// Own discards, for furiten.
    pub discards: Vec<Tile>,
    /// Other tiles known to be out of the wall: opponents' discards and
    /// melds.
    #[derivative(Default(value = "[0; TILE_KINDS]"))]
    pub visible: [u8; TILE_KINDS],
}

impl PlayerInfo {
    #[must_use]
    pub fn new(hand: [u8; TILE_KINDS], red_fives: [u8; 3]) -> Self {
        let mut ret = Self {
            hand,
            red_fives,
            ..Default::default()
        };
        ret.fill_left_tiles();
        ret
    }

    pub fn from_hand_str(s: &str) -> Result<Self> {
        let (hand, red_fives) = hand_with_red(s)?;
        Ok(Self::new(hand, red_fives))
    }

    /// Records a meld that was called before the hand was observed. Its
    /// tiles are not taken from `hand`. Refills the pool.
    pub fn push_meld(&mut self, meld: Meld) -> Result<()> {
        ensure!(self.melds.len() < 4, "at most four melds, got another {meld}");
        self.melds.push(meld);
        self.fill_left_tiles();
        Ok(())
    }

    /// Recomputes the unseen pool from everything visible to this player.
    /// Must be called again after changing `discards`, `dora_indicators` or
    /// `visible`.
    pub fn fill_left_tiles(&mut self) {
        let mut seen = self.hand;
        for meld in &self.melds {
            for t in meld.tiles {
                seen[t.as_usize()] += 1;
            }
        }
        for t in self.discards.iter().chain(&self.dora_indicators) {
            seen[t.as_usize()] += 1;
        }
        for ((l, s), v) in self.left_tiles.iter_mut().zip(seen).zip(self.visible) {
            *l = 4_u8.saturating_sub(s + v);
        }
    }

    /// Fills the pool unless it has been filled already.
    pub fn ensure_left_tiles(&mut self) {
        if self.left_tiles.iter().all(|&l| l == 0) {
            self.fill_left_tiles();
        }
    }

    #[inline]
    #[must_use]
    pub const fn hand(&self) -> &[u8; TILE_KINDS] {
        &self.hand
    }

    #[inline]
    #[must_use]
    pub const fn red_fives(&self) -> [u8; 3] {
        self.red_fives
    }

    #[inline]
    #[must_use]
    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }

    #[inline]
    #[must_use]
    pub const fn left_tiles(&self) -> &[u8; TILE_KINDS] {
        &self.left_tiles
    }

    #[inline]
    #[must_use]
    pub const fn win_tile(&self) -> Option<Tile> {
        self.win_tile
    }

    #[inline]
    #[must_use]
    pub fn is_naki(&self) -> bool {
        !self.melds.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_oya(&self) -> bool {
        self.seat_wind.as_u8() == crate::tile::FIRST_HONOR
    }

    #[must_use]
    pub fn tile_count(&self) -> u8 {
        self.hand.iter().sum()
    }

    /// Whether discarding `tile` would have to discard a red five, i.e. every
    /// copy of it left in hand is red.
    #[must_use]
    pub fn is_only_red_five(&self, tile: Tile) -> bool {
        if !tile.is_five() {
            return false;
        }
        let reds = self.red_fives[tile.kind() as usize];
        reds > 0 && self.hand[tile.as_usize()] <= reds
    }

    pub fn dora_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.dora_indicators.iter().map(|t| t.next())
    }

    /// Dora in hand and melds, red fives included.
    #[must_use]
    pub fn count_dora(&self) -> u8 {
        let mut count = self.red_fives.iter().sum::<u8>();
        count += self.melds.iter().map(Meld::red_fives).sum::<u8>();
        for dora in self.dora_tiles() {
            count += self.hand[dora.as_usize()];
            count += self
                .melds
                .iter()
                .flat_map(|m| m.tiles)
                .filter(|&t| t == dora)
                .count() as u8;
        }
        count
    }

    /// Draws `tile` from the unseen pool.
    pub fn draw(&mut self, tile: Tile) -> Scoped<'_> {
        let i = tile.as_usize();
        debug_assert!(self.left_tiles[i] > 0 && self.hand[i] < 4);
        self.hand[i] += 1;
        self.left_tiles[i] -= 1;
        Scoped::new(self, Undo::Draw(tile))
    }

    /// Discards one copy of `tile`, the red one if `red`. The pool is left
    /// alone since the tile stays visible.
    pub fn discard(&mut self, tile: Tile, red: bool) -> Scoped<'_> {
        debug_assert!(self.hand[tile.as_usize()] > 0);
        self.hand[tile.as_usize()] -= 1;
        if red {
            self.red_fives[tile.kind() as usize] -= 1;
        }
        Scoped::new(self, Undo::Discard { tile, red })
    }

    /// Adds `tile` as the winning tile for a shape or yaku check.
    pub fn add_win_tile(&mut self, tile: Tile) -> Scoped<'_> {
        let prev = self.win_tile.replace(tile);
        self.hand[tile.as_usize()] += 1;
        Scoped::new(self, Undo::WinTile { tile, prev })
    }

    /// Declares riichi for the lifetime of the guard.
    pub fn declare_riichi(&mut self) -> Scoped<'_> {
        let prev = std::mem::replace(&mut self.is_riichi, true);
        Scoped::new(self, Undo::Riichi { prev })
    }

    /// Calls `meld`: its self tiles leave the hand, red fives last.
    pub fn add_meld(&mut self, mut meld: Meld) -> Scoped<'_> {
        debug_assert!(self.melds.len() < 4);
        meld.red_fives_from_hand = 0;
        for t in meld.self_tiles {
            let red = self.is_only_red_five(t);
            debug_assert!(self.hand[t.as_usize()] > 0);
            self.hand[t.as_usize()] -= 1;
            if red {
                self.red_fives[t.kind() as usize] -= 1;
                meld.red_fives_from_hand += 1;
            }
        }
        self.melds.push(meld);
        Scoped::new(self, Undo::Meld)
    }

    pub(super) fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Draw(tile) => {
                self.hand[tile.as_usize()] -= 1;
                self.left_tiles[tile.as_usize()] += 1;
            }
            Undo::Discard { tile, red } => {
                self.hand[tile.as_usize()] += 1;
                if red {
                    self.red_fives[tile.kind() as usize] += 1;
                }
            }
            Undo::WinTile { tile, prev } => {
                self.hand[tile.as_usize()] -= 1;
                self.win_tile = prev;
            }
            Undo::Riichi { prev } => self.is_riichi = prev,
            Undo::Meld => {
                if let Some(meld) = self.melds.pop() {
                    for t in meld.self_tiles {
                        self.hand[t.as_usize()] += 1;
                    }
                    if meld.red_fives_from_hand > 0 {
                        self.red_fives[meld.called_tile.kind() as usize] += meld.red_fives_from_hand;
                    }
                }
            }
        }
    }
}

impl fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tiles_to_string(&self.hand, self.red_fives))?;
        for meld in &self.melds {
            write!(f, " {meld}")?;
        }
        Ok(())
    }
}
