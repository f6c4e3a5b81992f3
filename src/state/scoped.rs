use super::PlayerInfo;
use crate::tile::Tile;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy)]
pub(super) enum Undo {
    Draw(Tile),
    Discard { tile: Tile, red: bool },
    WinTile { tile: Tile, prev: Option<Tile> },
    Riichi { prev: bool },
    Meld,
}

/// A hypothetical move applied to a [`PlayerInfo`]. The move is reverted when
/// the guard goes out of scope, on every exit path.
///
/// Guards nest: further moves can be made through a guard, and the inner
/// guard must be dropped first.
#[must_use = "the move is reverted as soon as the guard is dropped"]
pub struct Scoped<'a> {
    player: &'a mut PlayerInfo,
    undo: Undo,
}

impl<'a> Scoped<'a> {
    pub(super) fn new(player: &'a mut PlayerInfo, undo: Undo) -> Self {
        Self { player, undo }
    }
}

impl Deref for Scoped<'_> {
    type Target = PlayerInfo;

    fn deref(&self) -> &Self::Target {
        self.player
    }
}

impl DerefMut for Scoped<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.player
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        self.player.undo(self.undo);
    }
}
