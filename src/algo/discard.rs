//! Discard selection for a 3n+2 hand.

use super::Analyzer;
use super::improve::Analysis13;
use super::shanten::{self, shanten_to_string};
use crate::state::PlayerInfo;
use crate::tile::{FIRST_HONOR, TILE_KINDS, Tile};
use std::cmp::Ordering;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

pub const BASE_ISOLATED_VALUE: f64 = 100.;
pub const DORA_VALUE: f64 = 10000.;
pub const DORA_FIRST_NEIGHBOUR_VALUE: f64 = 1000.;
pub const DORA_SECOND_NEIGHBOUR_VALUE: f64 = 100.;
pub const HONORED_VALUE: f64 = 15.;

/// Two-or-more-shanten buckets whose best wait count is at most
/// `NEED_IMPROVE_WAITS_PER_SHANTEN * shanten + NEED_IMPROVE_WAITS_BASE` rank
/// by improve waits first.
pub const NEED_IMPROVE_WAITS_PER_SHANTEN: u32 = 6;
pub const NEED_IMPROVE_WAITS_BASE: u32 = 3;

const EPSILON: f64 = 1e-9;

const HAKU: u8 = FIRST_HONOR + 4;
const HATSU: u8 = FIRST_HONOR + 5;
const LAST_WIND: u8 = FIRST_HONOR + 3;

#[derive(Debug, Clone, Serialize)]
pub struct Candidate14 {
    pub discard: Tile,
    pub discard_red: bool,
    /// Nothing of the same kind within two ranks is left after the discard.
    pub is_isolated: bool,
    /// [`isolated_value`] of the discard, 0 unless isolated.
    pub isolated_value: f64,
    pub result: Analysis13,
    /// Tiles taken from the hand when this candidate follows a call.
    pub open_tiles: Option<[Tile; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis14 {
    /// Shanten before discarding. For calls, the best shanten over every
    /// way to call.
    pub shanten: i8,
    /// Discards keeping `shanten`, best first.
    pub preserving: Vec<Candidate14>,
    /// Discards losing a step, best first.
    pub regressing: Vec<Candidate14>,
}

/// Whether `tile` has no connection left in `tiles`: no copy and, for
/// numerals, nothing of the same suit within two ranks.
#[must_use]
pub fn is_isolated(tiles: &[u8; TILE_KINDS], tile: Tile) -> bool {
    if tiles[tile.as_usize()] > 0 {
        return false;
    }
    if tile.is_jihai() {
        return true;
    }
    let base = (tile.kind() * 9) as usize;
    let lo = base + tile.num().saturating_sub(2) as usize;
    let hi = base + (tile.num() + 2).min(8) as usize;
    tiles[lo..=hi].iter().all(|&c| c == 0)
}

/// Static value of keeping an isolated tile, higher is worth more.
#[must_use]
pub fn isolated_value(player: &PlayerInfo, tile: Tile) -> f64 {
    let mut value = BASE_ISOLATED_VALUE;

    for dora in player.dora_tiles() {
        if dora == tile {
            value += DORA_VALUE;
        } else if !dora.is_jihai() && dora.kind() == tile.kind() {
            match dora.num().abs_diff(tile.num()) {
                1 => value += DORA_FIRST_NEIGHBOUR_VALUE,
                2 => value += DORA_SECOND_NEIGHBOUR_VALUE,
                _ => (),
            }
        }
    }

    if tile.is_jihai() {
        let (seat, round) = (player.seat_wind, player.round_wind);
        if tile == seat || tile == round || tile.as_u8() >= HAKU {
            value += HONORED_VALUE;
            if seat == round && tile == seat {
                value += HONORED_VALUE;
            } else if tile == seat {
                value += 1.;
            } else if tile == round {
                value -= 1.;
            }
            if tile.as_u8() == HATSU {
                value -= 1.;
            }
        } else {
            // shimocha, toimen, kamicha winds in that order
            let guest = (1..=3).find(|&i| {
                let mut wind = seat.as_u8() + i;
                if wind > LAST_WIND {
                    wind -= 4;
                }
                wind == tile.as_u8()
            });
            if let Some(i) = guest {
                value -= (4 - i) as f64;
            }
        }

        value *= match player.left_tiles()[tile.as_usize()] {
            0 => 0.,
            1 => 0.2,
            2 => 0.9,
            _ => 1.,
        };
    }

    value
}

/// Buckets of width [`EPSILON`], so that near-equal values tie and the
/// tie stays transitive.
fn quantize(x: f64) -> i64 {
    (x / EPSILON).round() as i64
}

/// Descending, with values in the same [`EPSILON`] bucket tied.
fn desc(a: f64, b: f64) -> Ordering {
    quantize(b).cmp(&quantize(a))
}

/// Numerals nearer the middle first, then lower index first.
fn discard_order(a: Tile, b: Tile) -> Ordering {
    if a.is_jihai() || b.is_jihai() {
        return a.cmp(&b);
    }
    let fold = |t: Tile| {
        let n = t.num();
        if n > 4 { 8 - n } else { n }
    };
    fold(b).cmp(&fold(a)).then(a.cmp(&b))
}

/// Ranks two candidates of one bucket. `Less` means `a` is the better
/// discard. This is a strict total order over candidates with distinct
/// `(discard, open_tiles)`.
///
/// The isolated-tile value is not part of it, see [`sort_candidates`].
#[must_use]
pub fn compare(a: &Candidate14, b: &Candidate14, tenpai: bool, need_improve: bool) -> Ordering {
    let (ra, rb) = (&a.result, &b.result);

    let by_win_rate = if tenpai {
        desc(ra.avg_win_rate, rb.avg_win_rate)
    } else {
        Ordering::Equal
    };
    let by_improve = if need_improve {
        desc(ra.avg_improve_waits, rb.avg_improve_waits)
    } else {
        Ordering::Equal
    };

    by_win_rate
        .then(by_improve)
        .then_with(|| desc(ra.mixed_score, rb.mixed_score))
        .then_with(|| rb.waits.all_count().cmp(&ra.waits.all_count()))
        .then_with(|| desc(ra.avg_next_shanten_waits, rb.avg_next_shanten_waits))
        .then_with(|| desc(ra.avg_win_rate, rb.avg_win_rate))
        .then_with(|| desc(ra.avg_improve_waits, rb.avg_improve_waits))
        .then_with(|| discard_order(a.discard, b.discard))
        .then_with(|| a.open_tiles.cmp(&b.open_tiles))
}

/// Weak hands of two shanten or more, where widening the waits comes first.
#[must_use]
pub fn need_improve(bucket: &[Candidate14]) -> bool {
    let Some(first) = bucket.first() else {
        return false;
    };
    let shanten = first.result.shanten;
    if shanten <= 1 {
        return false;
    }
    let max_waits = bucket.iter().map(|c| c.result.waits.all_count()).max().unwrap_or(0);
    max_waits <= NEED_IMPROVE_WAITS_PER_SHANTEN * shanten as u32 + NEED_IMPROVE_WAITS_BASE
}

/// Stable sort of one bucket, best first.
///
/// Candidates are ordered by [`compare`]. At two shanten or more the
/// isolated discards are then reordered among their own slots, the cheaper
/// floating tile first, leaving every other candidate where it is.
pub fn sort_candidates(bucket: &mut [Candidate14], need_improve: bool) {
    let Some(first) = bucket.first() else {
        return;
    };
    let tenpai = first.result.shanten == 0;
    let reorder_isolated = first.result.shanten >= 2;
    bucket.sort_by(|a, b| compare(a, b, tenpai, need_improve));
    if !reorder_isolated {
        return;
    }

    let slots: Vec<_> = (0..bucket.len()).filter(|&i| bucket[i].is_isolated).collect();
    if slots.len() < 2 {
        return;
    }
    let mut isolated: Vec<_> = slots.iter().map(|&i| bucket[i].clone()).collect();
    isolated.sort_by_key(|c| quantize(c.isolated_value));
    for (i, c) in slots.into_iter().zip(isolated) {
        bucket[i] = c;
    }
}

impl Analysis14 {
    pub(super) fn from_candidates(shanten: i8, candidates: Vec<Candidate14>) -> Self {
        let (mut preserving, mut regressing): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.result.shanten == shanten);
        let ni = need_improve(&preserving);
        sort_candidates(&mut preserving, ni);
        let ni = need_improve(&regressing);
        sort_candidates(&mut regressing, ni);
        Self {
            shanten,
            preserving,
            regressing,
        }
    }

    /// The top ranked discard, falling back to regressing ones.
    #[must_use]
    pub fn best(&self) -> Option<&Candidate14> {
        self.preserving.first().or_else(|| self.regressing.first())
    }
}

fn held_tiles(player: &PlayerInfo) -> Vec<Tile> {
    Tile::all().filter(|t| player.hand()[t.as_usize()] > 0).collect()
}

impl Analyzer<'_> {
    fn candidate(&self, player: &mut PlayerInfo, tile: Tile) -> Candidate14 {
        let red = player.is_only_red_five(tile);
        let mut discarded = player.discard(tile, red);
        let result = self.analyze13(&mut discarded);
        let is_isolated = is_isolated(discarded.hand(), tile);
        let isolated_value = if is_isolated {
            isolated_value(&discarded, tile)
        } else {
            0.
        };
        Candidate14 {
            discard: tile,
            discard_red: red,
            is_isolated,
            isolated_value,
            result,
            open_tiles: None,
        }
    }

    /// Analyzes every discard of a 3n+2 hand and ranks them.
    pub fn analyze14(&self, player: &mut PlayerInfo) -> Analysis14 {
        player.ensure_left_tiles();
        debug_assert_eq!(player.tile_count() % 3, 2);

        let shanten = shanten::shanten(player.hand());
        let candidates = held_tiles(player)
            .into_iter()
            .map(|tile| self.candidate(player, tile))
            .collect();
        let ret = Analysis14::from_candidates(shanten, candidates);
        log::debug!(
            "analyze14 {player}: {}, {} preserving, {} regressing",
            shanten_to_string(shanten),
            ret.preserving.len(),
            ret.regressing.len(),
        );
        ret
    }

    /// Same as [`Self::analyze14`], with each discard analyzed on its own
    /// copy of `player` in parallel.
    pub fn analyze14_parallel(&self, player: &PlayerInfo) -> Analysis14 {
        let mut player = player.clone();
        player.ensure_left_tiles();
        debug_assert_eq!(player.tile_count() % 3, 2);

        let shanten = shanten::shanten(player.hand());
        let candidates = held_tiles(&player)
            .into_par_iter()
            .map(|tile| self.candidate(&mut player.clone(), tile))
            .collect();
        let ret = Analysis14::from_candidates(shanten, candidates);
        log::debug!(
            "analyze14_parallel {player}: {}, {} preserving, {} regressing",
            shanten_to_string(shanten),
            ret.preserving.len(),
            ret.regressing.len(),
        );
        ret
    }
}

impl fmt::Display for Candidate14 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some([a, b]) = self.open_tiles {
            let kind = if a == b { "pon" } else { "chi" };
            write!(f, "{kind} with {a}{b}, ")?;
        }
        f.write_str("discard ")?;
        if self.discard_red {
            write!(f, "0{}", ["m", "p", "s"][self.discard.kind() as usize])?;
        } else {
            write!(f, "{}", self.discard)?;
        }
        write!(f, ": {}", self.result)
    }
}

impl fmt::Display for Analysis14 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", shanten_to_string(self.shanten))?;
        for c in &self.preserving {
            writeln!(f, "{c}")?;
        }
        if !self.regressing.is_empty() {
            writeln!(f, "{} (regressing)", shanten_to_string(self.shanten + 1))?;
            for c in &self.regressing {
                writeln!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
