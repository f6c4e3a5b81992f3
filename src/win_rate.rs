//! Empirical win rates of tenpai hands, in percent.

use crate::algo::waits::Waits;
use crate::tile::Tile;

/// Applied to the win rate of a tenpai hand that is furiten, which can only
/// win by tsumo.
pub const FURITEN_WIN_RATE_MULTIPLIER: f64 = 0.4706727;

/// Numeral waits by tile type (1/9, 2/8, 3/7, 4/6, 5) and copies left, turns
/// 6 to 10.
const NUMERAL_WIN_RATES: [[f64; 5]; 5] = [
    [0., 26.3, 41.6, 50.1, 55.0],
    [0., 19.2, 31.7, 38.2, 42.0],
    [0., 14.8, 25.5, 32.0, 36.8],
    [0., 11.8, 20.3, 26.7, 31.0],
    [0., 11.8, 20.3, 26.7, 31.0],
];

/// Honor waits by copies left (1 to 3), turn 8.
const HONOR_WIN_RATES: [f64; 3] = [47.5, 58.0, 49.5];

pub trait WinRateTable: Send + Sync {
    /// Win rate in percent of a tenpai hand waiting on `waits`, given the
    /// player's own discards.
    fn win_rate(&self, waits: &Waits, discards: &[Tile]) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmpiricalWinRate;

/// Whether a numeral tile is suji of the player's own discards, which makes
/// it as easy to get out as a terminal.
fn is_suji(tile: Tile, discards: &[Tile]) -> bool {
    let id = tile.as_u8();
    let has = |t: u8| discards.iter().any(|d| d.as_u8() == t);
    match tile.num() {
        0..=2 => has(id + 3),
        6..=8 => has(id - 3),
        _ => has(id - 3) && has(id + 3),
    }
}

/// 1 (easiest) to 5 (hardest) for numeral tiles.
#[must_use]
pub fn tile_type(tile: Tile, discards: &[Tile]) -> usize {
    if is_suji(tile, discards) {
        return 1;
    }
    match tile.num() {
        0 | 8 => 1,
        1 | 7 => 2,
        2 | 6 => 3,
        3 | 5 => 4,
        _ => 5,
    }
}

impl EmpiricalWinRate {
    #[must_use]
    pub fn single(tile: Tile, left: u8, discards: &[Tile]) -> f64 {
        if left == 0 {
            return 0.;
        }
        if tile.is_jihai() {
            HONOR_WIN_RATES[left.min(3) as usize - 1]
        } else {
            NUMERAL_WIN_RATES[tile_type(tile, discards) - 1][left.min(4) as usize]
        }
    }
}

impl WinRateTable for EmpiricalWinRate {
    fn win_rate(&self, waits: &Waits, discards: &[Tile]) -> f64 {
        waits
            .iter()
            .map(|(tile, left)| Self::single(tile, left, discards))
            .fold(0., |r, x| r + x - r * x / 100.)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::waits::calc_shanten_and_waits13;
    use crate::hand::hand;

    fn rate(s: &str, discards: &[&str]) -> f64 {
        let (_, waits) = calc_shanten_and_waits13(&hand(s).unwrap(), None);
        let discards: Vec<Tile> = discards.iter().map(|d| d.parse().unwrap()).collect();
        EmpiricalWinRate.win_rate(&waits, &discards)
    }

    #[test]
    pub fn table() {
        const EPS: f64 = 1e-9;
        assert!((rate("123456789m 1135s", &[]) - 31.0).abs() < EPS);
        assert!((rate("123456789m 1134s", &[]) - 59.98).abs() < EPS);
        assert!((rate("123456789m 1135s", &["1s", "7s"]) - 55.0).abs() < EPS);
        assert!((rate("123456789m 1135s", &["1s"]) - 31.0).abs() < EPS);
        assert!((rate("123456789m 234s 1z", &[]) - 49.5).abs() < EPS);
    }
}
