//! Analysis of a 3n+1 hand waiting for its next draw.

use super::Analyzer;
use super::shanten::shanten_to_string;
use super::waits::{Waits, calc_shanten_and_waits13};
use crate::state::PlayerInfo;
use crate::tile::{TILE_KINDS, Tile};
use crate::win_rate::FURITEN_WIN_RATE_MULTIPLIER;
use crate::yaku::{Yaku, yakus_to_string};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_with::serde_as;

/// Draws considered by the mixed score.
pub const MIXED_SCORE_LOOKAHEAD_TURNS: i32 = 10;

/// Furiten rate of a one-shanten hand whose waits include an own discard.
pub const POSSIBLE_FURITEN_RATE: f64 = 0.5;

/// Three-shanten hands only hint seven pairs with at most this many waits.
pub const CHIITOI_HINT_MAX_WAITS: u32 = 21;

#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct Analysis13 {
    #[serde_as(as = "[_; 34]")]
    pub tiles34: [u8; TILE_KINDS],
    #[serde_as(as = "[_; 34]")]
    pub left_tiles34: [u8; TILE_KINDS],
    pub is_naki: bool,
    pub shanten: i8,
    pub waits: Waits,

    /// For each wait, the most waits reachable after drawing it and
    /// discarding the best tile.
    pub next_shanten_waits: BTreeMap<Tile, u32>,
    /// `next_shanten_waits` averaged by copies left.
    pub avg_next_shanten_waits: f64,
    /// Rough probability in percent of advancing twice within
    /// [`MIXED_SCORE_LOOKAHEAD_TURNS`] draws.
    pub mixed_score: f64,

    /// Non-wait draws that widen the waits without advancing, with the
    /// widest waits reachable after each.
    pub improves: BTreeMap<Tile, Waits>,
    /// Number of (draw, discard) pairs that widen the waits.
    pub improve_way_count: u32,
    /// Wait count after one draw, averaged over every draw by copies left.
    /// Draws that neither advance nor improve count as the current waits.
    pub avg_improve_waits: f64,

    /// Win rate in percent. For tenpai this is the rate of the current
    /// waits, for one-shanten the average of the best tenpai reachable
    /// through each wait.
    pub avg_win_rate: f64,
    /// 0, [`POSSIBLE_FURITEN_RATE`] or 1.
    pub furiten_rate: f64,
    pub yakus: BTreeSet<Yaku>,
    pub dora_count: u8,

    pub ron_point: f64,
    pub riichi_ron_point: f64,
    /// Not estimated yet; always 0.
    pub tsumo_point: f64,
}

/// Approximates the probability of advancing twice within the lookahead:
/// first with `waits_count` good draws, then with `avg_next_waits`.
#[must_use]
pub fn mixed_waits_score(waits_count: u32, avg_next_waits: f64, left_count: u32) -> f64 {
    if waits_count == 0 || avg_next_waits == 0. || left_count == 0 {
        return 0.;
    }
    let n = MIXED_SCORE_LOOKAHEAD_TURNS;
    let left = left_count as f64;
    let p2 = waits_count as f64 / left;
    let p1 = avg_next_waits / left;
    let (q2, q1) = (1. - p2, 1. - p1);

    let result = if (q2 - q1).abs() < 1e-9 {
        // both stages equally likely
        1. - q2.powi(n) * (1. + n as f64 * p2)
    } else {
        let sum2 = q2 * (1. - q2.powi(n)) / p2;
        let sum1 = q1 * (1. - q1.powi(n)) / p1;
        p2 * p1 * (sum2 - sum1) / (q2 - q1)
    };
    result * 100.
}

fn count_pairs(tiles: &[u8; TILE_KINDS]) -> i8 {
    tiles.iter().filter(|&&c| c >= 2).count() as i8
}

impl Analyzer<'_> {
    /// Adds the yaku of every wait with copies left. `player` is tenpai.
    fn collect_yakus(&self, player: &mut PlayerInfo, waits: &Waits, yakus: &mut BTreeSet<Yaku>) {
        for (tile, _) in waits.iter().filter(|&(_, left)| left > 0) {
            let won = player.add_win_tile(tile);
            yakus.extend(self.yaku_checker.find_yakus(&won));
        }
    }

    /// Analyzes a 3n+1 hand: waits, next-stage waits, improves and the
    /// statistics derived from them. The unseen pool is filled first if
    /// empty. `player` is left exactly as it was given.
    pub fn analyze13(&self, player: &mut PlayerInfo) -> Analysis13 {
        player.ensure_left_tiles();
        debug_assert_eq!(player.tile_count() % 3, 1);

        let (shanten, waits) = calc_shanten_and_waits13(player.hand(), Some(player.left_tiles()));
        let waits_count = waits.all_count();

        let mut next_shanten_waits = BTreeMap::new();
        let mut improves = BTreeMap::new();
        let mut improve_way_count = 0;
        // waits after drawing each tile, non-improving draws keep the current
        let mut max_improve_waits = [waits_count; TILE_KINDS];
        let mut avg_win_rate = 0.;

        let mut yakus = BTreeSet::new();
        if !player.is_naki() && count_pairs(player.hand()) + shanten == 6 {
            let hint = match shanten {
                1 | 2 => true,
                3 => waits_count <= CHIITOI_HINT_MAX_WAITS,
                _ => false,
            };
            if hint {
                yakus.insert(Yaku::Chiitoitsu);
            }
        }
        if shanten == 0 {
            self.collect_yakus(player, &waits, &mut yakus);
        }

        for tile in Tile::all() {
            let i = tile.as_usize();
            if player.left_tiles()[i] == 0 {
                continue;
            }
            let mut drawn = player.draw(tile);

            if waits.contains(tile) {
                let mut best_next = 0;
                let mut max_win_rate = 0_f64;
                for discard in Tile::all() {
                    if discard == tile || drawn.hand()[discard.as_usize()] == 0 {
                        continue;
                    }
                    let red = drawn.is_only_red_five(discard);
                    let mut discarded = drawn.discard(discard, red);
                    let (new_shanten, new_waits) =
                        calc_shanten_and_waits13(discarded.hand(), Some(discarded.left_tiles()));
                    if new_shanten >= shanten {
                        continue;
                    }
                    best_next = best_next.max(new_waits.all_count());
                    if new_shanten == 0 {
                        let rate = self.win_rate.win_rate(&new_waits, &discarded.discards);
                        max_win_rate = max_win_rate.max(rate);
                        self.collect_yakus(&mut discarded, &new_waits, &mut yakus);
                    }
                }
                if best_next > 0 {
                    next_shanten_waits.insert(tile, best_next);
                }
                // the drawn copy counts too
                let weight = drawn.left_tiles()[i] as f64 + 1.;
                avg_win_rate += max_win_rate * weight;
            } else {
                for discard in Tile::all() {
                    if discard == tile || drawn.hand()[discard.as_usize()] == 0 {
                        continue;
                    }
                    let red = drawn.is_only_red_five(discard);
                    let discarded = drawn.discard(discard, red);
                    let (new_shanten, new_waits) =
                        calc_shanten_and_waits13(discarded.hand(), Some(discarded.left_tiles()));
                    let count = new_waits.all_count();
                    if new_shanten != shanten || count <= waits_count {
                        continue;
                    }
                    improve_way_count += 1;
                    if count > max_improve_waits[i] {
                        max_improve_waits[i] = count;
                        improves.insert(tile, new_waits);
                    }
                }
            }
        }

        let mut ron_point = 0.;
        let mut riichi_ron_point = 0.;
        if waits_count > 0 {
            avg_win_rate /= waits_count as f64;
            if shanten == 0 {
                avg_win_rate = self.win_rate.win_rate(&waits, &player.discards);
                ron_point = self.point_estimator.avg_ron_point(player, &waits);
                riichi_ron_point = self.point_estimator.avg_riichi_ron_point(player, &waits);
            }
        }

        // riichi needs no particular shape
        if yakus.is_empty() && shanten == 0 && !player.is_naki() {
            yakus.insert(Yaku::Riichi);
        }

        let mut furiten_rate = 0.;
        if shanten <= 1 && player.discards.iter().any(|&d| waits.contains(d)) {
            if shanten == 0 {
                furiten_rate = 1.;
                avg_win_rate *= FURITEN_WIN_RATE_MULTIPLIER;
            } else {
                furiten_rate = POSSIBLE_FURITEN_RATE;
            }
        }
        if furiten_rate >= 1. || shanten > 1 {
            ron_point = 0.;
            riichi_ron_point = 0.;
        } else if player.is_naki() {
            riichi_ron_point = 0.;
        }

        let left = player.left_tiles();
        let mut avg_next_shanten_waits = 0.;
        if !next_shanten_waits.is_empty() {
            let (sum, weight) = next_shanten_waits.iter().fold((0, 0), |(sum, weight), (t, &c)| {
                let w = left[t.as_usize()] as u32;
                (sum + w * c, weight + w)
            });
            avg_next_shanten_waits = sum as f64 / weight as f64;
        }
        let mut avg_improve_waits = waits_count as f64;
        if !improves.is_empty() {
            let (sum, weight) = left
                .iter()
                .zip(max_improve_waits)
                .fold((0, 0), |(sum, weight), (&w, c)| (sum + w as u32 * c, weight + w as u32));
            avg_improve_waits = sum as f64 / weight as f64;
        }
        let left_count = left.iter().map(|&l| l as u32).sum();
        let mixed_score = mixed_waits_score(waits_count, avg_next_shanten_waits, left_count);

        log::trace!(
            "analyze13 {player}: shanten {shanten}, {waits}, {} improves",
            improves.len(),
        );

        Analysis13 {
            tiles34: *player.hand(),
            left_tiles34: *left,
            is_naki: player.is_naki(),
            shanten,
            waits,
            next_shanten_waits,
            avg_next_shanten_waits,
            mixed_score,
            improves,
            improve_way_count,
            avg_improve_waits,
            avg_win_rate,
            furiten_rate,
            yakus,
            dora_count: player.count_dora(),
            ron_point,
            riichi_ron_point,
            tsumo_point: 0.,
        }
    }
}

impl fmt::Display for Analysis13 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} ({}) kinds, {:.2} improve waits]",
            self.waits,
            self.improves.len(),
            self.improve_way_count,
            self.avg_improve_waits,
        )?;
        if self.shanten >= 1 {
            write!(
                f,
                " {:.2} {} waits ({:.2} mixed)",
                self.avg_next_shanten_waits,
                shanten_to_string(self.shanten - 1),
                self.mixed_score,
            )?;
        }
        if (0..=1).contains(&self.shanten) {
            write!(f, " ({:.2}% win rate)", self.avg_win_rate)?;
            if self.furiten_rate >= 1. {
                f.write_str("[furiten]")?;
            } else if self.furiten_rate > 0. {
                f.write_str("[possible furiten]")?;
            }
            if !self.yakus.is_empty() {
                write!(f, " [{}]", yakus_to_string(self.yakus.iter().copied()))?;
            }
            if self.dora_count > 0 {
                write!(f, " [dora {}]", self.dora_count)?;
            }
        }
        if self.ron_point > 0. {
            write!(f, " [ron {}]", self.ron_point.round())?;
        }
        if self.riichi_ron_point > 0. {
            write!(f, " [riichi ron {}]", self.riichi_ron_point.round())?;
        }
        if self.tsumo_point > 0. {
            write!(f, " [tsumo {}]", self.tsumo_point.round())?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    fn analyze(s: &str, setup: impl FnOnce(&mut PlayerInfo)) -> Analysis13 {
        let mut player = PlayerInfo::from_hand_str(s).unwrap();
        setup(&mut player);
        player.fill_left_tiles();
        let before = player.clone();
        let ret = Analyzer::default().analyze13(&mut player);
        assert_eq!(player, before, "{s} was not restored");
        ret
    }

    #[test]
    pub fn tenpai() {
        let r = analyze("123456789m 1135s", |_| ());
        assert_eq!(r.shanten, 0);
        assert_eq!(r.waits.all_count(), 4);
        assert!(r.next_shanten_waits.is_empty());
        assert_eq!(r.mixed_score, 0.);
        assert!((r.avg_win_rate - 31.0).abs() < 1e-9);
        assert_eq!(r.yakus, BTreeSet::from([Yaku::Ittsuu]));
        assert_eq!(r.furiten_rate, 0.);
        // dealer, ittsuu 2 han 40 fu
        assert_eq!(r.ron_point, 3900.);
        assert_eq!(r.riichi_ron_point, 7700.);
        assert_eq!(r.tsumo_point, 0.);
    }

    #[test]
    pub fn furiten_discount() {
        // same pool, the 4s seen elsewhere
        let base = analyze("123456789m 1135s", |p| p.visible[21] = 1);
        assert_eq!(base.furiten_rate, 0.);
        let r = analyze("123456789m 1135s", |p| p.discards.push("4s".parse().unwrap()));
        assert_eq!(r.furiten_rate, 1.);
        assert!((r.avg_win_rate - base.avg_win_rate * FURITEN_WIN_RATE_MULTIPLIER).abs() < 1e-9);
        assert_eq!(r.ron_point, 0.);
        assert_eq!(r.riichi_ron_point, 0.);
    }

    #[test]
    pub fn riichi_fallback() {
        let r = analyze("123m 456p 789s 11z 46m", |p| p.seat_wind = "S".parse().unwrap());
        assert_eq!(r.yakus, BTreeSet::from([Yaku::Riichi]));
        assert_eq!(r.ron_point, 0.);
        assert_eq!(r.riichi_ron_point, 1300.);
    }

    #[test]
    pub fn one_shanten() {
        let r = analyze("3456m 3456s 44456p", |_| ());
        assert_eq!(r.shanten, 1);
        assert_eq!(r.waits.all_count(), 61);
        assert!(!r.next_shanten_waits.is_empty());
        assert!(r.next_shanten_waits.keys().all(|&t| r.waits.contains(t)));
        assert!(r.avg_next_shanten_waits > 0.);
        assert!(r.mixed_score > 0.);
        assert!(r.avg_win_rate > 0.);
        assert_eq!(r.ron_point, 0.);

        let r = analyze("3456m 3456s 44456p", |p| p.discards.push("7p".parse().unwrap()));
        assert_eq!(r.furiten_rate, POSSIBLE_FURITEN_RATE);
    }

    #[test]
    pub fn improves() {
        let r = analyze("11357m 13579p 135s", |_| ());
        assert_eq!(r.shanten, 3);
        assert_eq!(r.waits.all_count(), 32);
        assert!(r.improves.values().all(|w| w.all_count() > 32));
        assert!(r.improve_way_count as usize >= r.improves.len());

        // kanchan 4s: 1s makes 1113s, 2s makes 1123s and 6s makes 3456s
        let r = analyze("123456789m 1135s", |_| ());
        assert_eq!(r.waits.all_count(), 4);
        let improves: Vec<_> = r
            .improves
            .iter()
            .map(|(t, w)| (t.to_string(), w.all_count()))
            .collect();
        assert_eq!(
            improves,
            [("1s".to_owned(), 7), ("2s".to_owned(), 6), ("6s".to_owned(), 8)]
        );
        let ryanmen = &r.improves[&"6s".parse::<Tile>().unwrap()];
        assert_eq!(ryanmen.len(), 2);
        assert_eq!(ryanmen.get("4s".parse().unwrap()), Some(4));
        assert_eq!(ryanmen.get("7s".parse().unwrap()), Some(4));
        assert_eq!(r.improve_way_count, 3);
        // 123 left: 2 copies of 1s at 7, 4 of 2s at 6, 4 of 6s at 8, the rest at 4
        assert!((r.avg_improve_waits - 522. / 123.).abs() < 1e-9);
    }

    #[test]
    pub fn chiitoi_hint() {
        let r = analyze("1122m 3344p 55s 567z", |_| ());
        assert_eq!(r.shanten, 1);
        assert!(r.yakus.contains(&Yaku::Chiitoitsu));
    }

    #[test]
    pub fn open_hand() {
        let r = analyze("1234p", |p| p.push_meld("777z".parse().unwrap()).unwrap());
        assert!(r.is_naki);
        assert_eq!(r.shanten, 0);
        assert_eq!(r.waits.all_count(), 6);
        assert_eq!(r.riichi_ron_point, 0.);
    }

    #[test]
    pub fn mixed_score() {
        assert_eq!(mixed_waits_score(0, 10., 100), 0.);
        assert_eq!(mixed_waits_score(10, 0., 100), 0.);
        let near = mixed_waits_score(10, 10.000_01, 100);
        let equal = mixed_waits_score(10, 10., 100);
        assert!((near - equal).abs() < 1e-3);
        assert!(mixed_waits_score(20, 10., 100) > mixed_waits_score(10, 10., 100));
        assert!(equal > 0. && equal < 100.);
    }
}
