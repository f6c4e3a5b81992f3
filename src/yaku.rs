//! Yaku of a complete hand.
//!
//! The concealed part is decomposed into a pair plus triplets and runs; every
//! decomposition is scored and the best one wins. Seven pairs and thirteen
//! orphans are checked separately. Wins are assumed to be by ron.

use crate::algo::shanten;
use crate::state::{MeldKind, PlayerInfo};
use crate::tile::{FIRST_HONOR, TILE_KINDS};
use std::fmt;

use serde::Serialize;
use tinyvec::ArrayVec;

const HAKU: u8 = 31;
const HATSU: u8 = 32;
const CHUN: u8 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Yaku {
    Riichi,
    Tanyao,
    Pinfu,
    Iipeikou,
    SeatWind,
    RoundWind,
    Haku,
    Hatsu,
    Chun,
    Chiitoitsu,
    Toitoi,
    Sanankou,
    Sanshoku,
    Ittsuu,
    Chanta,
    Junchan,
    Honitsu,
    Chinitsu,
    Kokushi,
}

impl Yaku {
    #[must_use]
    pub const fn han(self, is_menzen: bool) -> u8 {
        let open_penalty = !is_menzen as u8;
        match self {
            Self::Riichi
            | Self::Tanyao
            | Self::Pinfu
            | Self::Iipeikou
            | Self::SeatWind
            | Self::RoundWind
            | Self::Haku
            | Self::Hatsu
            | Self::Chun => 1,
            Self::Chiitoitsu | Self::Toitoi | Self::Sanankou => 2,
            Self::Sanshoku | Self::Ittsuu | Self::Chanta => 2 - open_penalty,
            Self::Junchan | Self::Honitsu => 3 - open_penalty,
            Self::Chinitsu => 6 - open_penalty,
            Self::Kokushi => 13,
        }
    }

    #[must_use]
    pub const fn is_yakuman(self) -> bool {
        matches!(self, Self::Kokushi)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Riichi => "Riichi",
            Self::Tanyao => "Tanyao",
            Self::Pinfu => "Pinfu",
            Self::Iipeikou => "Iipeikou",
            Self::SeatWind => "Jikaze",
            Self::RoundWind => "Bakaze",
            Self::Haku => "Haku",
            Self::Hatsu => "Hatsu",
            Self::Chun => "Chun",
            Self::Chiitoitsu => "Chiitoitsu",
            Self::Toitoi => "Toitoi",
            Self::Sanankou => "Sanankou",
            Self::Sanshoku => "Sanshoku",
            Self::Ittsuu => "Ittsuu",
            Self::Chanta => "Half-Outside",
            Self::Junchan => "Fully-Outside",
            Self::Honitsu => "Honitsu",
            Self::Chinitsu => "Chinitsu",
            Self::Kokushi => "Thirteen-Orphans",
        }
    }
}

impl fmt::Display for Yaku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The best reading of a complete hand. Dora are not included in `han`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandValue {
    /// Sorted.
    pub yakus: Vec<Yaku>,
    pub han: u8,
    /// 25 for seven pairs, 0 for yakuman.
    pub fu: u8,
    pub yakuman: u8,
}

impl HandValue {
    const fn key(&self) -> (u8, u8, u8) {
        (self.yakuman, self.han, self.fu)
    }
}

/// Finds the yaku a complete hand would score.
pub trait YakuChecker: Send + Sync {
    /// `player` holds a complete hand with `win_tile` set. Returns an empty
    /// list when the hand is incomplete or has no yaku.
    fn find_yakus(&self, player: &PlayerInfo) -> Vec<Yaku>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardYakuChecker;

impl YakuChecker for StandardYakuChecker {
    fn find_yakus(&self, player: &PlayerInfo) -> Vec<Yaku> {
        self.evaluate(player).map(|v| v.yakus).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
struct Division {
    pair: u8,
    kotsu: ArrayVec<[u8; 4]>,
    shuntsu: ArrayVec<[u8; 4]>,
}

fn divide_sets(tiles: &mut [u8; TILE_KINDS], start: usize, div: &mut Division, out: &mut Vec<Division>) {
    let Some(i) = (start..TILE_KINDS).find(|&i| tiles[i] > 0) else {
        out.push(div.clone());
        return;
    };

    if tiles[i] >= 3 {
        tiles[i] -= 3;
        div.kotsu.push(i as u8);
        divide_sets(tiles, i, div, out);
        div.kotsu.pop();
        tiles[i] += 3;
    }
    if i < FIRST_HONOR as usize && i % 9 <= 6 && tiles[i + 1] > 0 && tiles[i + 2] > 0 {
        tiles[i] -= 1;
        tiles[i + 1] -= 1;
        tiles[i + 2] -= 1;
        div.shuntsu.push(i as u8);
        divide_sets(tiles, i, div, out);
        div.shuntsu.pop();
        tiles[i] += 1;
        tiles[i + 1] += 1;
        tiles[i + 2] += 1;
    }
}

fn divisions(hand: &[u8; TILE_KINDS]) -> Vec<Division> {
    let mut tiles = *hand;
    let mut ret = vec![];
    for pair in 0..TILE_KINDS {
        if tiles[pair] < 2 {
            continue;
        }
        tiles[pair] -= 2;
        let mut div = Division {
            pair: pair as u8,
            ..Default::default()
        };
        divide_sets(&mut tiles, 0, &mut div, &mut ret);
        tiles[pair] += 2;
    }
    ret
}

#[inline]
const fn is_yaokyuu(t: u8) -> bool {
    t >= FIRST_HONOR || t % 9 == 0 || t % 9 == 8
}

struct Context<'a> {
    player: &'a PlayerInfo,
    win: u8,
    is_menzen: bool,
    seat: u8,
    round: u8,
    pons: ArrayVec<[u8; 4]>,
    chis: ArrayVec<[u8; 4]>,
}

impl Context<'_> {
    fn is_yakuhai(&self, t: u8) -> bool {
        t >= HAKU || t == self.seat || t == self.round
    }

    /// Shared by both readings: riichi, tanyao and the one-suit yaku.
    fn common_yakus(&self, tiles: impl Iterator<Item = u8> + Clone, yakus: &mut Vec<Yaku>) {
        if self.player.is_riichi && self.is_menzen {
            yakus.push(Yaku::Riichi);
        }
        if tiles.clone().all(|t| !is_yaokyuu(t)) {
            yakus.push(Yaku::Tanyao);
        }

        let mut suits = [false; 3];
        let mut has_honor = false;
        for t in tiles {
            if t >= FIRST_HONOR {
                has_honor = true;
            } else {
                suits[t as usize / 9] = true;
            }
        }
        if suits.iter().filter(|&&s| s).count() == 1 {
            yakus.push(if has_honor { Yaku::Honitsu } else { Yaku::Chinitsu });
        }
    }

    fn chiitoi(&self) -> Option<HandValue> {
        let hand = self.player.hand();
        if !self.is_menzen || hand.iter().filter(|&&c| c == 2).count() != 7 {
            return None;
        }
        let pairs = (0..TILE_KINDS as u8).filter(|&t| hand[t as usize] == 2);
        let mut yakus = vec![Yaku::Chiitoitsu];
        self.common_yakus(pairs, &mut yakus);
        Some(self.finish(yakus, 25))
    }

    /// For ron: whether the winning tile has to complete a triplet rather than
    /// a run, which makes that triplet open.
    fn win_makes_minkou(&self, div: &Division) -> bool {
        if !div.kotsu.contains(&self.win) {
            return false;
        }
        if self.win >= FIRST_HONOR {
            return true;
        }
        let kind = self.win / 9;
        let num = self.win % 9;
        let low = kind * 9 + num.saturating_sub(2);
        let high = kind * 9 + num.min(6);
        !(low..=high).any(|t| div.shuntsu.contains(&t))
    }

    fn regular(&self, div: &Division) -> HandValue {
        let all_kotsu: ArrayVec<[u8; 4]> = div.kotsu.iter().chain(&self.pons).copied().collect();
        let all_shuntsu: ArrayVec<[u8; 4]> = div.shuntsu.iter().chain(&self.chis).copied().collect();
        let tiles = all_kotsu
            .iter()
            .copied()
            .chain(all_shuntsu.iter().flat_map(|&s| [s, s + 1, s + 2]))
            .chain([div.pair]);
        let minkou = self.win_makes_minkou(div);

        let mut yakus = vec![];
        self.common_yakus(tiles, &mut yakus);

        let has_pinfu = self.is_menzen
            && div.shuntsu.len() == 4
            && !self.is_yakuhai(div.pair)
            && div.shuntsu.iter().any(|&s| {
                let num = s % 9;
                num <= 5 && s == self.win || num >= 1 && s + 2 == self.win
            });
        if has_pinfu {
            yakus.push(Yaku::Pinfu);
        }

        if self.is_menzen && (0..div.shuntsu.len()).any(|i| div.shuntsu[i + 1..].contains(&div.shuntsu[i])) {
            yakus.push(Yaku::Iipeikou);
        }

        for &k in &all_kotsu {
            if k == self.seat {
                yakus.push(Yaku::SeatWind);
            }
            if k == self.round {
                yakus.push(Yaku::RoundWind);
            }
            match k {
                HAKU => yakus.push(Yaku::Haku),
                HATSU => yakus.push(Yaku::Hatsu),
                CHUN => yakus.push(Yaku::Chun),
                _ => (),
            }
        }

        if all_shuntsu.is_empty() {
            yakus.push(Yaku::Toitoi);
        }
        if div.kotsu.len() - minkou as usize >= 3 {
            yakus.push(Yaku::Sanankou);
        }

        let mut by_num = [0_u8; 9];
        let mut by_kind = [0_u8; 3];
        for &s in &all_shuntsu {
            let kind = s / 9;
            let num = s % 9;
            by_num[num as usize] |= 1 << kind;
            match num {
                0 => by_kind[kind as usize] |= 0b001,
                3 => by_kind[kind as usize] |= 0b010,
                6 => by_kind[kind as usize] |= 0b100,
                _ => (),
            }
        }
        if by_num.contains(&0b111) {
            yakus.push(Yaku::Sanshoku);
        }
        if by_kind.contains(&0b111) {
            yakus.push(Yaku::Ittsuu);
        }

        let is_outside = !all_shuntsu.is_empty()
            && all_shuntsu.iter().all(|&s| s % 9 == 0 || s % 9 == 6)
            && all_kotsu.iter().chain([&div.pair]).all(|&k| is_yaokyuu(k));
        if is_outside {
            let has_honor = all_kotsu.iter().chain([&div.pair]).any(|&k| k >= FIRST_HONOR);
            yakus.push(if has_honor { Yaku::Chanta } else { Yaku::Junchan });
        }

        let fu = self.calc_fu(div, minkou, has_pinfu);
        self.finish(yakus, fu)
    }

    fn calc_fu(&self, div: &Division, minkou: bool, has_pinfu: bool) -> u8 {
        let mut fu = 20;
        fu += div
            .kotsu
            .iter()
            .map(|&t| match (minkou && t == self.win, is_yaokyuu(t)) {
                (false, true) => 8,
                (false, false) | (true, true) => 4,
                (true, false) => 2,
            })
            .sum::<u8>();
        fu += self.pons.iter().map(|&t| if is_yaokyuu(t) { 4 } else { 2 }).sum::<u8>();
        if div.pair >= HAKU {
            fu += 2;
        } else {
            if div.pair == self.round {
                fu += 2;
            }
            if div.pair == self.seat {
                fu += 2;
            }
        }

        if fu == 20 {
            return if !self.is_menzen || has_pinfu { 30 } else { 40 };
        }
        if self.is_menzen {
            fu += 10;
        }
        if !minkou {
            let is_closed_wait = div.pair == self.win
                || div.shuntsu.iter().any(|&s| {
                    s + 1 == self.win || s % 9 == 0 && s + 2 == self.win || s % 9 == 6 && s == self.win
                });
            if is_closed_wait {
                fu += 2;
            }
        }
        fu.div_ceil(10) * 10
    }

    fn finish(&self, mut yakus: Vec<Yaku>, fu: u8) -> HandValue {
        yakus.sort_unstable();
        let han = yakus.iter().map(|y| y.han(self.is_menzen)).sum();
        HandValue {
            yakus,
            han,
            fu,
            yakuman: 0,
        }
    }
}

impl StandardYakuChecker {
    /// The best reading of the complete hand in `player`, or `None` if the
    /// hand is not complete, has no yaku, or `win_tile` is unset.
    #[must_use]
    pub fn evaluate(&self, player: &PlayerInfo) -> Option<HandValue> {
        let win = player.win_tile()?.as_u8();
        let hand = player.hand();
        if hand.iter().sum::<u8>() as usize + player.melds().len() * 3 != 14 {
            return None;
        }

        let is_menzen = !player.is_naki();
        if is_menzen && shanten::calc_kokushi(hand) == -1 {
            return Some(HandValue {
                yakus: vec![Yaku::Kokushi],
                han: 0,
                fu: 0,
                yakuman: 1,
            });
        }

        let ctx = Context {
            player,
            win,
            is_menzen,
            seat: player.seat_wind.as_u8(),
            round: player.round_wind.as_u8(),
            pons: meld_starts(player, MeldKind::Pon),
            chis: meld_starts(player, MeldKind::Chi),
        };

        divisions(hand)
            .iter()
            .map(|div| ctx.regular(div))
            .chain(ctx.chiitoi())
            .filter(|v| !v.yakus.is_empty())
            .max_by_key(HandValue::key)
    }
}

fn meld_starts(player: &PlayerInfo, kind: MeldKind) -> ArrayVec<[u8; 4]> {
    player
        .melds()
        .iter()
        .filter(|m| m.kind == kind)
        .map(|m| m.tiles[0].as_u8())
        .collect()
}

/// Comma-separated yaku names.
#[must_use]
pub fn yakus_to_string(yakus: impl IntoIterator<Item = Yaku>) -> String {
    yakus.into_iter().map(Yaku::name).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
pub mod test {
    use super::*;

    fn check(hand: &str, win: &str, setup: impl FnOnce(&mut PlayerInfo)) -> Option<HandValue> {
        let mut player = PlayerInfo::from_hand_str(hand).unwrap();
        setup(&mut player);
        let won = player.add_win_tile(win.parse().unwrap());
        StandardYakuChecker.evaluate(&won)
    }

    #[test]
    pub fn pinfu_ittsuu() {
        let v = check("123456789m 34s 55p", "2s", |_| ()).unwrap();
        assert_eq!(v.yakus, [Yaku::Pinfu, Yaku::Ittsuu]);
        assert_eq!((v.han, v.fu), (3, 30));
    }

    #[test]
    pub fn chiitoi() {
        let v = check("2233m 4466p 5577s 8m", "8m", |_| ()).unwrap();
        assert_eq!(v.yakus, [Yaku::Tanyao, Yaku::Chiitoitsu]);
        assert_eq!((v.han, v.fu), (3, 25));
    }

    #[test]
    pub fn yakuhai_and_riichi() {
        let v = check("123m 456p 789s 11z 55z", "5z", |_| ()).unwrap();
        assert_eq!(v.yakus, [Yaku::Haku]);

        assert!(check("123m 456p 789s 11z 46m", "5m", |_| ()).is_none());
        let v = check("123m 456p 789s 11z 46m", "5m", |p| p.is_riichi = true).unwrap();
        assert_eq!(v.yakus, [Yaku::Riichi]);
        // double wind pair, kanchan, menzen ron
        assert_eq!(v.fu, 40);
    }

    #[test]
    pub fn open_honitsu() {
        let v = check("234567m 99m 22z", "9m", |p| p.push_meld("777z".parse().unwrap()).unwrap()).unwrap();
        assert_eq!(v.yakus, [Yaku::Chun, Yaku::Honitsu]);
        assert_eq!(v.han, 3);
    }

    #[test]
    pub fn kokushi() {
        let v = check("19m 19p 19s 1234567z", "1m", |_| ()).unwrap();
        assert_eq!(v.yakuman, 1);
        assert_eq!(v.yakus, [Yaku::Kokushi]);
    }

    #[test]
    pub fn incomplete() {
        assert!(check("123456789m 34s 56p", "2s", |_| ()).is_none());
        let player = PlayerInfo::from_hand_str("123456789m 234s 55p").unwrap();
        assert!(StandardYakuChecker.find_yakus(&player).is_empty());
    }
}
