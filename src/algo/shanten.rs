//! Shanten calculation.
//!
//! The normal form is solved per suit: every suit's counts are decomposed
//! into sets, incomplete blocks and an optional head, keeping only the
//! Pareto-optimal `(sets, blocks)` pairs. Suits are independent apart from
//! the single head, so the per-suit results are combined afterwards. Suit
//! results are memoized in a thread-local cache keyed by the base-5 encoding
//! of the suit's counts, which makes repeated calls during the exhaustive
//! search cheap.

use crate::tile::TILE_KINDS;
use std::cell::RefCell;

use ahash::AHashMap;
use tinyvec::{ArrayVec, array_vec};

/// Entries kept before the cache is dropped and rebuilt.
const SUIT_CACHE_LIMIT: usize = 1 << 20;

const HONOR_KEY_FLAG: u32 = 1 << 24;

const KOKUSHI_TILES: [usize; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Blocks {
    mentsu: u8,
    taatsu: u8,
    has_head: bool,
}

type Options = ArrayVec<[Blocks; 16]>;

thread_local! {
    static SUIT_CACHE: RefCell<AHashMap<u32, Options>> = RefCell::new(AHashMap::new());
}

fn insert_pareto(options: &mut Options, b: Blocks) {
    let dominated = options
        .iter()
        .any(|o| o.has_head == b.has_head && o.mentsu >= b.mentsu && o.taatsu >= b.taatsu);
    if dominated {
        return;
    }
    options.retain(|o| !(o.has_head == b.has_head && o.mentsu <= b.mentsu && o.taatsu <= b.taatsu));
    options.push(b);
}

fn encode(counts: &[u8], is_honor: bool) -> u32 {
    let key = counts.iter().fold(0, |acc, &c| acc * 5 + c as u32);
    if is_honor { key | HONOR_KEY_FLAG } else { key }
}

/// Decomposes `counts` (one suit, or the honors) starting from its lowest
/// non-empty slot. `counts` is restored before returning.
fn suit_options(counts: &mut [u8], is_honor: bool, cache: &mut AHashMap<u32, Options>) -> Options {
    let key = encode(counts, is_honor);
    if let Some(options) = cache.get(&key) {
        return options.clone();
    }

    let Some(i) = counts.iter().position(|&c| c > 0) else {
        return array_vec!([Blocks; 16] => Blocks::default());
    };
    let n = counts.len();
    let can_run = |counts: &[u8], offset: usize| !is_honor && i + offset < n && counts[i + offset] > 0;

    let mut ret = Options::default();
    let extend = |sub: &Options, f: &dyn Fn(Blocks) -> Option<Blocks>, ret: &mut Options| {
        for b in sub.iter().copied().filter_map(f) {
            insert_pareto(ret, b);
        }
    };

    if counts[i] >= 2 {
        counts[i] -= 2;
        let sub = suit_options(counts, is_honor, cache);
        extend(&sub, &|b| (!b.has_head).then_some(Blocks { has_head: true, ..b }), &mut ret);
        extend(&sub, &|b| Some(Blocks { taatsu: b.taatsu + 1, ..b }), &mut ret);
        counts[i] += 2;
    }
    if counts[i] >= 3 {
        counts[i] -= 3;
        let sub = suit_options(counts, is_honor, cache);
        extend(&sub, &|b| Some(Blocks { mentsu: b.mentsu + 1, ..b }), &mut ret);
        counts[i] += 3;
    }
    if can_run(counts, 1) && can_run(counts, 2) {
        counts[i] -= 1;
        counts[i + 1] -= 1;
        counts[i + 2] -= 1;
        let sub = suit_options(counts, is_honor, cache);
        extend(&sub, &|b| Some(Blocks { mentsu: b.mentsu + 1, ..b }), &mut ret);
        counts[i] += 1;
        counts[i + 1] += 1;
        counts[i + 2] += 1;
    }
    for offset in [1, 2] {
        if can_run(counts, offset) {
            counts[i] -= 1;
            counts[i + offset] -= 1;
            let sub = suit_options(counts, is_honor, cache);
            extend(&sub, &|b| Some(Blocks { taatsu: b.taatsu + 1, ..b }), &mut ret);
            counts[i] += 1;
            counts[i + offset] += 1;
        }
    }
    // isolated
    counts[i] -= 1;
    let sub = suit_options(counts, is_honor, cache);
    extend(&sub, &Some, &mut ret);
    counts[i] += 1;

    if cache.len() >= SUIT_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(key, ret.clone());
    ret
}

/// Shanten of the normal (sets + head) form. `len_div3` is the number of sets
/// still to be formed in hand, i.e. `tile_count / 3`, and must be within
/// [0, 4].
#[must_use]
pub fn calc_normal(tiles: &[u8; TILE_KINDS], len_div3: u8) -> i8 {
    debug_assert!(len_div3 <= 4);
    let m = len_div3 as i8;
    SUIT_CACHE.with_borrow_mut(|cache| {
        let mut acc: Options = array_vec!([Blocks; 16] => Blocks::default());
        for (start, end, is_honor) in [(0, 9, false), (9, 18, false), (18, 27, false), (27, 34, true)] {
            let mut counts = [0; 9];
            let suit = &mut counts[..end - start];
            suit.copy_from_slice(&tiles[start..end]);
            let options = suit_options(suit, is_honor, cache);

            let mut next = Options::default();
            for a in &acc {
                for b in &options {
                    if a.has_head && b.has_head {
                        continue;
                    }
                    let merged = Blocks {
                        mentsu: a.mentsu + b.mentsu,
                        taatsu: a.taatsu + b.taatsu,
                        has_head: a.has_head || b.has_head,
                    };
                    insert_pareto(&mut next, merged);
                }
            }
            acc = next;
        }

        acc.iter()
            .map(|b| {
                let mentsu = (b.mentsu as i8).min(m);
                let taatsu = (b.taatsu as i8).min(m - mentsu);
                2 * (m - mentsu) - taatsu - b.has_head as i8
            })
            .min()
            .unwrap_or(2 * m)
    })
}

/// Seven pairs shanten. Only meaningful for a closed 13/14-tile hand.
#[must_use]
pub fn calc_chitoi(tiles: &[u8; TILE_KINDS]) -> i8 {
    let mut pairs = 0;
    let mut kinds = 0;
    tiles.iter().filter(|&&c| c > 0).for_each(|&c| {
        kinds += 1;
        if c >= 2 {
            pairs += 1;
        }
    });

    let redunct = 7_u8.saturating_sub(kinds) as i8;
    7 - pairs + redunct - 1
}

/// Thirteen orphans shanten. Only meaningful for a closed 13/14-tile hand.
#[must_use]
pub fn calc_kokushi(tiles: &[u8; TILE_KINDS]) -> i8 {
    let mut has_pair = false;
    let mut kinds = 0;
    for &i in &KOKUSHI_TILES {
        let c = tiles[i];
        if c > 0 {
            kinds += 1;
            if c >= 2 {
                has_pair = true;
            }
        }
    }

    14 - kinds - has_pair as i8 - 1
}

/// Best of the normal form, seven pairs and thirteen orphans. The latter two
/// only apply when `len_div3 == 4`, i.e. nothing has been called.
#[must_use]
pub fn calc_all(tiles: &[u8; TILE_KINDS], len_div3: u8) -> i8 {
    let mut shanten = calc_normal(tiles, len_div3);
    if shanten <= 0 || len_div3 < 4 {
        return shanten;
    }

    shanten = shanten.min(calc_chitoi(tiles));
    if shanten > 0 {
        shanten.min(calc_kokushi(tiles))
    } else {
        shanten
    }
}

/// `calc_all` with `len_div3` derived from the tile count. Valid for
/// 3n+1 and 3n+2 hands: -1 is a complete hand, 0 is tenpai.
#[inline]
#[must_use]
pub fn shanten(tiles: &[u8; TILE_KINDS]) -> i8 {
    let len: u8 = tiles.iter().sum();
    calc_all(tiles, len / 3)
}

#[must_use]
pub fn shanten_to_string(shanten: i8) -> String {
    match shanten {
        ..=-1 => "complete".to_owned(),
        0 => "tenpai".to_owned(),
        n => format!("{n}-shanten"),
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::hand::hand;

    fn sht(s: &str) -> i8 {
        shanten(&hand(s).unwrap())
    }

    #[test]
    pub fn normal_form() {
        assert_eq!(sht("11357m 13579p 135s"), 3);
        assert_eq!(sht("123456789m 1135s"), 0);
        assert_eq!(sht("123456789m 1134s"), 0);
        assert_eq!(sht("123456789m 1234z"), 2);
        assert_eq!(sht("3456m 3456s 44456p"), 1);
        assert_eq!(sht("123456789m 11345s"), -1);
        assert_eq!(sht("123m 456m 789m 11p 22p"), 0);
    }

    #[test]
    pub fn called_hands() {
        assert_eq!(sht("1234p"), 0);
        assert_eq!(sht("1234z"), 2);
        assert_eq!(sht("5p"), 0);
        assert_eq!(sht("55p"), -1);
        assert_eq!(sht("35p"), 0);
        assert_eq!(sht("12345p"), 0);
    }

    #[test]
    pub fn chitoi_and_kokushi() {
        let tiles = hand("11335577m 1122z 3z").unwrap();
        assert_eq!(calc_chitoi(&tiles), 0);
        assert_eq!(shanten(&tiles), 0);

        let tiles = hand("19m 19p 19s 1234567z").unwrap();
        assert_eq!(calc_kokushi(&tiles), 0);
        assert_eq!(shanten(&tiles), 0);

        let tiles = hand("19m 19p 19s 12345677z").unwrap();
        assert_eq!(shanten(&tiles), -1);

        // four of a kind is a single pair for seven pairs
        let tiles = hand("1111m 2233p 4455s 66z").unwrap();
        assert_eq!(calc_chitoi(&tiles), 1);
    }

    #[test]
    pub fn pure_suit() {
        assert_eq!(sht("1112345678999m"), 0);
        assert_eq!(sht("1112345678999m 5m"), -1);
        assert_eq!(sht("2233445566778m"), 0);
    }

    #[test]
    pub fn adding_a_tile_never_increases_shanten() {
        for s in [
            "11357m 13579p 135s",
            "123456789m 1234z",
            "3456m 3456s 44456p",
            "1m 258p 258s 123456z",
            "2479999m 4567p 13s",
        ] {
            let mut tiles = hand(s).unwrap();
            assert_eq!(tiles.iter().sum::<u8>() % 3, 1, "{s}");
            let before = shanten(&tiles);
            for i in 0..TILE_KINDS {
                if tiles[i] == 4 {
                    continue;
                }
                tiles[i] += 1;
                assert!(shanten(&tiles) <= before, "{s} + {i}");
                tiles[i] -= 1;
            }
        }
    }
}
