//! Calling another player's discard.

use super::Analyzer;
use super::discard::{Analysis14, Candidate14, sort_candidates};
use super::shanten;
use crate::state::{Meld, MeldKind, PlayerInfo};
use crate::tile::{TILE_KINDS, Tile};

use tinyvec::ArrayVec;

/// Every way to call `called` with `tiles`: pon first, then chi with the
/// called tile on the right, in the middle and on the left.
#[must_use]
pub fn meld_combinations(
    tiles: &[u8; TILE_KINDS],
    called: Tile,
    red: bool,
    allow_chi: bool,
) -> ArrayVec<[Meld; 4]> {
    let mut ret = ArrayVec::new();
    if tiles[called.as_usize()] >= 2 {
        ret.push(Meld::pon(called, red));
    }
    if !allow_chi || called.is_jihai() {
        return ret;
    }

    let c = called.as_u8();
    let n = called.num();
    let mut check = |a: u8, b: u8| {
        if tiles[a as usize] > 0 && tiles[b as usize] > 0 {
            ret.push(Meld::chi(
                Tile::new_unchecked(a),
                Tile::new_unchecked(b),
                called,
                red,
            ));
        }
    };
    if n >= 2 {
        check(c - 2, c - 1);
    }
    if (1..=7).contains(&n) {
        check(c - 1, c + 1);
    }
    if n <= 6 {
        check(c + 1, c + 2);
    }
    ret
}

/// Best shanten reachable by any of `melds`.
#[must_use]
pub fn calc_meld_shanten(tiles: &[u8; TILE_KINDS], melds: &[Meld]) -> Option<i8> {
    melds
        .iter()
        .map(|meld| {
            let mut tiles = *tiles;
            for t in meld.self_tiles {
                tiles[t.as_usize()] -= 1;
            }
            shanten::shanten(&tiles)
        })
        .min()
}

/// The run-extending discard a chi forbids besides the called tile itself,
/// e.g. 1m after calling 4m with 23m.
#[must_use]
pub fn suji_kuikae(meld: &Meld) -> Option<Tile> {
    if meld.kind != MeldKind::Chi {
        return None;
    }
    let c = meld.called_tile;
    let [a, b] = meld.self_tiles;
    if a < c && b < c && c.num() >= 3 {
        Some(Tile::new_unchecked(c.as_u8() - 3))
    } else if a > c && b > c && c.num() <= 5 {
        Some(Tile::new_unchecked(c.as_u8() + 3))
    } else {
        None
    }
}

impl Analyzer<'_> {
    /// Analyzes calling `called` (red if `red`) and discarding afterwards,
    /// over every legal pon and, if `allow_chi`, chi. `None` if nothing can
    /// be called.
    ///
    /// The called tile is not taken out of the pool; it is expected to be
    /// counted as visible already.
    pub fn evaluate_call(
        &self,
        player: &mut PlayerInfo,
        called: Tile,
        red: bool,
        allow_chi: bool,
    ) -> Option<Analysis14> {
        player.ensure_left_tiles();

        let melds = meld_combinations(player.hand(), called, red, allow_chi);
        let min_shanten = calc_meld_shanten(player.hand(), &melds)?;
        log::debug!("call {called} on {player}: {} ways, best shanten {min_shanten}", melds.len());

        let mut preserving = vec![];
        let mut regressing = vec![];
        for meld in melds {
            let mut called_player = player.add_meld(meld);
            let analysis = self.analyze14(&mut called_player);
            drop(called_player);

            let banned = suji_kuikae(&meld);
            let allowed = |c: &Candidate14| c.discard != called && Some(c.discard) != banned;
            if analysis.shanten == min_shanten {
                let filtered = keep(analysis.preserving, &meld, &allowed, &mut preserving)
                    + keep(analysis.regressing, &meld, &allowed, &mut regressing);
                log::trace!("{meld}: {filtered} discards forbidden");
            } else if analysis.shanten == min_shanten + 1 {
                let filtered = keep(analysis.preserving, &meld, &allowed, &mut regressing);
                log::trace!("{meld}: {filtered} discards forbidden");
            }
        }

        sort_candidates(&mut preserving, false);
        sort_candidates(&mut regressing, false);
        Some(Analysis14 {
            shanten: min_shanten,
            preserving,
            regressing,
        })
    }
}

/// Moves the allowed candidates of `bucket` into `into`, tagged with the
/// meld's tiles. Returns how many were dropped.
fn keep(
    bucket: Vec<Candidate14>,
    meld: &Meld,
    allowed: &impl Fn(&Candidate14) -> bool,
    into: &mut Vec<Candidate14>,
) -> usize {
    let total = bucket.len();
    let before = into.len();
    into.extend(bucket.into_iter().filter(|c| allowed(c)).map(|mut c| {
        c.open_tiles = Some(meld.self_tiles);
        c
    }));
    total - (into.len() - before)
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::hand::hand;

    fn tile(s: &str) -> Tile {
        s.parse().unwrap()
    }

    fn self_tiles(s: &str, called: &str, allow_chi: bool) -> Vec<String> {
        meld_combinations(&hand(s).unwrap(), tile(called), false, allow_chi)
            .iter()
            .map(|m| format!("{}{}", m.self_tiles[0], m.self_tiles[1]))
            .collect()
    }

    #[test]
    pub fn combinations() {
        assert_eq!(self_tiles("34567m 5m", "5m", true), ["5m5m", "3m4m", "4m6m", "6m7m"]);
        assert_eq!(self_tiles("34567m 5m", "5m", false), ["5m5m"]);
        assert_eq!(self_tiles("23m", "1m", true), ["2m3m"]);
        assert_eq!(self_tiles("78m", "9m", true), ["7m8m"]);
        assert_eq!(self_tiles("13m", "2m", true), ["1m3m"]);
        assert_eq!(self_tiles("89m 1p", "9p", true), Vec::<String>::new());
        assert_eq!(self_tiles("11z 23z", "1z", true), ["EE"]);
    }

    #[test]
    pub fn kuikae() {
        let chi = |a: &str, b: &str, c: &str| suji_kuikae(&Meld::chi(tile(a), tile(b), tile(c), false));
        assert_eq!(chi("2m", "3m", "4m"), Some(tile("1m")));
        assert_eq!(chi("5m", "6m", "4m"), Some(tile("7m")));
        assert_eq!(chi("3m", "5m", "4m"), None);
        assert_eq!(chi("7s", "8s", "9s"), Some(tile("6s")));
        assert_eq!(chi("1s", "2s", "3s"), None);
        assert_eq!(chi("8p", "9p", "7p"), None);
        assert_eq!(suji_kuikae(&Meld::pon(tile("4m"), false)), None);
    }

    #[test]
    pub fn chi_call() {
        let mut player = PlayerInfo::from_hand_str("2346m 123p 456s 11z 9s").unwrap();
        let before = player.clone();
        let r = Analyzer::default()
            .evaluate_call(&mut player, tile("5m"), false, true)
            .unwrap();
        assert_eq!(player, before);

        let melds = meld_combinations(player.hand(), tile("5m"), false, true);
        assert_eq!(melds.len(), 2);
        assert_eq!(Some(r.shanten), calc_meld_shanten(player.hand(), &melds));
        assert!(!r.preserving.is_empty());

        for c in r.preserving.iter().chain(&r.regressing) {
            assert_ne!(c.discard, tile("5m"));
            assert!(c.result.is_naki);
            let open = c.open_tiles.unwrap();
            if open == [tile("3m"), tile("4m")] {
                assert_ne!(c.discard, tile("2m"));
            }
        }
        assert!(r.preserving.iter().all(|c| c.result.shanten == r.shanten));
    }

    fn discards(bucket: &[Candidate14], open: [&str; 2]) -> Vec<String> {
        let open = open.map(tile);
        let mut ret: Vec<_> = bucket
            .iter()
            .filter(|c| c.open_tiles == Some(open))
            .map(|c| c.discard.to_string())
            .collect();
        ret.sort();
        ret
    }

    #[test]
    pub fn weaker_call_only_regresses() {
        // pon leaves 678m 123p 456p 9s 1z at tenpai, chi with 67m one step behind
        let mut player = PlayerInfo::from_hand_str("55m 678m 123p 456p 9s 1z").unwrap();
        let r = Analyzer::default()
            .evaluate_call(&mut player, tile("5m"), false, true)
            .unwrap();
        assert_eq!(r.shanten, 0);

        assert_eq!(discards(&r.preserving, ["5m", "5m"]), ["9s", "E"]);
        assert_eq!(discards(&r.preserving, ["6m", "7m"]), Vec::<String>::new());
        assert_eq!(
            discards(&r.regressing, ["5m", "5m"]),
            ["1p", "2p", "3p", "4p", "5p", "6m", "6p", "7m", "8m"]
        );
        // 8m also keeps the chi at one shanten but extends the run
        assert_eq!(discards(&r.regressing, ["6m", "7m"]), ["9s", "E"]);
        assert_eq!(r.preserving.len() + r.regressing.len(), 13);
        assert!(r.preserving.iter().all(|c| c.result.shanten == 0));
        assert!(r.regressing.iter().all(|c| c.result.shanten == 1));
    }

    #[test]
    pub fn chi_from_below_bans_upper_suji() {
        let mut player = PlayerInfo::from_hand_str("45566m 123p 456s 11z").unwrap();
        let r = Analyzer::default()
            .evaluate_call(&mut player, tile("3m"), false, true)
            .unwrap();
        assert_eq!(r.shanten, 0);
        // 6m would wait on 47m just as well
        assert_eq!(discards(&r.preserving, ["4m", "5m"]), ["5m"]);
        assert_eq!(
            discards(&r.regressing, ["4m", "5m"]),
            ["1p", "2p", "3p", "4s", "5s", "6s", "E"]
        );
        assert_eq!(r.preserving.len() + r.regressing.len(), 8);
    }

    #[test]
    pub fn red_pon() {
        let mut player = PlayerInfo::from_hand_str("55p 123m 456s 789s 12z").unwrap();
        let before = player.clone();
        let r = Analyzer::default()
            .evaluate_call(&mut player, tile("5p"), true, false)
            .unwrap();
        assert_eq!(player, before);
        assert!(!r.preserving.is_empty());
        for c in r.preserving.iter().chain(&r.regressing) {
            assert_eq!(c.open_tiles, Some([tile("5p"); 2]));
            assert_ne!(c.discard, tile("5p"));
            assert!(c.result.dora_count >= 1);
        }
        assert!(r.to_string().contains("pon with 5p5p"));
    }

    #[test]
    pub fn nothing_to_call() {
        let mut player = PlayerInfo::from_hand_str("123m 456p 789s 11z 9p").unwrap();
        assert!(
            Analyzer::default()
                .evaluate_call(&mut player, tile("2z"), false, true)
                .is_none()
        );
    }
}
