//! Ron point estimates for tenpai hands.

use crate::algo::waits::Waits;
use crate::state::PlayerInfo;
use crate::yaku::{HandValue, StandardYakuChecker};

/// Estimates the points a tenpai hand scores by ron.
pub trait PointEstimator: Send + Sync {
    /// Average ron points over `waits`, weighted by copies left. Waits without
    /// a yaku score 0. `player` is restored before returning.
    fn avg_ron_point(&self, player: &mut PlayerInfo, waits: &Waits) -> f64;

    /// Same as [`Self::avg_ron_point`] with riichi declared.
    fn avg_riichi_ron_point(&self, player: &mut PlayerInfo, waits: &Waits) -> f64;
}

/// Scores each wait by han and fu from [`StandardYakuChecker`], plus dora.
/// Ura-dora and honba are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct HanFuPointEstimator {
    pub checker: StandardYakuChecker,
}

/// Base points with the limit hands applied.
#[must_use]
pub fn base_points(han: u8, fu: u8) -> u32 {
    match han {
        0 => 0,
        1..=4 => {
            let fu = if fu == 25 { 25 } else { fu.div_ceil(10) * 10 };
            (fu as u32 * 2_u32.pow(2 + han as u32)).min(2000)
        }
        5 => 2000,
        6 | 7 => 3000,
        8..=10 => 4000,
        11 | 12 => 6000,
        _ => 8000,
    }
}

/// Ron payment, rounded up to 100.
#[must_use]
pub fn ron_points(base: u32, is_oya: bool) -> u32 {
    let multiplier = if is_oya { 6 } else { 4 };
    (base * multiplier).div_ceil(100) * 100
}

impl HanFuPointEstimator {
    fn point_of(&self, value: &HandValue, doras: u8, is_oya: bool) -> u32 {
        let base = if value.yakuman > 0 {
            8000 * value.yakuman as u32
        } else {
            base_points(value.han + doras, value.fu)
        };
        ron_points(base, is_oya)
    }

    fn weighted(&self, player: &mut PlayerInfo, waits: &Waits) -> f64 {
        let is_oya = player.is_oya();
        let mut sum = 0.;
        let mut weight = 0;
        for (tile, left) in waits.iter().filter(|&(_, left)| left > 0) {
            let won = player.add_win_tile(tile);
            let point = self
                .checker
                .evaluate(&won)
                .map_or(0, |v| self.point_of(&v, won.count_dora(), is_oya));
            sum += point as f64 * left as f64;
            weight += left as u32;
        }
        if weight == 0 { 0. } else { sum / weight as f64 }
    }
}

impl PointEstimator for HanFuPointEstimator {
    fn avg_ron_point(&self, player: &mut PlayerInfo, waits: &Waits) -> f64 {
        self.weighted(player, waits)
    }

    fn avg_riichi_ron_point(&self, player: &mut PlayerInfo, waits: &Waits) -> f64 {
        if player.is_naki() {
            return 0.;
        }
        let mut riichi = player.declare_riichi();
        self.weighted(&mut riichi, waits)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::algo::waits::calc_shanten_and_waits13;

    #[test]
    pub fn limits() {
        assert_eq!(ron_points(base_points(1, 30), false), 1000);
        assert_eq!(ron_points(base_points(3, 30), false), 3900);
        assert_eq!(ron_points(base_points(4, 30), true), 11600);
        assert_eq!(ron_points(base_points(4, 40), false), 8000);
        assert_eq!(ron_points(base_points(2, 25), false), 1600);
        assert_eq!(ron_points(base_points(7, 30), false), 12000);
        assert_eq!(ron_points(base_points(13, 30), false), 32000);
    }

    #[test]
    pub fn riichi_only_hand() {
        let mut player = PlayerInfo::from_hand_str("123m 456p 789s 11z 46m").unwrap();
        player.seat_wind = "S".parse().unwrap();
        let before = player.clone();
        let (shanten, waits) = calc_shanten_and_waits13(player.hand(), Some(player.left_tiles()));
        assert_eq!(shanten, 0);

        let estimator = HanFuPointEstimator::default();
        assert_eq!(estimator.avg_ron_point(&mut player, &waits), 0.);
        // riichi 1 han, round wind pair and kanchan: 40 fu
        assert_eq!(estimator.avg_riichi_ron_point(&mut player, &waits), 1300.);
        assert_eq!(player, before);
    }
}
