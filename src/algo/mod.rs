pub mod call;
pub mod discard;
pub mod improve;
pub mod shanten;
pub mod waits;

pub use discard::{Analysis14, Candidate14};
pub use improve::Analysis13;

use crate::point::{HanFuPointEstimator, PointEstimator};
use crate::win_rate::{EmpiricalWinRate, WinRateTable};
use crate::yaku::{StandardYakuChecker, YakuChecker};

static STANDARD_YAKU_CHECKER: StandardYakuChecker = StandardYakuChecker;
static HAN_FU_POINT_ESTIMATOR: HanFuPointEstimator = HanFuPointEstimator {
    checker: StandardYakuChecker,
};
static EMPIRICAL_WIN_RATE: EmpiricalWinRate = EmpiricalWinRate;

/// Entry point of the search, holding the scoring collaborators consulted
/// at tenpai.
///
/// Every analysis takes the [`PlayerInfo`](crate::state::PlayerInfo) by
/// exclusive reference and hands it back unchanged.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    pub yaku_checker: &'a dyn YakuChecker,
    pub point_estimator: &'a dyn PointEstimator,
    pub win_rate: &'a dyn WinRateTable,
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self {
            yaku_checker: &STANDARD_YAKU_CHECKER,
            point_estimator: &HAN_FU_POINT_ESTIMATOR,
            win_rate: &EMPIRICAL_WIN_RATE,
        }
    }
}
