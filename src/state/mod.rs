mod meld;
mod player;
mod scoped;

pub use meld::{Meld, MeldKind};
pub use player::PlayerInfo;
pub use scoped::Scoped;
