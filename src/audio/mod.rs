// Audio playback module
// Uses Symphonia for decoding, Rubato for rate conversion, and cpal for output

pub mod clip;
pub mod decoder;
pub mod output;
pub mod player;
pub mod varispeed;

pub use clip::AudioClip;
pub use decoder::load_clip;
pub use player::{Deck, Player};
pub use varispeed::RateParam;
