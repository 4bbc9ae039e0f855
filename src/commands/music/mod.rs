pub mod audio_sources;
pub mod play;
pub mod utils;
