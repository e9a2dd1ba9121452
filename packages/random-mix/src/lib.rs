//! Random mix sessions for LMS players
//!
//! Wraps the RandomPlay plugin commands: reading the genre and library
//! lists, the mix preferences, saved mixes, and the command sequence that
//! starts a mix on a player.
//!
//! # Example
//!
//! ```no_run
//! use lms_remote_lms_client::{LmsClient, ServerVersion};
//! use lms_remote_random_mix::{MixType, RandomMix};
//! use lms_remote_shared_config::LmsConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LmsClient::new(&LmsConfig::with_url("http://localhost:9000"))?;
//! let mut mix = RandomMix::new(client, "00:04:20:12:34:56", ServerVersion::new(9, 0, 0));
//!
//! mix.open(None).await?;
//! mix.settings_mut().mix = MixType::Albums;
//! mix.start().await?;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod controller;
mod error;
mod mix;

pub use catalog::{is_default_library, Library, DEFAULT_LIBRARY, DEFAULT_LIBRARY_PREV};
pub use controller::{GenreSelection, MixSettings, RandomMix, CURRENT_DEFAULT_LIBRARY_VERSION};
pub use error::{MixError, MixResult};
pub use mix::{available_mixes, MixOption, MixType, WORKS_MIN_VERSION};
