//! Random mix setup: load settings, start a session, save named mixes

use lms_remote_lms_client::{lenient, LmsTransport, ServerVersion, SERVER_SCOPE};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{
    is_default_library, normalise_library, parse_genre_names, parse_library_folders,
    parse_random_genres, parse_random_libraries, Library, DEFAULT_LIBRARY, DEFAULT_LIBRARY_PREV,
};
use crate::error::{MixError, MixResult};
use crate::mix::{available_mixes, MixOption, MixType};

/// Servers before this release only know the old default library id
pub const CURRENT_DEFAULT_LIBRARY_VERSION: ServerVersion = ServerVersion::new(8, 5, 2);

/// Track counts used when a stored value is out of range
const DEFAULT_TRACK_COUNT: u32 = 10;
const MAX_TRACK_COUNT: u32 = 1000;

const GENRE_LIST_LIMIT: usize = 2500;
const LIBRARY_LIST_LIMIT: usize = 500;

const PREF_CONTINUOUS: &str = "plugin.randomplay:continuous";
const PREF_NEW_TRACKS: &str = "plugin.randomplay:newtracks";
const PREF_OLD_TRACKS: &str = "plugin.randomplay:oldtracks";

/// How many of the known genres are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreSelection {
    All,
    Some,
    None,
}

/// Everything the mix dialog edits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixSettings {
    /// Name of the saved mix being edited, if any
    pub name: Option<String>,
    pub mixes: Vec<MixOption>,
    pub mix: MixType,
    pub genres: Vec<String>,
    pub chosen_genres: Vec<String>,
    pub libraries: Vec<Library>,
    pub library: String,
    /// Keep adding tracks as the mix plays
    pub continuous: bool,
    /// Played tracks kept in the queue
    pub old_tracks: u32,
    /// Upcoming tracks kept in the queue
    pub new_tracks: u32,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            name: None,
            mixes: Vec::new(),
            mix: MixType::Tracks,
            genres: Vec::new(),
            chosen_genres: Vec::new(),
            libraries: Vec::new(),
            library: DEFAULT_LIBRARY.to_string(),
            continuous: true,
            old_tracks: DEFAULT_TRACK_COUNT,
            new_tracks: DEFAULT_TRACK_COUNT,
        }
    }
}

impl MixSettings {
    pub fn selection_state(&self) -> GenreSelection {
        if self.chosen_genres.is_empty() {
            GenreSelection::None
        } else if self.chosen_genres.len() == self.genres.len() {
            GenreSelection::All
        } else {
            GenreSelection::Some
        }
    }

    /// Select every genre, or none when all are already selected
    pub fn toggle_genres(&mut self) {
        if self.selection_state() == GenreSelection::All {
            self.chosen_genres.clear();
        } else {
            self.chosen_genres = self.genres.clone();
        }
    }
}

/// Random mix controller for one player
pub struct RandomMix<T> {
    transport: T,
    player_id: String,
    version: ServerVersion,
    release_types: bool,
    settings: MixSettings,
}

impl<T: LmsTransport> RandomMix<T> {
    pub fn new(transport: T, player_id: impl Into<String>, version: ServerVersion) -> Self {
        Self {
            transport,
            player_id: player_id.into(),
            version,
            release_types: false,
            settings: MixSettings::default(),
        }
    }

    /// Label album mixes as releases
    pub fn with_release_types(mut self, release_types: bool) -> Self {
        self.release_types = release_types;
        self
    }

    pub fn settings(&self) -> &MixSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MixSettings {
        &mut self.settings
    }

    /// Load the dialog state, either fresh from the server or from a saved mix
    #[instrument(skip(self), fields(player_id = %self.player_id))]
    pub async fn open(&mut self, existing: Option<&str>) -> MixResult<()> {
        self.settings = MixSettings {
            mixes: available_mixes(self.version, self.release_types),
            ..MixSettings::default()
        };

        match existing {
            Some(name) => self.load_saved(name).await,
            None => {
                self.load_genres().await?;
                self.load_libraries().await?;
                self.load_prefs().await
            }
        }
    }

    /// Read the genre list, switching the player to the full library meanwhile
    async fn load_genres(&mut self) -> MixResult<()> {
        let lib = self
            .transport
            .query(&self.player_id, vec!["libraries".into(), "getid".into()])
            .await?;
        let player_lib = lib
            .get("id")
            .and_then(lenient::value_as_string)
            .unwrap_or_else(|| DEFAULT_LIBRARY.to_string());

        let switched = !is_default_library(&player_lib);
        if switched {
            debug!(library = %player_lib, "Switching player to default library for genre list");
            self.set_player_library(DEFAULT_LIBRARY).await?;
        }

        let listed = self
            .transport
            .list(
                &self.player_id,
                &["randomplaygenrelist"],
                &[],
                0,
                GENRE_LIST_LIMIT,
            )
            .await;

        if switched {
            self.set_player_library(&player_lib).await?;
        }

        let (genres, chosen) = parse_random_genres(&listed?);
        debug!(genres = genres.len(), chosen = chosen.len(), "Loaded genres");
        self.settings.genres = genres;
        self.settings.chosen_genres = chosen;
        Ok(())
    }

    async fn set_player_library(&self, id: &str) -> MixResult<()> {
        self.transport
            .command(
                &self.player_id,
                vec![
                    "material-skin-client".into(),
                    "set-lib".into(),
                    format!("id:{}", id).into(),
                ],
            )
            .await?;
        Ok(())
    }

    async fn load_libraries(&mut self) -> MixResult<()> {
        let result = self
            .transport
            .list(
                &self.player_id,
                &["randomplaylibrarylist"],
                &[],
                0,
                LIBRARY_LIST_LIMIT,
            )
            .await?;
        let (libraries, selected) = parse_random_libraries(&result);
        if !libraries.is_empty() {
            self.settings.libraries = libraries;
            self.settings.library = selected;
        }
        Ok(())
    }

    async fn load_prefs(&mut self) -> MixResult<()> {
        if let Some(continuous) = self.read_pref(PREF_CONTINUOUS).await? {
            self.settings.continuous = continuous == 1;
        }
        if let Some(new_tracks) = self.read_pref(PREF_NEW_TRACKS).await? {
            self.settings.new_tracks = clamp_track_count(new_tracks);
        }
        if let Some(old_tracks) = self.read_pref(PREF_OLD_TRACKS).await? {
            self.settings.old_tracks = clamp_track_count(old_tracks);
        }
        Ok(())
    }

    async fn read_pref(&self, pref: &str) -> MixResult<Option<i64>> {
        let result = self
            .transport
            .query(SERVER_SCOPE, vec!["pref".into(), pref.into(), "?".into()])
            .await?;
        Ok(result.get("_p2").and_then(lenient::value_as_i64))
    }

    async fn load_saved(&mut self, name: &str) -> MixResult<()> {
        let genres = self
            .transport
            .query(
                SERVER_SCOPE,
                vec!["genres".into(), 0.into(), GENRE_LIST_LIMIT.into()],
            )
            .await?;
        self.settings.genres = parse_genre_names(&genres);

        let folders = self
            .transport
            .list(SERVER_SCOPE, &["libraries"], &[], 0, LIBRARY_LIST_LIMIT)
            .await?;
        self.settings.libraries = parse_library_folders(&folders);

        let saved = self
            .transport
            .query(
                SERVER_SCOPE,
                vec![
                    "material-skin".into(),
                    "rndmix".into(),
                    format!("name:{}", name).into(),
                    "act:read".into(),
                ],
            )
            .await?;
        if saved.as_object().map_or(true, |fields| fields.is_empty()) {
            return Err(MixError::NotFound(name.to_string()));
        }

        self.apply_saved(name, &saved);
        info!(name = %name, mix = %self.settings.mix, "Loaded saved mix");
        Ok(())
    }

    fn apply_saved(&mut self, name: &str, saved: &Value) {
        let settings = &mut self.settings;
        settings.name = Some(name.to_string());

        if let Some(mix) = saved.get("mix").and_then(Value::as_str) {
            match mix.parse() {
                Ok(mix) => settings.mix = mix,
                Err(e) => warn!(error = %e, "Ignoring saved mix type"),
            }
        }

        settings.chosen_genres = saved
            .get("genres")
            .and_then(Value::as_str)
            .map(|joined| {
                joined
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if settings.chosen_genres.is_empty() || settings.chosen_genres.len() == settings.genres.len() {
            settings.chosen_genres = settings.genres.clone();
        }

        if let Some(continuous) = saved.get("continuous").and_then(lenient::value_as_i64) {
            settings.continuous = continuous == 1;
        }
        if let Some(value) = saved.get("oldtracks") {
            settings.old_tracks = lenient::value_as_i64(value)
                .map(clamp_track_count)
                .unwrap_or(DEFAULT_TRACK_COUNT);
        }
        if let Some(value) = saved.get("newtracks") {
            settings.new_tracks = lenient::value_as_i64(value)
                .map(clamp_track_count)
                .unwrap_or(DEFAULT_TRACK_COUNT);
        }
        settings.library =
            normalise_library(saved.get("library").and_then(lenient::value_as_string));
    }

    /// Write the prefs, choose library and genres, then start the mix
    #[instrument(skip(self), fields(player_id = %self.player_id, mix = %self.settings.mix))]
    pub async fn start(&self) -> MixResult<()> {
        let settings = &self.settings;
        self.write_pref(PREF_CONTINUOUS, Value::from(u8::from(settings.continuous)))
            .await?;
        self.write_pref(PREF_NEW_TRACKS, Value::from(settings.new_tracks))
            .await?;
        self.write_pref(PREF_OLD_TRACKS, Value::from(settings.old_tracks))
            .await?;

        let library = self.library_for_server();
        self.player_command(vec!["randomplaychooselibrary".into(), library.as_str().into()])
            .await?;

        match settings.selection_state() {
            GenreSelection::All => {
                self.player_command(vec!["randomplaygenreselectall".into(), "1".into()])
                    .await?;
            }
            GenreSelection::None => {
                self.player_command(vec!["randomplaygenreselectall".into(), "0".into()])
                    .await?;
            }
            GenreSelection::Some => {
                self.player_command(vec!["randomplaygenreselectall".into(), "0".into()])
                    .await?;
                for genre in &settings.chosen_genres {
                    self.player_command(vec![
                        "randomplaychoosegenre".into(),
                        genre.as_str().into(),
                        "1".into(),
                    ])
                    .await?;
                }
            }
        }

        self.player_command(vec!["randomplay".into(), settings.mix.key().into()])
            .await?;
        info!(
            genres = settings.chosen_genres.len(),
            library = %library,
            "Random mix started"
        );
        Ok(())
    }

    /// Store the current settings under the trimmed `name`
    #[instrument(skip(self))]
    pub async fn save(&mut self, name: &str) -> MixResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MixError::InvalidInput("mix name is empty".to_string()));
        }

        let settings = &self.settings;
        let genres = if settings.selection_state() == GenreSelection::All {
            String::new()
        } else {
            settings.chosen_genres.join(",")
        };
        self.transport
            .command(
                SERVER_SCOPE,
                vec![
                    "material-skin".into(),
                    "rndmix".into(),
                    "act:save".into(),
                    format!("name:{}", name).into(),
                    format!("mix:{}", settings.mix).into(),
                    format!("genres:{}", genres).into(),
                    format!("continuous:{}", u8::from(settings.continuous)).into(),
                    format!("oldtracks:{}", settings.old_tracks).into(),
                    format!("newtracks:{}", settings.new_tracks).into(),
                    format!("library:{}", settings.library).into(),
                ],
            )
            .await?;

        self.settings.name = Some(name.to_string());
        info!(name = %name, "Saved random mix");
        Ok(())
    }

    fn library_for_server(&self) -> String {
        if self.settings.library == DEFAULT_LIBRARY && self.version < CURRENT_DEFAULT_LIBRARY_VERSION {
            DEFAULT_LIBRARY_PREV.to_string()
        } else {
            self.settings.library.clone()
        }
    }

    async fn write_pref(&self, pref: &str, value: Value) -> MixResult<()> {
        self.transport
            .command(SERVER_SCOPE, vec!["pref".into(), pref.into(), value])
            .await?;
        Ok(())
    }

    async fn player_command(&self, args: Vec<Value>) -> MixResult<()> {
        self.transport.command(&self.player_id, args).await?;
        Ok(())
    }
}

fn clamp_track_count(value: i64) -> u32 {
    match u32::try_from(value) {
        Ok(count) if (1..=MAX_TRACK_COUNT).contains(&count) => count,
        _ => DEFAULT_TRACK_COUNT,
    }
}
