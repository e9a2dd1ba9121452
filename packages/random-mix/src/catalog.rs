//! Genre and library lists as reported by the server

use std::collections::HashSet;

use lms_remote_lms_client::lenient;
use serde::Serialize;
use serde_json::Value;

/// Library id meaning "everything"
pub const DEFAULT_LIBRARY: &str = "0";

/// Id older servers use for the default library
pub const DEFAULT_LIBRARY_PREV: &str = "-1";

/// Name prefix added by the SimpleLibraryViews plugin
const SIMPLE_LIB_VIEWS: &str = "SimpleLibraryViews:";

/// Ids shorter than this are placeholders, not virtual libraries
const MIN_LIBRARY_ID_LEN: usize = 3;

/// Whether `id` denotes the full library
pub fn is_default_library(id: &str) -> bool {
    matches!(id, "" | "-" | DEFAULT_LIBRARY | DEFAULT_LIBRARY_PREV)
}

/// A selectable (virtual) library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    pub id: String,
    pub name: String,
}

impl Library {
    /// The entry representing all music
    pub fn all() -> Self {
        Self {
            id: DEFAULT_LIBRARY.to_string(),
            name: "All".to_string(),
        }
    }
}

/// Genres from `randomplaygenrelist`: `(all, preselected)`, de-duplicated
pub fn parse_random_genres(result: &Value) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut genres = Vec::new();
    let mut chosen = Vec::new();

    for item in item_loop(result, "item_loop") {
        let Some(checkbox) = item.get("checkbox") else {
            continue;
        };
        let Some(name) = item
            .pointer("/actions/on/cmd/1")
            .and_then(lenient::value_as_string)
        else {
            continue;
        };
        if !seen.insert(name.clone()) {
            continue;
        }
        if lenient::value_as_i64(checkbox) == Some(1) {
            chosen.push(name.clone());
        }
        genres.push(name);
    }
    (genres, chosen)
}

/// Genre names from `genres 0 <n>`
pub fn parse_genre_names(result: &Value) -> Vec<String> {
    item_loop(result, "genres_loop")
        .filter_map(|item| item.get("genre").and_then(lenient::value_as_string))
        .collect()
}

/// Libraries from `randomplaylibrarylist`, prefixed with "All"
///
/// Returns the list and the selected id; a default library (or no radio
/// selection) collapses to [`DEFAULT_LIBRARY`].
pub fn parse_random_libraries(result: &Value) -> (Vec<Library>, String) {
    let mut libraries = Vec::new();
    let mut selected = None;

    for item in item_loop(result, "item_loop") {
        let Some(id) = item
            .pointer("/actions/do/cmd/1")
            .and_then(lenient::value_as_string)
        else {
            continue;
        };
        if id.len() < MIN_LIBRARY_ID_LEN {
            continue;
        }
        let name = item
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if item.get("radio").and_then(lenient::value_as_i64) == Some(1) {
            selected = Some(id.clone());
        }
        libraries.push(Library {
            id,
            name: strip_view_prefix(name),
        });
    }

    (finish_libraries(libraries), normalise_library(selected))
}

/// Libraries from `libraries 0 <n>` (`folder_loop`), prefixed with "All"
pub fn parse_library_folders(result: &Value) -> Vec<Library> {
    let libraries = item_loop(result, "folder_loop")
        .filter_map(|item| {
            let id = item.get("id").and_then(lenient::value_as_string)?;
            let name = item.get("name").and_then(Value::as_str).unwrap_or_default();
            Some(Library {
                id,
                name: strip_view_prefix(name),
            })
        })
        .collect();
    finish_libraries(libraries)
}

/// Map missing or default ids to [`DEFAULT_LIBRARY`]
pub fn normalise_library(id: Option<String>) -> String {
    match id {
        Some(id) if !is_default_library(&id) => id,
        _ => DEFAULT_LIBRARY.to_string(),
    }
}

fn finish_libraries(mut libraries: Vec<Library>) -> Vec<Library> {
    if libraries.is_empty() {
        return libraries;
    }
    libraries.sort_by_key(|lib| lib.name.to_lowercase());
    libraries.insert(0, Library::all());
    libraries
}

fn strip_view_prefix(name: &str) -> String {
    name.strip_prefix(SIMPLE_LIB_VIEWS)
        .unwrap_or(name)
        .trim()
        .to_string()
}

fn item_loop<'a>(result: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    result
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genre(name: &str, checked: u8) -> Value {
        json!({
            "text": name,
            "checkbox": checked,
            "actions": {"on": {"cmd": ["randomplaychoosegenre", name, 1]}}
        })
    }

    fn library(id: &str, name: &str, radio: u8) -> Value {
        json!({
            "text": name,
            "radio": radio,
            "actions": {"do": {"cmd": ["randomplaychooselibrary", id]}}
        })
    }

    #[test]
    fn test_genres_deduplicated_with_preselection() {
        let result = json!({"item_loop": [
            genre("Rock", 1),
            genre("Jazz", 0),
            genre("Rock", 0),
            {"text": "Header without checkbox"},
            genre("Blues", 1)
        ]});

        let (genres, chosen) = parse_random_genres(&result);
        assert_eq!(genres, vec!["Rock", "Jazz", "Blues"]);
        assert_eq!(chosen, vec!["Rock", "Blues"]);
    }

    #[test]
    fn test_libraries_filtered_sorted_and_prefixed() {
        let result = json!({"item_loop": [
            library("0", "Everything", 0),
            library("f00d1", "zeta", 0),
            library("beef2", "SimpleLibraryViews: Alpha", 1),
            library("c0de3", "Beta", 0)
        ]});

        let (libraries, selected) = parse_random_libraries(&result);
        let names: Vec<&str> = libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["All", "Alpha", "Beta", "zeta"]);
        assert_eq!(libraries[0].id, DEFAULT_LIBRARY);
        assert_eq!(selected, "beef2");
    }

    #[test]
    fn test_no_radio_selects_default() {
        let result = json!({"item_loop": [library("f00d1", "Mine", 0)]});
        let (_, selected) = parse_random_libraries(&result);
        assert_eq!(selected, DEFAULT_LIBRARY);

        assert_eq!(normalise_library(Some("-1".into())), DEFAULT_LIBRARY);
        assert_eq!(normalise_library(Some("abc123".into())), "abc123");
    }

    #[test]
    fn test_empty_library_list_stays_empty() {
        let (libraries, _) = parse_random_libraries(&json!({}));
        assert!(libraries.is_empty());
    }

    #[test]
    fn test_genre_names_and_folders() {
        let genres = parse_genre_names(&json!({"genres_loop": [{"genre": "Pop"}, {"genre": "Soul"}]}));
        assert_eq!(genres, vec!["Pop", "Soul"]);

        let folders = parse_library_folders(&json!({"folder_loop": [
            {"id": 77771, "name": "Vinyl"},
            {"id": "a1b2c", "name": "SimpleLibraryViews: Audiobooks"}
        ]}));
        let names: Vec<&str> = folders.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["All", "Audiobooks", "Vinyl"]);
        assert_eq!(folders[2].id, "77771");
    }
}
