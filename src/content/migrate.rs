//! Document Migrator
//!
//! Upgrades documents persisted under an older shape before they are merged
//! over the defaults. The upgrades form an ordered chain of steps:
//!
//! ```text
//!   v0  flat hero {tagline, title, subtitle, imageUrl, rating, ...}
//!    │  HeroSlides
//!   v1  hero {slides: [...], stats: {...}}
//!    │  GalleryAlbums
//!   v2  gallery {albums: [...], recent: [...]}        (current)
//! ```
//!
//! The two legacy patterns are independent, so each step is gated on the
//! absence of the field it introduces rather than on the presence of the
//! old one. Running the chain over a current document is a no-op, and
//! running it twice equals running it once.

use crate::content::defaults::{
    DEFAULT_CLIENTS_COUNT, DEFAULT_EVENTS_COUNT, DEFAULT_RATING_TEXT, DEFAULT_YEARS_EXP,
    PLACEHOLDER_HERO_IMAGE,
};
use serde_json::{json, Map, Value};
use std::fmt;

/// One upgrade in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    /// Flat hero record → one-slide carousel plus stats
    HeroSlides,
    /// Bare gallery array → `{albums: [], recent: [...]}`
    GalleryAlbums,
}

impl MigrationStep {
    /// Every step, in the order they are applied
    pub const CHAIN: [MigrationStep; 2] = [MigrationStep::HeroSlides, MigrationStep::GalleryAlbums];

    /// Whether the document still needs this step
    pub fn is_needed(self, doc: &Map<String, Value>) -> bool {
        match self {
            MigrationStep::HeroSlides => match doc.get("hero") {
                Some(Value::Object(hero)) => {
                    !hero.get("slides").is_some_and(is_truthy)
                        && (hero.get("tagline").is_some_and(is_truthy)
                            || hero.get("title").is_some_and(is_truthy))
                }
                _ => false,
            },
            MigrationStep::GalleryAlbums => matches!(doc.get("gallery"), Some(Value::Array(_))),
        }
    }

    fn apply(self, doc: &mut Map<String, Value>) {
        match self {
            MigrationStep::HeroSlides => {
                if let Some(Value::Object(old)) = doc.get("hero") {
                    let upgraded = upgrade_flat_hero(old);
                    doc.insert("hero".to_string(), upgraded);
                }
            }
            MigrationStep::GalleryAlbums => {
                if let Some(Value::Array(images)) = doc.remove("gallery") {
                    doc.insert(
                        "gallery".to_string(),
                        json!({ "albums": [], "recent": images }),
                    );
                }
            }
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStep::HeroSlides => write!(f, "hero-slides"),
            MigrationStep::GalleryAlbums => write!(f, "gallery-albums"),
        }
    }
}

/// JavaScript-style truthiness, which is what older clients used to decide
/// whether a field was "set".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The old value when it is set, otherwise the given fallback text
fn pick(old: &Map<String, Value>, key: &str, fallback: &str) -> Value {
    match old.get(key) {
        Some(v) if is_truthy(v) => v.clone(),
        _ => Value::String(fallback.to_string()),
    }
}

fn upgrade_flat_hero(old: &Map<String, Value>) -> Value {
    json!({
        "slides": [{
            "image": pick(old, "imageUrl", PLACEHOLDER_HERO_IMAGE),
            "tagline": pick(old, "tagline", ""),
            "title": pick(old, "title", ""),
            "subtitle": pick(old, "subtitle", ""),
        }],
        "stats": {
            "rating": pick(old, "rating", DEFAULT_RATING_TEXT),
            "yearsExp": pick(old, "yearsExp", DEFAULT_YEARS_EXP),
            "eventsCount": pick(old, "eventsCount", DEFAULT_EVENTS_COUNT),
            "clientsCount": pick(old, "clientsCount", DEFAULT_CLIENTS_COUNT),
        }
    })
}

/// Steps the document would need, without touching it
pub fn pending_steps(doc: &Value) -> Vec<MigrationStep> {
    let Value::Object(map) = doc else {
        return Vec::new();
    };
    MigrationStep::CHAIN
        .into_iter()
        .filter(|step| step.is_needed(map))
        .collect()
}

/// Upgrade `doc` in place and report which steps ran.
///
/// `null` and other non-object values pass through untouched.
pub fn migrate(doc: &mut Value) -> Vec<MigrationStep> {
    let Value::Object(map) = doc else {
        return Vec::new();
    };

    let mut applied = Vec::new();
    for step in MigrationStep::CHAIN {
        if step.is_needed(map) {
            step.apply(map);
            applied.push(step);
        }
    }

    if !applied.is_empty() {
        tracing::debug!(steps = ?applied, "Migrated legacy content document");
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_hero_upgrade() {
        let mut doc = json!({"hero": {"tagline": "T", "title": "Ti"}});
        let applied = migrate(&mut doc);

        assert_eq!(applied, vec![MigrationStep::HeroSlides]);
        assert_eq!(
            doc,
            json!({"hero": {
                "slides": [{"image": PLACEHOLDER_HERO_IMAGE, "tagline": "T", "title": "Ti", "subtitle": ""}],
                "stats": {"rating": "4.8/5", "yearsExp": "15+", "eventsCount": "5000+", "clientsCount": "3000+"}
            }})
        );
    }

    #[test]
    fn test_flat_hero_keeps_old_values() {
        let mut doc = json!({"hero": {
            "title": "Ti",
            "imageUrl": "old.jpg",
            "rating": "5/5",
            "clientsCount": "",
        }});
        migrate(&mut doc);

        assert_eq!(doc["hero"]["slides"][0]["image"], "old.jpg");
        assert_eq!(doc["hero"]["slides"][0]["tagline"], "");
        assert_eq!(doc["hero"]["stats"]["rating"], "5/5");
        assert_eq!(doc["hero"]["stats"]["clientsCount"], "3000+");
    }

    #[test]
    fn test_flat_gallery_upgrade() {
        let mut doc = json!({"gallery": [{"url": "u", "title": "t"}]});
        let applied = migrate(&mut doc);

        assert_eq!(applied, vec![MigrationStep::GalleryAlbums]);
        assert_eq!(
            doc,
            json!({"gallery": {"albums": [], "recent": [{"url": "u", "title": "t"}]}})
        );
    }

    #[test]
    fn test_both_steps_in_one_pass() {
        let mut doc = json!({
            "hero": {"tagline": "T"},
            "gallery": [],
        });
        assert_eq!(
            migrate(&mut doc),
            vec![MigrationStep::HeroSlides, MigrationStep::GalleryAlbums]
        );
    }

    #[test]
    fn test_migration_is_idempotent() {
        let inputs = [
            json!({"hero": {"tagline": "T", "title": "Ti"}, "gallery": [{"url": "u"}]}),
            json!({"hero": {"slides": [], "tagline": "kept"}}),
            json!({"hero": {"subtitle": "only subtitle"}}),
            json!({}),
            json!(null),
            json!([1, 2, 3]),
        ];

        for input in inputs {
            let mut once = input.clone();
            migrate(&mut once);
            let mut twice = once.clone();
            let second = migrate(&mut twice);
            assert!(second.is_empty(), "second pass applied {second:?} for {input}");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_current_shape_is_untouched() {
        let mut doc = crate::content::defaults::default_value();
        let before = doc.clone();
        assert!(migrate(&mut doc).is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_hero_without_text_is_not_migrated() {
        let mut doc = json!({"hero": {"subtitle": "s"}});
        assert!(migrate(&mut doc).is_empty());

        let mut doc = json!({"hero": {"slides": null, "title": "T"}});
        assert_eq!(migrate(&mut doc), vec![MigrationStep::HeroSlides]);
    }

    #[test]
    fn test_null_passes_through() {
        let mut doc = Value::Null;
        assert!(migrate(&mut doc).is_empty());
        assert!(doc.is_null());
    }

    #[test]
    fn test_pending_steps_does_not_mutate() {
        let doc = json!({"gallery": []});
        assert_eq!(pending_steps(&doc), vec![MigrationStep::GalleryAlbums]);
        assert!(doc["gallery"].is_array());
    }
}
