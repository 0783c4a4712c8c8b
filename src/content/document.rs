//! Content Document Types
//!
//! The typed view of the single site document. Field names on the wire are
//! camelCase so the stored JSON stays readable by every other client of the
//! same local entry and remote row.
//!
//! Every section keeps unknown keys in a flattened `extra` map, so a
//! load/save round trip never drops fields this build does not know about.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Read a stored value as `T`, falling back to the default.
///
/// Stored documents written by older clients can carry `null` or a value
/// of the wrong shape; the merged document must still be total.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default())
}

/// Display text from any scalar: numbers and booleans keep their text,
/// `null` and containers read as empty.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(scalar_text)
        .unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// A list where unreadable entries are skipped rather than failing the list
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Ratings arrive as numbers, numeric strings, or `null` (a failed parse).
fn lenient_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(1.0, 5.0) as u8)
        .unwrap_or(DEFAULT_RATING))
}

/// Rating assigned when none (or an unreadable one) is stored
pub const DEFAULT_RATING: u8 = 5;

fn default_rating() -> u8 {
    DEFAULT_RATING
}

/// Strip every non-digit character (`"+91 73560 44637"` → `"917356044637"`).
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The whole editable site document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub hero: Hero,
    #[serde(default, deserialize_with = "lenient")]
    pub certification: Certification,
    #[serde(default, deserialize_with = "lenient")]
    pub about: About,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub testimonials: Vec<Testimonial>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact: Contact,
    #[serde(default, deserialize_with = "lenient")]
    pub footer: Footer,
    #[serde(default, deserialize_with = "lenient")]
    pub gallery: Gallery,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentDocument {
    /// Build the typed document from an already merged JSON value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Convert back into the JSON shape that is persisted
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Re-establish derived fields before the document is persisted.
    ///
    /// `contact.phoneRaw` is always the digits of `contact.phone`.
    pub fn normalize(&mut self) {
        self.contact.phone_raw = digits_only(&self.contact.phone);
    }

    /// Testimonials visible on the public site (anything not pending)
    pub fn approved_testimonials(&self) -> impl Iterator<Item = &Testimonial> {
        self.testimonials.iter().filter(|t| t.is_approved())
    }

    /// Visitor submissions waiting for moderation, with their positions
    pub fn pending_testimonials(&self) -> impl Iterator<Item = (usize, &Testimonial)> {
        self.testimonials
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_approved())
    }
}

/// Hero carousel and headline stats
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub slides: Vec<HeroSlide>,
    #[serde(default, deserialize_with = "lenient")]
    pub stats: HeroStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One carousel slide; the first slide's text is the page headline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tagline: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free-text display figures shown under the hero
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroStats {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub years_exp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub events_count: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub clients_count: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub line1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub line2: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(default, deserialize_with = "lenient_string")]
    pub heading: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paragraph1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paragraph2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub badge_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Moderation state of a testimonial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialStatus {
    /// Submitted by a visitor, not yet reviewed
    Pending,
    /// Visible on the site. Unknown or missing status reads as approved.
    #[default]
    #[serde(other)]
    Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(default, deserialize_with = "lenient_string")]
    pub quote: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub initials: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: TestimonialStatus,
    #[serde(default = "default_rating", deserialize_with = "lenient_rating")]
    pub rating: u8,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    /// Submission time in milliseconds since the Unix epoch
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Testimonial {
    fn default() -> Self {
        Self {
            quote: String::new(),
            name: String::new(),
            date: String::new(),
            initials: String::new(),
            status: TestimonialStatus::Approved,
            rating: DEFAULT_RATING,
            email: None,
            submitted_at: None,
            extra: Map::new(),
        }
    }
}

impl Testimonial {
    pub fn is_approved(&self) -> bool {
        self.status == TestimonialStatus::Approved
    }

    /// Up to two upper-case initials from the words of a name
    pub fn initials_for(name: &str) -> String {
        name.split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address_line1: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address_line2: Option<String>,
    /// Display form, e.g. `+91 73560 44637`
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    /// Digits of `phone`, used for `tel:` links
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_raw: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contact {
    /// Set the display phone and keep `phone_raw` in step
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
        self.phone_raw = digits_only(&self.phone);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub copyright: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Photo albums plus the flat "recent highlights" reel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub albums: Vec<Album>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub recent: Vec<GalleryImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gallery {
    pub fn album(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    pub fn album_mut(&mut self, id: &str) -> Option<&mut Album> {
        self.albums.iter_mut().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Stable handle; unique within `gallery.albums`
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cover_url: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub images: Vec<GalleryImage>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub subtitle: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GalleryImage {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+91 73560 44637"), "917356044637");
        assert_eq!(digits_only("(735) 604-4637"), "7356044637");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn test_normalize_derives_phone_raw() {
        let mut doc = ContentDocument::default();
        doc.contact.phone = "+91 73560 44637".to_string();
        doc.contact.phone_raw = "stale".to_string();
        doc.normalize();
        assert_eq!(doc.contact.phone_raw, "917356044637");
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut doc = ContentDocument::default();
        doc.hero.stats.years_exp = "15+".to_string();
        doc.contact.set_phone("7356044637");
        doc.about.image_url = "a.jpg".to_string();

        let value = doc.to_value().unwrap();
        assert_eq!(value["hero"]["stats"]["yearsExp"], "15+");
        assert_eq!(value["contact"]["phoneRaw"], "7356044637");
        assert_eq!(value["about"]["imageUrl"], "a.jpg");
        assert!(value["contact"].get("addressLine1").is_none());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let doc = ContentDocument::from_value(json!({
            "contact": { "phone": null, "email": "a@b.co" },
            "footer": null,
        }))
        .unwrap();
        assert_eq!(doc.contact.phone, "");
        assert_eq!(doc.contact.email, "a@b.co");
        assert_eq!(doc.footer, Footer::default());
    }

    #[test]
    fn test_testimonial_status_and_rating_are_lenient() {
        let doc = ContentDocument::from_value(json!({
            "testimonials": [
                { "quote": "q1", "name": "A" },
                { "quote": "q2", "status": "pending", "rating": "4" },
                { "quote": "q3", "status": "archived", "rating": null },
                { "quote": "q4", "rating": 9 }
            ]
        }))
        .unwrap();

        let t = &doc.testimonials;
        assert_eq!(t[0].status, TestimonialStatus::Approved);
        assert_eq!(t[0].rating, 5);
        assert_eq!(t[1].status, TestimonialStatus::Pending);
        assert_eq!(t[1].rating, 4);
        assert_eq!(t[2].status, TestimonialStatus::Approved);
        assert_eq!(t[2].rating, 5);
        assert_eq!(t[3].rating, 5);
    }

    #[test]
    fn test_mistyped_fields_are_read_leniently() {
        let doc = ContentDocument::from_value(json!({
            "hero": {
                "stats": { "yearsExp": 15, "rating": 4.8, "eventsCount": true, "clientsCount": [1] },
                "slides": [{ "title": "Kept" }, "not a slide", null]
            },
            "contact": { "phone": 7356044637u64, "addressLine1": 12 },
            "testimonials": [{ "quote": "q", "status": 3, "email": false, "submittedAt": "yesterday" }]
        }))
        .unwrap();

        assert_eq!(doc.hero.stats.years_exp, "15");
        assert_eq!(doc.hero.stats.rating, "4.8");
        assert_eq!(doc.hero.stats.events_count, "true");
        assert_eq!(doc.hero.stats.clients_count, "");
        assert_eq!(doc.hero.slides.len(), 1);
        assert_eq!(doc.hero.slides[0].title, "Kept");
        assert_eq!(doc.contact.phone, "7356044637");
        assert_eq!(doc.contact.address_line1.as_deref(), Some("12"));
        assert_eq!(doc.testimonials[0].status, TestimonialStatus::Approved);
        assert_eq!(doc.testimonials[0].email.as_deref(), Some("false"));
        assert_eq!(doc.testimonials[0].submitted_at, None);
    }

    #[test]
    fn test_unknown_nested_keys_survive_round_trip() {
        let input = json!({
            "hero": {
                "slides": [{ "image": "s.jpg", "buttonText": "Book" }],
                "stats": { "rating": "5", "awards": "12" }
            },
            "certification": { "line1": "ISO", "badge": "gold.svg" },
            "gallery": { "albums": [], "recent": [{ "url": "u", "title": "t", "alt": "Stage" }] }
        });
        let out = ContentDocument::from_value(input).unwrap().to_value().unwrap();

        assert_eq!(out["hero"]["slides"][0]["buttonText"], "Book");
        assert_eq!(out["hero"]["stats"]["awards"], "12");
        assert_eq!(out["certification"]["badge"], "gold.svg");
        assert_eq!(out["gallery"]["recent"][0]["alt"], "Stage");
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let input = json!({
            "contact": { "phone": "1", "whatsapp": "+1 555" },
            "seo": { "title": "Events" },
            "gallery": {
                "albums": [{ "id": "a", "title": "T", "coverUrl": "c", "images": [], "subtitle": "S", "featured": true }],
                "recent": []
            }
        });
        let doc = ContentDocument::from_value(input).unwrap();
        let out = doc.to_value().unwrap();

        assert_eq!(out["contact"]["whatsapp"], "+1 555");
        assert_eq!(out["seo"]["title"], "Events");
        assert_eq!(out["gallery"]["albums"][0]["subtitle"], "S");
        assert_eq!(out["gallery"]["albums"][0]["featured"], true);
    }

    #[test]
    fn test_initials() {
        assert_eq!(Testimonial::initials_for("Ashok Kumar"), "AK");
        assert_eq!(Testimonial::initials_for("pindiyan antony raj"), "PA");
        assert_eq!(Testimonial::initials_for("  "), "");
    }

    #[test]
    fn test_approved_and_pending_views() {
        let mut doc = ContentDocument::default();
        doc.testimonials.push(Testimonial {
            status: TestimonialStatus::Pending,
            ..Default::default()
        });
        doc.testimonials.push(Testimonial::default());

        assert_eq!(doc.approved_testimonials().count(), 1);
        let pending: Vec<usize> = doc.pending_testimonials().map(|(i, _)| i).collect();
        assert_eq!(pending, vec![0]);
    }
}
