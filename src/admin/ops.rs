//! Editing operations
//!
//! Each operation mutates a loaded [`ContentDocument`] in memory. They are
//! meant to run inside [`ContentStore::update`](crate::content::ContentStore::update),
//! which loads the document, applies the edit and saves it in one cycle.
//! Inputs are checked before anything is changed, so a failed edit leaves
//! the document untouched.
//!
//! Positional arguments (`index`) refer to the document handed to the
//! edit, not to any earlier copy.

use crate::admin::error::{EditError, EditResult};
use crate::admin::validation::{validate_review, ReviewInput};
use crate::content::defaults::default_gallery_images;
use crate::content::document::{
    Album, Certification, ContentDocument, GalleryImage, HeroSlide, HeroStats, Testimonial,
    TestimonialStatus, DEFAULT_RATING,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Title given to images added to the recent highlights reel
pub const HIGHLIGHT_TITLE: &str = "Highlight";

/// Display date for testimonials, e.g. `Oct 2026`
pub fn display_date(now: DateTime<Utc>) -> String {
    now.format("%b %Y").to_string()
}

fn required(value: &str, field: &'static str) -> EditResult<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(EditError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

fn take_at<T>(items: &mut Vec<T>, index: usize, collection: &'static str) -> EditResult<T> {
    if index < items.len() {
        Ok(items.remove(index))
    } else {
        Err(EditError::IndexOutOfRange {
            collection,
            index,
            len: items.len(),
        })
    }
}

// ============================================
// Hero
// ============================================

/// Append a carousel slide; returns its position
pub fn add_slide(doc: &mut ContentDocument, mut slide: HeroSlide) -> EditResult<usize> {
    slide.image = required(&slide.image, "image")?;
    doc.hero.slides.push(slide);
    Ok(doc.hero.slides.len() - 1)
}

pub fn remove_slide(doc: &mut ContentDocument, index: usize) -> EditResult<HeroSlide> {
    take_at(&mut doc.hero.slides, index, "slide")
}

pub fn set_stats(doc: &mut ContentDocument, stats: HeroStats) {
    doc.hero.stats = stats;
}

// ============================================
// Sections
// ============================================

pub fn set_certification(doc: &mut ContentDocument, certification: Certification) {
    doc.certification = certification;
}

/// Fields edited on the About form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutUpdate {
    pub heading: String,
    pub title: String,
    pub paragraph1: String,
    pub paragraph2: String,
    pub image_url: String,
    pub badge_text: String,
}

/// Replace the About section text; the image is required
pub fn update_about(doc: &mut ContentDocument, update: AboutUpdate) -> EditResult<()> {
    let image_url = required(&update.image_url, "imageUrl")?;
    let about = &mut doc.about;
    about.heading = update.heading;
    about.title = update.title;
    about.paragraph1 = update.paragraph1;
    about.paragraph2 = update.paragraph2;
    about.image_url = image_url;
    about.badge_text = update.badge_text;
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Replace the contact details, keeping `phoneRaw` in step
pub fn update_contact(doc: &mut ContentDocument, update: ContactUpdate) {
    let contact = &mut doc.contact;
    contact.address = update.address;
    contact.email = update.email;
    contact.set_phone(update.phone);
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterUpdate {
    pub company_name: String,
    pub description: String,
    pub copyright: String,
}

pub fn update_footer(doc: &mut ContentDocument, update: FooterUpdate) {
    let footer = &mut doc.footer;
    footer.company_name = update.company_name;
    footer.description = update.description;
    footer.copyright = update.copyright;
}

// ============================================
// Testimonials
// ============================================

/// A testimonial entered by the operator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTestimonial {
    pub quote: String,
    pub name: String,
    /// Display date; today's month when absent
    #[serde(default)]
    pub date: Option<String>,
}

/// Publish a testimonial at the top of the list
pub fn add_testimonial(
    doc: &mut ContentDocument,
    input: NewTestimonial,
    now: DateTime<Utc>,
) -> EditResult<()> {
    let quote = required(&input.quote, "quote")?;
    let name = required(&input.name, "name")?;
    let date = input
        .date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| display_date(now));

    doc.testimonials.insert(
        0,
        Testimonial {
            quote,
            initials: Testimonial::initials_for(&name),
            name,
            date,
            status: TestimonialStatus::Approved,
            rating: DEFAULT_RATING,
            ..Default::default()
        },
    );
    Ok(())
}

/// Queue a visitor's review for moderation at the top of the list
pub fn submit_review(
    doc: &mut ContentDocument,
    input: &ReviewInput,
    now: DateTime<Utc>,
) -> EditResult<()> {
    let review = validate_review(input)?;
    // Validation bounds the rating to 1..=5
    let rating = u8::try_from(review.rating).unwrap_or(DEFAULT_RATING);

    doc.testimonials.insert(
        0,
        Testimonial {
            quote: review.text,
            initials: Testimonial::initials_for(&review.name),
            name: review.name,
            date: display_date(now),
            status: TestimonialStatus::Pending,
            rating,
            email: review.email,
            submitted_at: Some(now.timestamp_millis()),
            ..Default::default()
        },
    );
    Ok(())
}

pub fn approve_testimonial(doc: &mut ContentDocument, index: usize) -> EditResult<()> {
    let len = doc.testimonials.len();
    let testimonial = doc
        .testimonials
        .get_mut(index)
        .ok_or(EditError::IndexOutOfRange {
            collection: "testimonial",
            index,
            len,
        })?;
    testimonial.status = TestimonialStatus::Approved;
    Ok(())
}

/// Discard a pending review
pub fn reject_testimonial(doc: &mut ContentDocument, index: usize) -> EditResult<Testimonial> {
    remove_testimonial(doc, index)
}

pub fn remove_testimonial(doc: &mut ContentDocument, index: usize) -> EditResult<Testimonial> {
    take_at(&mut doc.testimonials, index, "testimonial")
}

// ============================================
// Gallery
// ============================================

/// Album fields entered by the operator
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    pub cover_url: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_title: Option<String>,
}

/// Append an album; returns its id (`album-<millis>`)
pub fn create_album(
    doc: &mut ContentDocument,
    input: NewAlbum,
    now: DateTime<Utc>,
) -> EditResult<String> {
    let cover_url = required(&input.cover_url, "coverUrl")?;

    let mut millis = now.timestamp_millis();
    let mut id = format!("album-{millis}");
    while doc.gallery.album(&id).is_some() {
        millis += 1;
        id = format!("album-{millis}");
    }

    doc.gallery.albums.push(Album {
        id: id.clone(),
        title: input.title.trim().to_string(),
        cover_url,
        images: Vec::new(),
        subtitle: input.subtitle,
        description: input.description,
        description_title: input.description_title,
        ..Default::default()
    });
    Ok(id)
}

pub fn remove_album(doc: &mut ContentDocument, index: usize) -> EditResult<Album> {
    take_at(&mut doc.gallery.albums, index, "album")
}

pub fn remove_album_by_id(doc: &mut ContentDocument, id: &str) -> EditResult<Album> {
    let index = doc
        .gallery
        .albums
        .iter()
        .position(|a| a.id == id)
        .ok_or_else(|| EditError::AlbumNotFound(id.to_string()))?;
    Ok(doc.gallery.albums.remove(index))
}

pub fn find_album<'a>(doc: &'a ContentDocument, id: &str) -> Option<&'a Album> {
    doc.gallery.album(id)
}

/// Append an image to an album; it takes the album's title
pub fn add_album_image(doc: &mut ContentDocument, album_id: &str, url: &str) -> EditResult<usize> {
    let url = required(url, "url")?;
    let album = doc
        .gallery
        .album_mut(album_id)
        .ok_or_else(|| EditError::AlbumNotFound(album_id.to_string()))?;
    let title = album.title.clone();
    album.images.push(GalleryImage::new(url, title));
    Ok(album.images.len() - 1)
}

pub fn remove_album_image(
    doc: &mut ContentDocument,
    album_id: &str,
    index: usize,
) -> EditResult<GalleryImage> {
    let album = doc
        .gallery
        .album_mut(album_id)
        .ok_or_else(|| EditError::AlbumNotFound(album_id.to_string()))?;
    take_at(&mut album.images, index, "album image")
}

/// Put an image at the front of the recent highlights reel
pub fn add_recent(doc: &mut ContentDocument, url: &str) -> EditResult<()> {
    let url = required(url, "url")?;
    doc.gallery
        .recent
        .insert(0, GalleryImage::new(url, HIGHLIGHT_TITLE));
    Ok(())
}

pub fn remove_recent(doc: &mut ContentDocument, index: usize) -> EditResult<GalleryImage> {
    take_at(&mut doc.gallery.recent, index, "highlight")
}

/// Replace the recent highlights with the stock images. Albums are kept.
pub fn reset_gallery(doc: &mut ContentDocument) {
    doc.gallery.recent = default_gallery_images();
}
