//! Default Document
//!
//! The baseline values for every recognised field. Missing sections of a
//! stored document are filled from here, and it is the final fallback when
//! nothing usable is stored anywhere.
//!
//! Each call builds a fresh value; there is no shared instance to mutate.

use crate::content::document::{
    About, Album, Certification, Contact, ContentDocument, Footer, Gallery, GalleryImage, Hero,
    HeroSlide, HeroStats, Testimonial, TestimonialStatus,
};
use serde_json::{Map, Value};

/// Image used when a legacy hero carried no image of its own
pub const PLACEHOLDER_HERO_IMAGE: &str =
    "https://images.unsplash.com/photo-1519167758481-83f550bb49b3?w=1600&fit=crop";

pub const DEFAULT_RATING_TEXT: &str = "4.8/5";
pub const DEFAULT_YEARS_EXP: &str = "15+";
pub const DEFAULT_EVENTS_COUNT: &str = "5000+";
pub const DEFAULT_CLIENTS_COUNT: &str = "3000+";

const COMPANY: &str = "Storied International";

/// The fixed image set the gallery is reset to
const RESET_IMAGES: [(&str, &str); 6] = [
    (
        "https://images.unsplash.com/photo-1519167758481-83f550bb49b3?w=600&h=400&fit=crop",
        "Event 1",
    ),
    (
        "https://images.unsplash.com/photo-1464366400600-7168b8af9bc3?w=600&h=400&fit=crop",
        "Event 2",
    ),
    (
        "https://images.unsplash.com/photo-1511578314322-379afb476865?w=600&h=400&fit=crop",
        "Event 3",
    ),
    (
        "https://images.unsplash.com/photo-1465495976277-4387d4b0b4c6?w=600&h=400&fit=crop",
        "Event 4",
    ),
    (
        "https://images.unsplash.com/photo-1492684223066-81342ee5ff30?w=600&h=400&fit=crop",
        "Event 5",
    ),
    (
        "https://images.unsplash.com/photo-1511795409834-ef04bbd61622?w=600&h=400&fit=crop",
        "Event 6",
    ),
];

/// Images restored by an explicit gallery reset
pub fn default_gallery_images() -> Vec<GalleryImage> {
    RESET_IMAGES
        .iter()
        .map(|(url, title)| GalleryImage::new(*url, *title))
        .collect()
}

fn approved(quote: &str, name: &str, date: &str, initials: &str) -> Testimonial {
    Testimonial {
        quote: quote.to_string(),
        name: name.to_string(),
        date: date.to_string(),
        initials: initials.to_string(),
        status: TestimonialStatus::Approved,
        rating: 5,
        ..Default::default()
    }
}

/// A fresh copy of the default document
pub fn default_document() -> ContentDocument {
    ContentDocument {
        hero: Hero {
            slides: vec![HeroSlide {
                image: PLACEHOLDER_HERO_IMAGE.to_string(),
                tagline: "Kerala's #1 Exclusive Event Company".to_string(),
                title: format!("Partner with {COMPANY} for Your Dream Events"),
                subtitle: "We make everything from corporate event planning and personal celebrations to customized event packages absolutely memorable!".to_string(),
                extra: Map::new(),
            }],
            stats: HeroStats {
                rating: DEFAULT_RATING_TEXT.to_string(),
                years_exp: DEFAULT_YEARS_EXP.to_string(),
                events_count: DEFAULT_EVENTS_COUNT.to_string(),
                clients_count: DEFAULT_CLIENTS_COUNT.to_string(),
                extra: Map::new(),
            },
            extra: Map::new(),
        },
        certification: Certification {
            line1: "ISO 9001:2015 CERTIFIED".to_string(),
            line2: "Professional Event Management Company".to_string(),
            extra: Map::new(),
        },
        about: About {
            heading: "About Us".to_string(),
            title: COMPANY.to_string(),
            paragraph1: format!("Have you ever dreamed of planning the perfect event that will be remembered forever? Look no further than {COMPANY}, the top-notch event management company that has everything you need to make your occasion an unforgettable experience."),
            paragraph2: "We make everything from corporate event planning and personal celebrations to even small customized event packages absolutely memorable! Contact us today to learn more about our services and how we can help you organize the top event management.".to_string(),
            image_url: "https://images.unsplash.com/photo-1519167758481-83f550bb49b3?w=800&h=600&fit=crop".to_string(),
            badge_text: "Trusted & Reliable".to_string(),
            extra: Map::new(),
        },
        testimonials: vec![
            approved(
                "Excellent…everyone was surprised by seeing their performances….. definitely will invite for next function…….highly recommended!!!!!! It's the highlight of our marriage!!!!",
                "Ashok Kumar",
                "June 2023",
                "AK",
            ),
            approved(
                "This is best event management company. Our wedding event was amazing with this company. We are very happy with this group.",
                "Ashik Ch",
                "May 2023",
                "AC",
            ),
            approved(
                "In my point of view best event management and very good wedding planner. Excellent team management and coordination.",
                "Pindiyan Antony",
                "April 2023",
                "PA",
            ),
        ],
        contact: Contact {
            address: "123 Event Street, City, State 12345".to_string(),
            address_line1: Some("123 Event Street".to_string()),
            address_line2: Some("City, State 12345".to_string()),
            phone: "7356044637".to_string(),
            phone_raw: "7356044637".to_string(),
            email: "Storiedeventplanners@gmail.com".to_string(),
            extra: Map::new(),
        },
        footer: Footer {
            company_name: COMPANY.to_string(),
            description: format!("Planning a full event has never been easier! {COMPANY} offers a wide range of services to make your events stress-free and memorable."),
            copyright: format!("© 2024 {COMPANY}. All Rights Reserved."),
            extra: Map::new(),
        },
        gallery: Gallery {
            albums: vec![Album {
                id: "album-1".to_string(),
                title: "Wedding Events".to_string(),
                cover_url: "https://images.unsplash.com/photo-1511795409834-ef04bbd61622?w=600&h=400&fit=crop".to_string(),
                images: vec![
                    GalleryImage::new(
                        "https://images.unsplash.com/photo-1519167758481-83f550bb49b3?w=800&fit=crop",
                        "Wedding Day 1",
                    ),
                    GalleryImage::new(
                        "https://images.unsplash.com/photo-1511795409834-ef04bbd61622?w=800&fit=crop",
                        "Wedding Day 2",
                    ),
                ],
                ..Default::default()
            }],
            recent: default_gallery_images().into_iter().take(2).collect(),
            extra: Map::new(),
        },
        extra: Map::new(),
    }
}

/// The default document in its persisted JSON shape
pub fn default_value() -> Value {
    serde_json::to_value(default_document()).unwrap_or_else(|_| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect every leaf path of a JSON object (arrays count as leaves)
    fn leaf_paths(value: &Value, prefix: String, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    leaf_paths(v, format!("{prefix}/{k}"), out);
                }
            }
            _ => out.push(prefix),
        }
    }

    #[test]
    fn test_defaults_are_fresh_copies() {
        let mut a = default_document();
        a.footer.company_name = "Changed".to_string();
        let b = default_document();
        assert_eq!(b.footer.company_name, COMPANY);
    }

    #[test]
    fn test_no_empty_display_strings() {
        let value = default_value();
        let mut paths = Vec::new();
        leaf_paths(&value, String::new(), &mut paths);
        for path in paths {
            let leaf = value.pointer(&path).unwrap();
            assert!(!leaf.is_null(), "{path} is null");
            if let Some(s) = leaf.as_str() {
                assert!(!s.is_empty(), "{path} is empty");
            }
        }
    }

    #[test]
    fn test_defaults_have_every_section() {
        let value = default_value();
        for key in [
            "hero",
            "certification",
            "about",
            "testimonials",
            "contact",
            "footer",
            "gallery",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["hero"]["stats"]["rating"], DEFAULT_RATING_TEXT);
        assert_eq!(value["gallery"]["recent"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_phone_raw_matches_phone() {
        let doc = default_document();
        assert_eq!(
            crate::content::document::digits_only(&doc.contact.phone),
            doc.contact.phone_raw
        );
    }

    #[test]
    fn test_reset_images() {
        let images = default_gallery_images();
        assert_eq!(images.len(), 6);
        assert_eq!(images[5].title, "Event 6");
    }
}
