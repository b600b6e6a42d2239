//! Deterministic mapping from DummyJSON products to travel destinations.
//!
//! Every choice derives from the product id, so the same payload always yields
//! the same destination.

use super::dto::ProductDto;
use crate::domain::{Destination, EntryId};

const TITLE_PREFIXES: [&str; 8] = [
    "Explore",
    "Discover",
    "Visit",
    "Experience",
    "Journey to",
    "Adventure in",
    "Escape to",
    "Getaway to",
];

const TRAVEL_CATEGORIES: [&str; 8] = [
    "Beach Paradise",
    "City Break",
    "Adventure",
    "Cultural Tour",
    "Mountain Retreat",
    "Island Getaway",
    "Historical Site",
    "Nature Escape",
];

const TRAVEL_LOCATIONS: [&str; 17] = [
    "Paris, France",
    "Tokyo, Japan",
    "New York, USA",
    "London, UK",
    "Dubai, UAE",
    "Sydney, Australia",
    "Barcelona, Spain",
    "Rome, Italy",
    "Bali, Indonesia",
    "Bangkok, Thailand",
    "Istanbul, Turkey",
    "Amsterdam, Netherlands",
    "Singapore",
    "Maldives",
    "Santorini, Greece",
    "Iceland",
    "Cape Town, South Africa",
];

const TRAVEL_PHRASES: [&str; 4] = [
    "Perfect destination for travelers seeking adventure and culture.",
    "Experience breathtaking views and unforgettable memories.",
    "Immerse yourself in local culture and stunning landscapes.",
    "A must-visit destination with rich history and vibrant atmosphere.",
];

const EMPTY_DESCRIPTION: &str = "An unforgettable travel experience awaits you.";
const DESCRIPTION_KEEP_LEN: usize = 50;
const DEFAULT_RATING: f64 = 4.5;

fn pick<const N: usize>(items: &[&'static str; N], id: u64) -> &'static str {
    let index = usize::try_from(id % N as u64).unwrap_or_default();
    items[index]
}

fn travel_title(id: u64, raw: &str) -> String {
    let main_word = raw.split_whitespace().next().unwrap_or("Paradise");
    format!("{} {main_word}", pick(&TITLE_PREFIXES, id))
}

fn travel_description(id: u64, raw: &str) -> String {
    if raw.is_empty() {
        EMPTY_DESCRIPTION.to_owned()
    } else if raw.chars().count() > DESCRIPTION_KEEP_LEN {
        raw.to_owned()
    } else {
        pick(&TRAVEL_PHRASES, id).to_owned()
    }
}

fn travel_price(price: f64) -> u64 {
    // `as` saturates: NaN and negatives become zero.
    (price * 10.0).round() as u64
}

fn travel_duration(id: u64) -> String {
    let shortest = id % 7 + 1;
    let longest = (id / 7) % 7 + 7;
    format!("{shortest}-{longest} days")
}

/// Map one product onto a destination.
pub(super) fn product_to_destination(product: ProductDto) -> Destination {
    let id = product.id;
    Destination {
        id: EntryId::new(id),
        title: travel_title(id, &product.title),
        description: travel_description(id, &product.description),
        image: product.thumbnail.clone(),
        price: travel_price(product.price),
        category: pick(&TRAVEL_CATEGORIES, id).to_owned(),
        tags: product.tags,
        rating: product
            .rating
            .filter(|rating| rating.is_finite() && *rating > 0.0)
            .unwrap_or(DEFAULT_RATING),
        thumbnail: product.thumbnail,
        location: Some(pick(&TRAVEL_LOCATIONS, id).to_owned()),
        duration: Some(travel_duration(id)),
    }
}
