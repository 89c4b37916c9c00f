//! Silverware point-of-sale API: HTTP client and payload field extraction

pub mod client;
pub mod fields;

pub use client::{OrderSource, RequestEncoding, SilverwareClient};
pub use fields::{FoodHints, PAGE_SIZE};
