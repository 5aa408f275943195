pub mod book;
pub mod buckets;
pub mod curve;
pub mod format;
pub mod locator;
pub mod orientation;
pub mod service;
pub mod tick_range;
