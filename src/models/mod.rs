pub mod catalog;

pub use catalog::{ColorVariant, Dimensions, Locale, PrimaryColor, SizeVariant};
