pub mod category;
pub mod color;
pub mod customer;
pub mod material;
pub mod product;
pub mod reference;
pub mod showroom_node;

pub use reference::{ReferenceEntity, ReferenceInput};
