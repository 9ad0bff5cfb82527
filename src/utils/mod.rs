pub mod geo;
pub mod links;
