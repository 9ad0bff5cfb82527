pub mod address;
pub mod delivery;
pub mod extract;
pub mod location;
