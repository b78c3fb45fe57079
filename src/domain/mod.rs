pub mod error;
pub mod model;
pub mod params;
pub mod traits;
