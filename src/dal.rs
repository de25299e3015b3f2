pub mod bus_stops;

pub use bus_stops::*;
