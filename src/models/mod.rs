pub mod location;
pub mod message;
pub mod stop_event;
pub mod vehicle;

pub use location::{LocationSample, NewLocationSample};
pub use stop_event::{StopEvent, VisitType};
pub use vehicle::Vehicle;
