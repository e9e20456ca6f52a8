pub mod conversation;
pub mod destination;
pub mod expert;
pub mod itinerary;
