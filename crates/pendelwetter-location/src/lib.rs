//! Location state for Pendelwetter.
//!
//! Owns the single `LocationState` shared by every view: where the user is,
//! whether that came from GPS or manual entry, and how fresh it is. The state
//! is persisted to durable storage after every change and rehydrated on start.

pub mod geocode;
pub mod geolocate;
pub mod storage;
pub mod store;
pub mod types;

pub use geocode::Geocoder;
pub use geolocate::{GeolocationOptions, IpLookupProvider, PositionFix, PositionProvider};
pub use storage::LocationStorage;
pub use store::LocationStore;
pub use types::{LocationError, LocationSource, LocationState};
