//! Domain models for the place directory

pub mod place;
pub mod request;

pub use place::{
    ApprovalStatus, Keyword, PlaceRow, RegistrationStatus, SortBy, SortDirection,
};
pub use request::{
    ActivateRequest, ApprovalRequest, ContactPayload, LocationPayload, ParkingPayload,
    RegisterPlaceRequest, RegistrationUpdateRequest, UpdatePlaceRequest,
};
