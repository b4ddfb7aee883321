//! Google Calendar mirror for the persona calendar.

mod calendar;
mod to_google;

pub use calendar::{GoogleCalendar, GoogleCredentials};
pub use to_google::ToGoogle;
