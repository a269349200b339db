pub mod calendar;
pub mod event;
pub mod notification;
pub mod user;

pub use calendar::{Calendar, NewCalendar, PopulatedCalendar, SharingEntry};
pub use event::{Event, NewEvent};
pub use notification::{NewNotification, Notification};
pub use user::{NewUser, User, UserSummary};
