pub mod booking;
pub mod config;
pub mod data;
pub mod meeting;
pub mod off_hours;
pub mod participant;
pub mod report;
pub mod schedule;
pub mod time;
pub mod window;

pub use booking::{Booking, BookingRequest};
pub use config::{InferencePolicy, SchedulerConfig};
pub use data::{BusyInterval, CascadePass, FreeSlot, SchedulingCandidate, SchedulingError};
pub use meeting::find_common_free_slots;
pub use participant::{infer_working_window, Participant};
pub use report::AvailabilityReport;
pub use schedule::{Scheduler, Suggestion};
pub use time::TimeRange;
pub use window::WorkingWindow;
