pub mod submission;
pub mod export;

pub use submission::{
    validate_publish, validate_submission, AvailabilityFormRequest, DayAvailability, DayHours, ScheduleRecord,
    SchedulePublishRequest,
};
pub use export::{export_assignments_to_csv, export_submissions_to_csv};
