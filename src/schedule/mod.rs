pub mod types;
pub mod slot_utils;
pub mod catalog;
pub mod availability;
pub mod proportional;
pub mod legacy;
pub mod coverage;

pub use types::{
    Assignment, AssignmentFlag, AvailabilitySubmission, CoverageWindow, DayCoverageStatus, DayOfWeek, ShiftBlock,
    ShiftType, TimeOfDay, TimeWindow, WeeklyCoverage,
};
pub use slot_utils::{calculate_time_slots, day_time_slots};
pub use catalog::{BlockTemplate, ShiftBlockCatalog};
pub use availability::{overlap_hours, total_hours};
pub use proportional::{allocate_proportional, NameOrder, ProportionalAllocator, RandomTieBreak, TieBreaker};
pub use legacy::allocate_legacy;
pub use coverage::{classify_day_coverage, summarize_coverage, DayCoverage};
