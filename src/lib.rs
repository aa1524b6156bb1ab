pub mod feed;
pub mod pattern;
pub mod prelude;
pub mod realtime;
pub mod shared;
pub mod timetable;
