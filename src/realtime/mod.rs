use std::sync::Arc;

use thiserror::Error;

mod block;
mod matching;
mod source;
mod update;
mod updater;
pub use block::*;
pub use source::*;
pub use update::*;
pub use updater::*;

use crate::timetable;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Update block for trip {0} is not coherent")]
    InsaneBlock(Arc<str>),
    #[error("Only committed snapshots can be published")]
    NotCommitted,
    #[error("Timetable error: {0}")]
    Timetable(#[from] timetable::Error),
}
