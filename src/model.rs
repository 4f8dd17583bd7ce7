//! Core data model: observation identity, the caller-held cursor, and the
//! frame handed to the reduction pipeline.

mod cursor;
mod frame;
mod observation;

pub use cursor::Cursor;
pub use frame::Frame;
pub use observation::ObservationId;
