pub mod extraction;
pub mod settings;
pub mod shift;
pub mod store;

pub use extraction::{ExtractionError, ExtractionInput, Extractor, ScheduleError};
pub use settings::NameFilter;
pub use shift::{Annotation, DateWindow, ShiftRecord, TimeText};
pub use store::StoreRow;
