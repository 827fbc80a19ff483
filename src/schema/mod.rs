mod fields;
mod record;
mod validate;

pub use fields::{Field, FieldKind};
pub use record::{CustomerRecord, FieldValue};
pub use validate::{FieldError, ValidationErrors, ValidationRules, validate};

pub(crate) use record::RecordBuilder;
