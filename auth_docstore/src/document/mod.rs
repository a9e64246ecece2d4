mod errors;
mod fields;
mod format;
pub mod tagged;
mod types;

pub use errors::FormatError;
pub use fields::{
    ACCOUNT_FIELDS, Entity, Projection, SESSION_FIELDS, USER_FIELDS, VERIFICATION_TOKEN_FIELDS,
};
pub use format::{from_document, to_document};
pub use types::{Collection, Document, DocumentId};
