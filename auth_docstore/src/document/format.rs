//! Conversion between canonical records and store-native documents

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::errors::FormatError;
use super::tagged;
use super::types::{Collection, Document, DocumentId};

const ID_FIELD: &str = "id";

/// Engine metadata that never reaches a canonical record
const METADATA_FIELDS: [&str; 3] = ["id", "coll", "ts"];

/// Prepare a canonical record (or a partial one) to be written to `collection`
///
/// The public `id`, when present, becomes the document identity. Reference and
/// time fields of the collection are tagged, everything else passes through.
pub fn to_document<T: Serialize + ?Sized>(
    collection: Collection,
    record: &T,
) -> Result<Document, FormatError> {
    let Value::Object(fields) = serde_json::to_value(record)? else {
        return Err(FormatError::NotAnObject(collection));
    };

    let mut document = Document::new(collection);
    for (field, value) in fields {
        if field == ID_FIELD {
            match value {
                Value::String(id) => document.id = Some(DocumentId::from(id)),
                Value::Null => {}
                _ => return Err(FormatError::InvalidReference(field)),
            }
            continue;
        }
        let encoded = encode_field(collection, &field, value)?;
        document.data.insert(field, encoded);
    }

    Ok(document)
}

fn encode_field(collection: Collection, field: &str, value: Value) -> Result<Value, FormatError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    if collection.time_fields().contains(&field) {
        let raw = value.as_str().ok_or_else(|| FormatError::InvalidTime {
            field: field.to_string(),
            reason: "expected an RFC 3339 string".to_string(),
        })?;
        return Ok(tagged::encode_time(&tagged::parse_time(field, raw)?));
    }

    if let Some(target) = collection.reference(field) {
        let id = value
            .as_str()
            .ok_or_else(|| FormatError::InvalidReference(field.to_string()))?;
        return Ok(tagged::encode_ref(id, target));
    }

    Ok(tagged::encode_value(value))
}

/// Turn a document coming from the store into its canonical record
///
/// An absent document stays absent.
pub fn from_document<T: DeserializeOwned>(
    document: Option<Document>,
) -> Result<Option<T>, FormatError> {
    let Some(document) = document else {
        return Ok(None);
    };

    let mut fields = Map::new();
    if document.coll.exposes_identity() {
        let id = document
            .id
            .ok_or(FormatError::MissingIdentity(document.coll))?;
        fields.insert(ID_FIELD.to_string(), Value::String(id.into_string()));
    }

    for (field, value) in document.data {
        if METADATA_FIELDS.contains(&field.as_str()) {
            continue;
        }
        fields.insert(field, tagged::decode_value(value)?);
    }

    Ok(Some(serde_json::from_value(Value::Object(fields))?))
}
