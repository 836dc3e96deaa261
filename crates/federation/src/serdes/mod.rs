//! Versioned, self-describing envelope codec.
//!
//! Records derive plain `serde` traits; this module wraps their plain JSON form in
//! an envelope carrying a type tag and a schema version:
//!
//! ```json
//! {"__class__": "SerializedAssetDepData", "__version__": 1, "fields": {"asset_key": ["a"]}}
//! ```
//!
//! Nested records are enveloped recursively, as described by each field's [`Nesting`].
//!
//! # Evolution
//!
//! Each field records the schema version that introduced it. Decoding a payload
//! written at an older version fills fields introduced later from their default.
//! Fields that were later dropped are listed in [`RecordSchema::removed_fields`] and
//! discarded on decode. A payload whose version is newer than the schema's is
//! rejected outright.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::SerdesError;

pub const CLASS_KEY: &str = "__class__";
pub const VERSION_KEY: &str = "__version__";
pub const FIELDS_KEY: &str = "fields";

/// How a field's value relates to other records.
#[derive(Debug, Clone, Copy)]
pub enum Nesting {
	/// Plain JSON, stored as-is.
	Plain,
	/// A single nested record, or `null`.
	Record(&'static RecordSchema),
	/// An array of nested records.
	Seq(&'static RecordSchema),
	/// An object whose values are nested records.
	MapValues(&'static RecordSchema),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
	pub name: &'static str,
	/// Schema version that introduced the field.
	pub added_in: u32,
	/// Value used when decoding a payload older than `added_in`.
	pub default: Option<fn() -> Value>,
	pub nested: Nesting,
}

impl FieldSchema {
	pub const fn plain(name: &'static str) -> Self {
		Self {
			name,
			added_in: 1,
			default: None,
			nested: Nesting::Plain,
		}
	}

	pub const fn nested(name: &'static str, nested: Nesting) -> Self {
		Self {
			name,
			added_in: 1,
			default: None,
			nested,
		}
	}

	/// Marks the field as introduced in `version`, defaulting to `default` for older payloads.
	pub const fn added_in(self, version: u32, default: fn() -> Value) -> Self {
		Self {
			added_in: version,
			default: Some(default),
			..self
		}
	}
}

/// Static description of one record type's persisted shape.
#[derive(Debug)]
pub struct RecordSchema {
	pub name: &'static str,
	/// Current version; payloads above it are rejected.
	pub version: u32,
	pub fields: &'static [FieldSchema],
	/// Fields present in older versions and dropped since.
	pub removed_fields: &'static [&'static str],
}

impl RecordSchema {
	fn field(&self, name: &str) -> Option<&FieldSchema> {
		self.fields.iter().find(|field| field.name == name)
	}

	fn malformed(&self, reason: impl Into<String>) -> SerdesError {
		SerdesError::Malformed {
			record: self.name,
			reason: reason.into(),
		}
	}
}

/// A record type with a persisted schema.
pub trait SerdesRecord: Serialize + DeserializeOwned {
	fn schema() -> &'static RecordSchema;
}

/// Default for collection fields introduced after version 1.
pub fn empty_array() -> Value {
	Value::Array(Vec::new())
}

pub fn empty_object() -> Value {
	Value::Object(Map::new())
}

fn pack(schema: &'static RecordSchema, plain: Value) -> Result<Value, SerdesError> {
	let Value::Object(mut plain) = plain else {
		return Err(schema.malformed("record did not serialise to an object"));
	};
	let mut fields = Map::new();
	for field in schema.fields {
		let value = plain.remove(field.name).ok_or(SerdesError::MissingField {
			record: schema.name,
			field: field.name,
		})?;
		fields.insert(field.name.to_string(), pack_nested(field.nested, value)?);
	}

	let mut envelope = Map::new();
	envelope.insert(CLASS_KEY.to_string(), Value::from(schema.name));
	envelope.insert(VERSION_KEY.to_string(), Value::from(schema.version));
	envelope.insert(FIELDS_KEY.to_string(), Value::Object(fields));
	Ok(Value::Object(envelope))
}

fn pack_nested(nested: Nesting, value: Value) -> Result<Value, SerdesError> {
	match (nested, value) {
		(Nesting::Plain, value) | (_, value @ Value::Null) => Ok(value),
		(Nesting::Record(schema), value) => pack(schema, value),
		(Nesting::Seq(schema), Value::Array(items)) => {
			items.into_iter().map(|item| pack(schema, item)).collect::<Result<_, _>>().map(Value::Array)
		}
		(Nesting::MapValues(schema), Value::Object(entries)) => entries
			.into_iter()
			.map(|(key, item)| Ok((key, pack(schema, item)?)))
			.collect::<Result<Map<_, _>, SerdesError>>()
			.map(Value::Object),
		(Nesting::Seq(schema), _) => Err(schema.malformed("expected an array of records")),
		(Nesting::MapValues(schema), _) => Err(schema.malformed("expected an object of records")),
	}
}

/// Type tag of an enveloped payload.
pub fn record_type(value: &Value) -> Option<&str> {
	value.get(CLASS_KEY).and_then(Value::as_str)
}

fn unpack(schema: &'static RecordSchema, envelope: Value) -> Result<Value, SerdesError> {
	let Value::Object(mut envelope) = envelope else {
		return Err(schema.malformed("expected an enveloped object"));
	};
	let class = match envelope.get(CLASS_KEY) {
		Some(Value::String(class)) => class.as_str(),
		_ => return Err(schema.malformed(format!("missing {CLASS_KEY} tag"))),
	};
	if class != schema.name {
		return Err(if super::records::schema_by_name(class).is_some() {
			SerdesError::TypeMismatch {
				expected: schema.name,
				found: class.to_string(),
			}
		} else {
			SerdesError::UnknownRecordType(class.to_string())
		});
	}
	let version = envelope
		.get(VERSION_KEY)
		.and_then(Value::as_u64)
		.ok_or_else(|| schema.malformed(format!("missing or invalid {VERSION_KEY}")))?;
	if version == 0 {
		return Err(schema.malformed("schema versions start at 1"));
	}
	if version > u64::from(schema.version) {
		return Err(SerdesError::SchemaVersion {
			record: schema.name,
			found: version,
			supported: schema.version,
		});
	}
	let mut fields = match envelope.remove(FIELDS_KEY) {
		Some(Value::Object(fields)) => fields,
		_ => return Err(schema.malformed(format!("missing {FIELDS_KEY} object"))),
	};

	let mut plain = Map::new();
	for field in schema.fields {
		let value = match fields.remove(field.name) {
			Some(value) => unpack_nested(field.nested, value)?,
			None => match field.default {
				Some(default) if u64::from(field.added_in) > version => default(),
				_ => {
					return Err(SerdesError::MissingField {
						record: schema.name,
						field: field.name,
					});
				}
			},
		};
		plain.insert(field.name.to_string(), value);
	}
	for name in fields.keys() {
		if !schema.removed_fields.contains(&name.as_str()) && schema.field(name).is_none() {
			return Err(schema.malformed(format!("unexpected field {name:?}")));
		}
	}
	Ok(Value::Object(plain))
}

fn unpack_nested(nested: Nesting, value: Value) -> Result<Value, SerdesError> {
	match (nested, value) {
		(Nesting::Plain, value) | (_, value @ Value::Null) => Ok(value),
		(Nesting::Record(schema), value) => unpack(schema, value),
		(Nesting::Seq(schema), Value::Array(items)) => {
			items.into_iter().map(|item| unpack(schema, item)).collect::<Result<_, _>>().map(Value::Array)
		}
		(Nesting::MapValues(schema), Value::Object(entries)) => entries
			.into_iter()
			.map(|(key, item)| Ok((key, unpack(schema, item)?)))
			.collect::<Result<Map<_, _>, SerdesError>>()
			.map(Value::Object),
		(Nesting::Seq(schema), _) => Err(schema.malformed("expected an array of records")),
		(Nesting::MapValues(schema), _) => Err(schema.malformed("expected an object of records")),
	}
}

/// Encodes `record` into its enveloped form.
pub fn serialize_value<T: SerdesRecord>(record: &T) -> Result<Value, SerdesError> {
	pack(T::schema(), serde_json::to_value(record)?)
}

/// Decodes an enveloped payload written at any supported version of `T`.
pub fn deserialize_value<T: SerdesRecord>(value: Value) -> Result<T, SerdesError> {
	let plain = unpack(T::schema(), value)?;
	Ok(serde_json::from_value(plain)?)
}

pub fn serialize_to_string<T: SerdesRecord>(record: &T) -> Result<String, SerdesError> {
	Ok(serde_json::to_string(&serialize_value(record)?)?)
}

/// Like [`serialize_to_string`], indented for files meant to be read and diffed.
pub fn serialize_to_string_pretty<T: SerdesRecord>(record: &T) -> Result<String, SerdesError> {
	Ok(serde_json::to_string_pretty(&serialize_value(record)?)?)
}

pub fn deserialize_from_str<T: SerdesRecord>(input: &str) -> Result<T, SerdesError> {
	deserialize_value(serde_json::from_str(input)?)
}

#[cfg(test)]
mod tests;
