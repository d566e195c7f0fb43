// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON population and serialization of materialized instances.
//!
//! Field keys come from the `json` struct tag (falling back to the field
//! name); `json:"-"` and unexported fields are invisible. Object keys match
//! exactly first, then case-insensitively; unknown keys are ignored.
//! Complex kinds have no JSON form and are rejected in both directions.

use crate::error::PopulateError;
use crate::instance::Instance;
use crate::kind::PrimitiveKind;
use crate::shape::{Shape, ShapeField};
use crate::tag::JsonOptions;
use crate::value::Value;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as Json;

impl Instance {
    /// Populate from a JSON document.
    ///
    /// Values present in the document overwrite the instance; everything
    /// else keeps its current value. On error the instance may be partially
    /// populated.
    pub fn populate_json(&mut self, input: &str) -> Result<(), PopulateError> {
        let doc: Json = serde_json::from_str(input)?;
        self.populate_json_value(&doc)
    }

    /// Populate from an already parsed JSON value.
    pub fn populate_json_value(&mut self, doc: &Json) -> Result<(), PopulateError> {
        let shape = self.shape().clone();
        populate(&shape, self.value_mut(), doc, "$")?;
        log::trace!("[PROTOSTRUCT] populated instance from JSON");
        Ok(())
    }
}

fn populate(
    shape: &Shape,
    slot: &mut Value,
    json: &Json,
    path: &str,
) -> Result<(), PopulateError> {
    if json.is_null() {
        match shape {
            Shape::Pointer(_) => *slot = Value::Pointer(None),
            Shape::Primitive(PrimitiveKind::Any) => *slot = Value::Any(Json::Null),
            _ => {}
        }
        return Ok(());
    }

    match shape {
        Shape::Primitive(kind) => {
            *slot = primitive(*kind, json, path)?;
            Ok(())
        }

        Shape::Struct(fields) => {
            let object = json.as_object().ok_or_else(|| mismatch(shape, json, path))?;
            let Value::Struct(values) = slot else {
                return Err(mismatch(shape, json, path));
            };
            let keyed = json_fields(fields);
            for (key, item) in object {
                let Some(index) = match_field(&keyed, key) else {
                    continue;
                };
                let (Some(field), Some(value)) = (fields.get(index), values.get_mut(index)) else {
                    return Err(mismatch(shape, json, path));
                };
                populate(&field.shape, value, item, &format!("{}.{}", path, key))?;
            }
            Ok(())
        }

        Shape::Map { key, elem } => {
            let object = json.as_object().ok_or_else(|| mismatch(shape, json, path))?;
            if !matches!(slot, Value::Map(_)) {
                *slot = Value::Map(Vec::new());
            }
            for (text, item) in object {
                let item_path = format!("{}[{:?}]", path, text);
                let map_key = parse_map_key(key, text, &item_path)?;
                let mut value = zero(elem, &item_path)?;
                populate(elem, &mut value, item, &item_path)?;
                slot.map_insert(map_key, value);
            }
            Ok(())
        }

        Shape::List(elem) => {
            let items = json.as_array().ok_or_else(|| mismatch(shape, json, path))?;
            let mut values = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, i);
                let mut value = zero(elem, &item_path)?;
                populate(elem, &mut value, item, &item_path)?;
                values.push(value);
            }
            *slot = Value::List(values);
            Ok(())
        }

        Shape::Array { elem, count } => {
            let items = json.as_array().ok_or_else(|| mismatch(shape, json, path))?;
            let Value::Array(values) = slot else {
                return Err(mismatch(shape, json, path));
            };
            // Excess input is ignored, shortfall is zeroed.
            for i in 0..*count as usize {
                match (items.get(i), values.get_mut(i)) {
                    (Some(item), Some(value)) => {
                        populate(elem, value, item, &format!("{}[{}]", path, i))?
                    }
                    (None, Some(value)) => *value = zero(elem, &format!("{}[{}]", path, i))?,
                    _ => break,
                }
            }
            Ok(())
        }

        Shape::Pointer(elem) => {
            if !matches!(slot, Value::Pointer(Some(_))) {
                *slot = Value::Pointer(Some(Box::new(zero(elem, path)?)));
            }
            match slot {
                Value::Pointer(Some(target)) => populate(elem, target, json, path),
                _ => Err(mismatch(shape, json, path)),
            }
        }
    }
}

fn zero(shape: &Shape, path: &str) -> Result<Value, PopulateError> {
    shape
        .try_zero_value()
        .map_err(|source| PopulateError::Allocation {
            path: path.to_string(),
            source,
        })
}

fn primitive(kind: PrimitiveKind, json: &Json, path: &str) -> Result<Value, PopulateError> {
    let type_err = || PopulateError::TypeMismatch {
        path: path.to_string(),
        expected: kind.name().to_string(),
        got: json_kind(json),
    };

    match kind {
        PrimitiveKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(type_err),
        PrimitiveKind::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(type_err),
        PrimitiveKind::Any => Ok(Value::Any(json.clone())),
        PrimitiveKind::Complex64 | PrimitiveKind::Complex128 => Err(PopulateError::Unsupported {
            path: path.to_string(),
            kind: kind.name(),
        }),
        PrimitiveKind::Float32 => {
            let Json::Number(n) = json else {
                return Err(type_err());
            };
            let v = n.as_f64().ok_or_else(type_err)?;
            let narrowed = v as f32;
            if narrowed.is_infinite() {
                return Err(out_of_range(n, kind, path));
            }
            Ok(Value::F32(narrowed))
        }
        PrimitiveKind::Float64 => json.as_f64().map(Value::F64).ok_or_else(type_err),
        _ => {
            let Json::Number(n) = json else {
                return Err(type_err());
            };
            integer(kind, n, path)
        }
    }
}

fn integer(
    kind: PrimitiveKind,
    n: &serde_json::Number,
    path: &str,
) -> Result<Value, PopulateError> {
    let range = || out_of_range(n, kind, path);
    let signed = || n.as_i64().ok_or_else(range);
    let unsigned = || n.as_u64().ok_or_else(range);

    let value = match kind {
        PrimitiveKind::Int => Value::Int(signed()?),
        PrimitiveKind::Int8 => Value::I8(i8::try_from(signed()?).map_err(|_| range())?),
        PrimitiveKind::Int16 => Value::I16(i16::try_from(signed()?).map_err(|_| range())?),
        PrimitiveKind::Int32 => Value::I32(i32::try_from(signed()?).map_err(|_| range())?),
        PrimitiveKind::Int64 => Value::I64(signed()?),
        PrimitiveKind::Uint => Value::Uint(unsigned()?),
        PrimitiveKind::Uint8 => Value::U8(u8::try_from(unsigned()?).map_err(|_| range())?),
        PrimitiveKind::Uint16 => Value::U16(u16::try_from(unsigned()?).map_err(|_| range())?),
        PrimitiveKind::Uint32 => Value::U32(u32::try_from(unsigned()?).map_err(|_| range())?),
        PrimitiveKind::Uint64 => Value::U64(unsigned()?),
        PrimitiveKind::Uintptr => Value::Uintptr(unsigned()?),
        other => {
            return Err(PopulateError::Unsupported {
                path: path.to_string(),
                kind: other.name(),
            })
        }
    };
    Ok(value)
}

fn parse_map_key(shape: &Shape, text: &str, path: &str) -> Result<Value, PopulateError> {
    let invalid = || PopulateError::InvalidMapKey {
        path: path.to_string(),
        key: text.to_string(),
    };

    match shape {
        Shape::Primitive(PrimitiveKind::String) => Ok(Value::String(text.to_string())),
        Shape::Primitive(kind) if kind.is_integer() => {
            let number = match (text.parse::<i64>(), text.parse::<u64>()) {
                (Ok(v), _) => serde_json::Number::from(v),
                (_, Ok(v)) => serde_json::Number::from(v),
                _ => return Err(invalid()),
            };
            integer(*kind, &number, path).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

/// `(field index, json key)` for every field visible to JSON.
fn json_fields(fields: &[ShapeField]) -> Vec<(usize, String)> {
    fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_exported())
        .filter_map(|(i, f)| {
            let opts = JsonOptions::from_tag(&f.tag);
            (!opts.skip).then(|| (i, opts.key(&f.name).to_string()))
        })
        .collect()
}

fn match_field(keyed: &[(usize, String)], key: &str) -> Option<usize> {
    keyed
        .iter()
        .find(|(_, k)| k == key)
        .or_else(|| keyed.iter().find(|(_, k)| fold_eq(k, key)))
        .map(|(i, _)| *i)
}

fn fold_eq(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn mismatch(shape: &Shape, json: &Json, path: &str) -> PopulateError {
    PopulateError::TypeMismatch {
        path: path.to_string(),
        expected: shape.to_string(),
        got: json_kind(json),
    }
}

fn out_of_range(n: &serde_json::Number, kind: PrimitiveKind, path: &str) -> PopulateError {
    PopulateError::OutOfRange {
        path: path.to_string(),
        value: n.to_string(),
        target: kind.name(),
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ValueView {
            shape: self.shape(),
            value: self.value(),
        }
        .serialize(serializer)
    }
}

/// A value seen through its shape, which carries the field names and tags.
struct ValueView<'a> {
    shape: &'a Shape,
    value: &'a Value,
}

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.shape, self.value) {
            (Shape::Primitive(_), value) => serialize_primitive(value, serializer),

            (Shape::Struct(fields), Value::Struct(values)) => {
                let mut map = serializer.serialize_map(None)?;
                for (field, value) in fields.iter().zip(values) {
                    if !field.is_exported() {
                        continue;
                    }
                    let opts = JsonOptions::from_tag(&field.tag);
                    if opts.skip || (opts.omit_empty && value.is_zero()) {
                        continue;
                    }
                    map.serialize_entry(
                        opts.key(&field.name),
                        &ValueView {
                            shape: &field.shape,
                            value,
                        },
                    )?;
                }
                map.end()
            }

            (Shape::Map { elem, .. }, Value::Map(entries)) => {
                let mut keyed = entries
                    .iter()
                    .map(|(k, v)| map_key_text(k).map(|text| (text, v)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(S::Error::custom)?;
                keyed.sort_by(|a, b| a.0.cmp(&b.0));

                let mut map = serializer.serialize_map(Some(keyed.len()))?;
                for (text, value) in keyed {
                    map.serialize_entry(&text, &ValueView { shape: elem, value })?;
                }
                map.end()
            }

            (Shape::List(elem), Value::List(values))
            | (Shape::Array { elem, .. }, Value::Array(values)) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(&ValueView { shape: elem, value })?;
                }
                seq.end()
            }

            (Shape::Pointer(_), Value::Pointer(None)) => serializer.serialize_none(),
            (Shape::Pointer(elem), Value::Pointer(Some(target))) => {
                serializer.serialize_some(&ValueView {
                    shape: elem,
                    value: target,
                })
            }

            (shape, value) => Err(S::Error::custom(format!(
                "json: value of kind {} does not match {}",
                value.kind_name(),
                shape
            ))),
        }
    }
}

fn serialize_primitive<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Value::Bool(v) => serializer.serialize_bool(*v),
        Value::Int(v) | Value::I64(v) => serializer.serialize_i64(*v),
        Value::I8(v) => serializer.serialize_i8(*v),
        Value::I16(v) => serializer.serialize_i16(*v),
        Value::I32(v) => serializer.serialize_i32(*v),
        Value::Uint(v) | Value::U64(v) | Value::Uintptr(v) => serializer.serialize_u64(*v),
        Value::U8(v) => serializer.serialize_u8(*v),
        Value::U16(v) => serializer.serialize_u16(*v),
        Value::U32(v) => serializer.serialize_u32(*v),
        Value::F32(v) => serializer.serialize_f32(*v),
        Value::F64(v) => serializer.serialize_f64(*v),
        Value::String(v) => serializer.serialize_str(v),
        Value::Any(v) => v.serialize(serializer),
        other => Err(S::Error::custom(format!(
            "json: unsupported type: {}",
            other.kind_name()
        ))),
    }
}

fn map_key_text(key: &Value) -> Result<String, String> {
    if let Some(s) = key.as_str() {
        return Ok(s.to_string());
    }
    if let Some(v) = key.as_i64() {
        return Ok(v.to_string());
    }
    if let Some(v) = key.as_u64() {
        return Ok(v.to_string());
    }
    Err(format!("json: unsupported map key kind {}", key.kind_name()))
}
