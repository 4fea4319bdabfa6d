// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! JSON codec for [`DataObject`]s driven by entity descriptors
//!
//! Scalars arriving as strings (query and form parameters) are coerced into
//! the declared attribute kind. Date-times are stored as epoch milliseconds.

use crate::error::CodecError;
use crate::request::CallerContext;
use crate::traits::{ObjectCodec, TypeIntrospector};
use crate::types::{AttributeDescriptor, AttributeKind, DataObject, EntityDescriptor, MemberValue};
use serde_json::{Map, Number, Value};
use std::sync::Arc;

pub struct JsonObjectCodec {
    introspector: Arc<dyn TypeIntrospector>,
}

impl JsonObjectCodec {
    pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
        Self { introspector }
    }

    fn descriptor(&self, entity: &str) -> Result<EntityDescriptor, CodecError> {
        self.introspector
            .entity(entity)
            .ok_or_else(|| CodecError::UnknownEntity(entity.to_string()))
    }

    fn fresh(&self, entity: &str) -> Result<DataObject, CodecError> {
        let descriptor = self.descriptor(entity)?;
        let mut object = DataObject::new(entity);
        for attribute in &descriptor.attributes {
            let initial = match attribute.kind {
                AttributeKind::Boolean => MemberValue::Scalar(Value::Bool(false)),
                AttributeKind::ReferenceSet(_) => MemberValue::Objects(Vec::new()),
                _ => MemberValue::Null,
            };
            object.set(attribute.name.clone(), initial);
        }
        Ok(object)
    }

    fn fill(
        &self,
        descriptor: &EntityDescriptor,
        json: &Value,
        target: &mut DataObject,
        partial: bool,
    ) -> Result<(), CodecError> {
        let Value::Object(map) = json else {
            return Err(CodecError::NotAnObject {
                entity: descriptor.name.clone(),
            });
        };

        for (key, value) in map {
            let Some(attribute) = descriptor.find(key) else {
                if partial {
                    continue;
                }
                return Err(CodecError::UnknownMember {
                    entity: descriptor.name.clone(),
                    member: key.clone(),
                });
            };
            let member = self.member_value(&descriptor.name, attribute, value, partial)?;
            target.set(key.clone(), member);
        }
        Ok(())
    }

    fn nested(&self, entity: &str, json: &Value, partial: bool) -> Result<DataObject, CodecError> {
        let descriptor = self.descriptor(entity)?;
        let mut object = self.fresh(entity)?;
        self.fill(&descriptor, json, &mut object, partial)?;
        Ok(object)
    }

    fn member_value(
        &self,
        entity: &str,
        attribute: &AttributeDescriptor,
        value: &Value,
        partial: bool,
    ) -> Result<MemberValue, CodecError> {
        let mismatch = |expected: &str| CodecError::TypeMismatch {
            entity: entity.to_string(),
            member: attribute.name.clone(),
            expected: expected.to_string(),
        };

        if value.is_null() {
            return Ok(match attribute.kind {
                AttributeKind::ReferenceSet(_) => MemberValue::Objects(Vec::new()),
                _ => MemberValue::Null,
            });
        }

        let scalar = match &attribute.kind {
            AttributeKind::String | AttributeKind::Binary => match value {
                Value::String(_) => value.clone(),
                Value::Number(number) => Value::String(number.to_string()),
                Value::Bool(flag) => Value::String(flag.to_string()),
                _ => return Err(mismatch("a string")),
            },
            AttributeKind::Integer => {
                let number = integer(value).ok_or_else(|| mismatch("an integer"))?;
                if i32::try_from(number).is_err() {
                    return Err(mismatch("a 32-bit integer"));
                }
                Value::from(number)
            }
            AttributeKind::Long => Value::from(integer(value).ok_or_else(|| mismatch("an integer"))?),
            AttributeKind::Decimal => decimal(value).ok_or_else(|| mismatch("a number"))?,
            AttributeKind::Boolean => match value {
                Value::Bool(_) => value.clone(),
                Value::String(text) => match text.trim() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => return Err(mismatch("a boolean")),
                },
                _ => return Err(mismatch("a boolean")),
            },
            AttributeKind::DateTime => {
                Value::from(epoch_millis(value).ok_or_else(|| mismatch("a date-time"))?)
            }
            AttributeKind::Enumeration(values) => match value.as_str() {
                Some(text) if values.iter().any(|allowed| allowed == text) => value.clone(),
                _ => return Err(mismatch(&format!("one of {}", values.join(", ")))),
            },
            AttributeKind::Reference(target) => {
                if !value.is_object() {
                    return Err(mismatch(&format!("a {} object", target)));
                }
                let object = self.nested(target, value, partial)?;
                return Ok(MemberValue::Object(Box::new(object)));
            }
            AttributeKind::ReferenceSet(target) => {
                let Value::Array(items) = value else {
                    return Err(mismatch(&format!("a list of {} objects", target)));
                };
                let objects = items
                    .iter()
                    .map(|item| {
                        if item.is_object() {
                            self.nested(target, item, partial)
                        } else {
                            Err(mismatch(&format!("a list of {} objects", target)))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(MemberValue::Objects(objects));
            }
        };
        Ok(MemberValue::Scalar(scalar))
    }
}

impl ObjectCodec for JsonObjectCodec {
    fn instantiate(&self, _caller: &CallerContext, entity: &str) -> Result<DataObject, CodecError> {
        self.fresh(entity)
    }

    fn serialize(&self, object: &DataObject) -> Result<Value, CodecError> {
        let descriptor = self.descriptor(object.entity())?;
        let mut map = Map::new();
        for attribute in &descriptor.attributes {
            let value = match object.get(&attribute.name) {
                None | Some(MemberValue::Null) => match attribute.kind {
                    AttributeKind::ReferenceSet(_) => Value::Array(Vec::new()),
                    _ => Value::Null,
                },
                Some(MemberValue::Scalar(value)) => value.clone(),
                Some(MemberValue::Object(nested)) => self.serialize(nested)?,
                Some(MemberValue::Objects(items)) => Value::Array(
                    items
                        .iter()
                        .map(|item| self.serialize(item))
                        .collect::<Result<_, _>>()?,
                ),
            };
            map.insert(attribute.name.clone(), value);
        }
        Ok(Value::Object(map))
    }

    fn deserialize(&self, json: &Value, target: &mut DataObject, partial: bool) -> Result<(), CodecError> {
        let descriptor = self.descriptor(target.entity())?;
        self.fill(&descriptor, json, target, partial)
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn decimal(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                chrono::DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|moment| moment.timestamp_millis())
            })
        }
        _ => None,
    }
}
