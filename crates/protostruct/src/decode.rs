// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema -> materialized [`Shape`].
//!
//! Construction is bottom-up and fully fallible: every condition under
//! which a type cannot be built (unknown kinds, missing sub-fields, invalid
//! or duplicate field names, non-comparable map keys, oversize arrays) is
//! reported as a [`DecodeError`] carrying the path of the offending node.

use crate::config::{DecodeLimits, MAX_CELLS_CEILING};
use crate::error::DecodeError;
use crate::kind::ContainerKind;
use crate::schema::{Struct, Type, TypeVariant};
use crate::shape::{Shape, ShapeField};
use std::collections::HashSet;
use std::sync::Arc;

/// Materialize the root struct of `schema`.
pub(crate) fn materialize(
    schema: &Struct,
    limits: &DecodeLimits,
) -> Result<Arc<Shape>, DecodeError> {
    let mut materializer = Materializer {
        limits,
        cells: 0,
        budget: limits.max_cells.min(MAX_CELLS_CEILING),
    };
    let (shape, cells) = materializer.build_struct(schema, "", 1)?;
    log::trace!(
        "[PROTOSTRUCT] materialized {} fields, {} zero cells",
        schema.len(),
        cells
    );
    Ok(Arc::new(shape))
}

struct Materializer<'a> {
    limits: &'a DecodeLimits,
    /// Cells reserved so far in the current allocation.
    cells: u64,
    /// Cell bound of the current allocation.
    budget: u64,
}

impl Materializer<'_> {
    fn build_struct(
        &mut self,
        schema: &Struct,
        path: &str,
        depth: usize,
    ) -> Result<(Shape, u64), DecodeError> {
        self.check_depth(path, depth)?;
        self.reserve(path, 1)?;

        if schema.fields.len() > self.limits.max_fields {
            return Err(DecodeError::LimitExceeded {
                path: path.to_string(),
                limit: "fields",
                max: self.limits.max_fields as u64,
            });
        }

        let mut seen = HashSet::with_capacity(schema.fields.len());
        let mut fields = Vec::with_capacity(schema.fields.len());
        let mut cells = 1u64;

        for (index, field) in schema.fields.iter().enumerate() {
            let field_path = join(path, &format!("fields[{}]", index));

            if let Err(reason) = check_identifier(&field.name) {
                return Err(DecodeError::InvalidField {
                    path: field_path,
                    name: field.name.clone(),
                    reason,
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DecodeError::InvalidField {
                    path: field_path,
                    name: field.name.clone(),
                    reason: "duplicate field name",
                });
            }

            let (shape, field_cells) =
                self.build_type(&field.ty, &format!("{}.type", field_path), depth + 1)?;
            cells = cells.saturating_add(field_cells);
            fields.push(ShapeField::new(
                field.name.clone(),
                field.visibility,
                field.tag.clone(),
                Arc::new(shape),
            ));
        }

        Ok((Shape::Struct(fields), cells))
    }

    fn build_type(
        &mut self,
        ty: &Type,
        path: &str,
        depth: usize,
    ) -> Result<(Shape, u64), DecodeError> {
        match ty.variant(path)? {
            TypeVariant::Primitive(primitive) => {
                let kind = primitive.kind(path)?;
                self.reserve(path, 1)?;
                Ok((Shape::Primitive(kind), 1))
            }

            TypeVariant::Struct(nested) => self.build_struct(nested, path, depth),

            TypeVariant::Container(container) => {
                self.check_depth(path, depth)?;
                let kind = container.check(path)?;
                let elem_path = format!("{}.elem", path);

                // `check` guarantees presence of the sub-fields for `kind`.
                let Some(elem_ty) = container.elem.as_ref() else {
                    return Err(DecodeError::MissingElem {
                        path: path.to_string(),
                    });
                };

                match kind {
                    ContainerKind::Map => {
                        let key_path = format!("{}.key", path);
                        let Some(key_ty) = container.key.as_ref() else {
                            return Err(DecodeError::MissingKey {
                                path: path.to_string(),
                            });
                        };
                        let key = self.build_indirect(key_ty, &key_path, depth + 1)?;
                        if !key.is_comparable() {
                            return Err(DecodeError::Construction {
                                path: key_path,
                                message: format!("invalid map key type {}", key),
                            });
                        }
                        let elem = self.build_indirect(elem_ty, &elem_path, depth + 1)?;
                        self.reserve(path, 1)?;
                        Ok((
                            Shape::Map {
                                key: Arc::new(key),
                                elem: Arc::new(elem),
                            },
                            1,
                        ))
                    }

                    ContainerKind::Pointer => {
                        let elem = self.build_indirect(elem_ty, &elem_path, depth + 1)?;
                        self.reserve(path, 1)?;
                        Ok((Shape::Pointer(Arc::new(elem)), 1))
                    }

                    ContainerKind::Slice => {
                        let elem = self.build_indirect(elem_ty, &elem_path, depth + 1)?;
                        self.reserve(path, 1)?;
                        Ok((Shape::List(Arc::new(elem)), 1))
                    }

                    ContainerKind::Array => {
                        let count = container.count.unwrap_or_default();
                        let before = self.cells;
                        let (elem, elem_cells) =
                            self.build_type(elem_ty, &elem_path, depth + 1)?;
                        // The element was reserved once while building it;
                        // the array owns `count` copies of it.
                        self.cells = before;
                        let cells = elem_cells
                            .checked_mul(u64::from(count))
                            .and_then(|c| c.checked_add(1))
                            .ok_or_else(|| DecodeError::Construction {
                                path: path.to_string(),
                                message: format!(
                                    "array of {} elements of {} is too large",
                                    count, elem
                                ),
                            })?;
                        self.reserve(path, cells)?;
                        Ok((
                            Shape::Array {
                                elem: Arc::new(elem),
                                count,
                            },
                            cells,
                        ))
                    }
                }
            }
        }
    }

    /// Build the target of a pointer, slice or map.
    ///
    /// None of it is allocated at construction, so it starts a fresh
    /// allocation bounded by the ceiling and leaves the enclosing count
    /// untouched.
    fn build_indirect(
        &mut self,
        ty: &Type,
        path: &str,
        depth: usize,
    ) -> Result<Shape, DecodeError> {
        let saved = (self.cells, self.budget);
        self.cells = 0;
        self.budget = MAX_CELLS_CEILING;
        let result = self.build_type(ty, path, depth);
        (self.cells, self.budget) = saved;
        result.map(|(shape, _)| shape)
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<(), DecodeError> {
        if depth > self.limits.max_depth {
            return Err(DecodeError::LimitExceeded {
                path: path.to_string(),
                limit: "depth",
                max: self.limits.max_depth as u64,
            });
        }
        Ok(())
    }

    fn reserve(&mut self, path: &str, cells: u64) -> Result<(), DecodeError> {
        let total = self.cells.saturating_add(cells);
        if total > self.budget {
            return Err(DecodeError::LimitExceeded {
                path: path.to_string(),
                limit: "cells",
                max: self.budget,
            });
        }
        self.cells = total;
        Ok(())
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

/// Field names must be identifiers: a letter or `_`, then letters, digits
/// or `_`.
fn check_identifier(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("empty field name");
    };
    if !(first.is_alphabetic() || first == '_') {
        return Err("field name must start with a letter or underscore");
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Err("field name contains invalid characters");
    }
    Ok(())
}
