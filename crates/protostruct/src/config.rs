// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoder limits.
//!
//! Schemas usually arrive from a remote peer, so materialization is bounded
//! by [`DecodeLimits`]. The defaults below are the single source of truth;
//! callers tighten or relax them per call with [`crate::new_with_limits`].
//!
//! # Example
//!
//! ```
//! use protostruct::DecodeLimits;
//!
//! let limits = DecodeLimits::default()
//!     .with_max_depth(16)
//!     .with_max_cells(4096);
//! assert_eq!(limits.max_depth, 16);
//! ```

/// Default maximum nesting depth of `Struct`/`Container` nodes.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum number of fields in a single struct.
pub const DEFAULT_MAX_FIELDS: usize = 4096;

/// Default maximum number of zero-value cells allocated for one instance.
///
/// Fixed-size arrays multiply: `[[u8; 1024]; 1024]` needs just over 1 Mi
/// cells.
pub const DEFAULT_MAX_CELLS: u64 = 1 << 20;

/// Hard ceiling on zero-value cells, applied on top of every
/// [`DecodeLimits`] including [`DecodeLimits::UNBOUNDED`].
///
/// No zero value may need more cells than the longest array the wire
/// format can describe.
pub const MAX_CELLS_CEILING: u64 = u32::MAX as u64;

/// Bounds applied while materializing a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting depth (root struct is depth 1).
    pub max_depth: usize,
    /// Maximum fields per struct.
    pub max_fields: usize,
    /// Maximum zero-value cells in the allocated instance.
    ///
    /// Only storage built at construction counts. Whatever sits behind a
    /// pointer, slice or map is allocated on demand while populating and
    /// is bounded by [`MAX_CELLS_CEILING`] alone.
    pub max_cells: u64,
}

impl DecodeLimits {
    /// No configurable bound; only [`MAX_CELLS_CEILING`] still applies.
    pub const UNBOUNDED: Self = Self {
        max_depth: usize::MAX,
        max_fields: usize::MAX,
        max_cells: u64::MAX,
    };

    /// Set maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set maximum fields per struct.
    #[must_use]
    pub fn with_max_fields(mut self, max_fields: usize) -> Self {
        self.max_fields = max_fields;
        self
    }

    /// Set maximum zero-value cells (values above [`MAX_CELLS_CEILING`]
    /// behave like the ceiling).
    #[must_use]
    pub fn with_max_cells(mut self, max_cells: u64) -> Self {
        self.max_cells = max_cells;
        self
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_fields: DEFAULT_MAX_FIELDS,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(limits.max_fields, DEFAULT_MAX_FIELDS);
        assert_eq!(limits.max_cells, DEFAULT_MAX_CELLS);
    }

    #[test]
    fn test_builder_setters() {
        let limits = DecodeLimits::UNBOUNDED
            .with_max_depth(3)
            .with_max_fields(2);
        assert_eq!(limits.max_depth, 3);
        assert_eq!(limits.max_fields, 2);
        assert_eq!(limits.max_cells, u64::MAX);
    }

    #[test]
    fn test_ceiling_below_unbounded() {
        assert!(MAX_CELLS_CEILING < DecodeLimits::UNBOUNDED.max_cells);
        assert!(DEFAULT_MAX_CELLS < MAX_CELLS_CEILING);
    }
}
