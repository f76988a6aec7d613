// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, one module per entity.

pub mod content;
pub mod discussions;
pub mod events;
pub mod flags;
pub mod members;
pub mod program;
pub mod snapshots;
