// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message templates for the Courier campaign dispatcher.
//!
//! [`JsonTemplateStore`] reads templates from a JSON file on every load, and
//! [`render`] substitutes `{{ field }}` placeholders with contact data.

pub mod render;
pub mod store;

pub use render::{placeholders, render};
pub use store::JsonTemplateStore;
