// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier campaign dispatcher.

use std::time::Duration;

use thiserror::Error;

use crate::types::{RowId, SenderId};

/// The primary error type used across all Courier adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The directory could not be read (listing campaigns or contacts).
    #[error("directory read failed: {message}")]
    DirectoryRead {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A status write to the directory could not be persisted.
    ///
    /// An unwritten status causes a duplicate send on the next run, so callers
    /// must retry or log these loudly.
    #[error("directory write failed for row {row}: {message}")]
    DirectoryWrite {
        row: RowId,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A campaign references a template id that the template store does not hold.
    #[error("template `{id}` not found")]
    TemplateNotFound { id: String },

    /// The template store could not be loaded.
    #[error("template store error: {message}")]
    TemplateStore {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport-level failure outside of a single send (session open, close).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A sender identity from a directory cell, request, or flag is not well formed.
    #[error("invalid sender identity `{value}`: expected 1-64 ASCII letters, digits, `-` or `_`")]
    InvalidSender { value: String },

    /// A single message could not be delivered.
    #[error(transparent)]
    Send(#[from] SendError),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Shorthand for a [`CourierError::DirectoryRead`] without an underlying source.
    pub fn directory_read(message: impl Into<String>) -> Self {
        CourierError::DirectoryRead {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`CourierError::DirectoryWrite`] without an underlying source.
    pub fn directory_write(row: RowId, message: impl Into<String>) -> Self {
        CourierError::DirectoryWrite {
            row,
            message: message.into(),
            source: None,
        }
    }
}

/// Failure of a single send attempt.
///
/// Every cause (timeout, rejected destination, disconnect, missing session) is
/// folded into this type so the dispatch loop can treat them uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The sender identity has no usable session (never paired, signed out, or
    /// still connecting when the acquire deadline passed).
    #[error("no usable session for {identity}: {reason}")]
    SessionUnavailable { identity: SenderId, reason: String },

    /// The transport did not answer within the send timeout.
    #[error("send timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The transport refused the message.
    #[error("message rejected: {message}")]
    Rejected { message: String },

    /// The session dropped while the message was in flight.
    #[error("transport disconnected: {message}")]
    Disconnected { message: String },
}
