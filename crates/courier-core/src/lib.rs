// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier campaign dispatcher.
//!
//! This crate provides the domain types (campaigns, contacts, templates,
//! sender identities), the error taxonomy, and the adapter traits that the
//! directory, template, and transport integrations implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CourierError, SendError};
pub use types::{
    Ack, AdapterType, Address, Campaign, CampaignStatus, Contact, ContactStatus,
    DisconnectReason, HealthStatus, MessageId, RowId, SenderId, Template, TransportEvent,
};

pub use traits::{DirectoryAdapter, PluginAdapter, TemplateStore, TransportAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_error_has_all_variants() {
        let _config = CourierError::Config("test".into());
        let _read = CourierError::directory_read("sheet unreachable");
        let _write = CourierError::directory_write(RowId(2), "quota");
        let _template = CourierError::TemplateNotFound { id: "t1".into() };
        let _store = CourierError::TemplateStore {
            message: "bad json".into(),
            source: None,
        };
        let _transport = CourierError::Transport {
            message: "bridge down".into(),
            source: Some(Box::new(std::io::Error::other("refused"))),
        };
        let _timeout = CourierError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _sender = CourierError::InvalidSender {
            value: "../etc".into(),
        };
        let _internal = CourierError::Internal("test".into());
    }

    #[test]
    fn send_error_converts_into_courier_error() {
        let err: CourierError = SendError::Rejected {
            message: "invalid number".into(),
        }
        .into();
        assert!(matches!(err, CourierError::Send(SendError::Rejected { .. })));
        assert_eq!(err.to_string(), "message rejected: invalid number");
    }

    #[test]
    fn directory_write_message_names_the_row() {
        let err = CourierError::directory_write(RowId(14), "quota exceeded");
        assert_eq!(
            err.to_string(),
            "directory write failed for row 14: quota exceeded"
        );
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Directory,
            AdapterType::Templates,
            AdapterType::Transport,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn transport_event_exposes_identity() {
        let id = SenderId::from("5511");
        let events = [
            TransportEvent::Ready {
                identity: id.clone(),
            },
            TransportEvent::PairingRequired {
                identity: id.clone(),
                code: "ABC".into(),
            },
            TransportEvent::Closed {
                identity: id.clone(),
                reason: DisconnectReason::SignedOut,
            },
        ];
        for event in &events {
            assert_eq!(event.identity(), &id);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_directory_adapter<T: DirectoryAdapter>() {}
        fn _assert_template_store<T: TemplateStore>() {}
        fn _assert_transport_adapter<T: TransportAdapter>() {}
    }
}
