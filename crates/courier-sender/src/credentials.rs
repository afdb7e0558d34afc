// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential namespaces: one directory per sender identity under `auth_dir`.

use std::path::{Path, PathBuf};

use courier_core::{CourierError, SenderId};
use tracing::debug;

/// Directory holding the credentials of `identity`.
///
/// Fails for identities that are not a single plain path component.
pub fn credentials_dir(auth_dir: &Path, identity: &SenderId) -> Result<PathBuf, CourierError> {
    if !identity.is_valid() {
        return Err(CourierError::InvalidSender {
            value: identity.to_string(),
        });
    }
    Ok(auth_dir.join(identity.as_str()))
}

/// Sender identities that have a credential namespace, sorted.
///
/// A missing `auth_dir` means no identity has been paired yet and yields an
/// empty list. Hidden entries, plain files, and directories whose name is not
/// a valid identity are ignored.
pub async fn list_identities(auth_dir: &Path) -> Result<Vec<SenderId>, CourierError> {
    let mut entries = match tokio::fs::read_dir(auth_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CourierError::Transport {
                message: format!("cannot list {}: {e}", auth_dir.display()),
                source: Some(Box::new(e)),
            });
        }
    };

    let mut identities = Vec::new();
    loop {
        let entry = entries.next_entry().await.map_err(|e| CourierError::Transport {
            message: format!("cannot list {}: {e}", auth_dir.display()),
            source: Some(Box::new(e)),
        })?;
        let Some(entry) = entry else { break };
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_dir {
            continue;
        }
        match SenderId::parse(&name) {
            Ok(identity) => identities.push(identity),
            Err(_) if name.starts_with('.') => {}
            Err(_) => debug!(name = %name, "ignoring credential directory with an invalid identity name"),
        }
    }
    identities.sort();
    Ok(identities)
}
