//! Producing signing handles for wallet connections.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::signer::types::{ConnectionHandle, SignerError, SigningHandle};

/// Provider-side factory for signing handles.
#[async_trait]
pub trait SignerBinder: Send + Sync {
    async fn bind(&self, connection: &ConnectionHandle) -> Result<Arc<dyn SigningHandle>, SignerError>;
}

/// A signing handle together with the connection it was bound for.
#[derive(Clone)]
pub struct BoundSigner {
    connection: ConnectionHandle,
    handle: Arc<dyn SigningHandle>,
}

impl BoundSigner {
    pub fn handle(&self) -> Arc<dyn SigningHandle> {
        self.handle.clone()
    }

    /// Whether this binding is still valid for `connection`.
    pub fn is_bound_to(&self, connection: &ConnectionHandle) -> bool {
        self.connection == *connection
    }
}

impl fmt::Debug for BoundSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSigner")
            .field("connection", &self.connection)
            .field("address", &self.handle.address())
            .finish()
    }
}

/// Bind a signer for `connection`, checking that it signs for the connected account.
pub async fn bind_signer(
    binder: &dyn SignerBinder,
    connection: &ConnectionHandle,
) -> Result<BoundSigner, SignerError> {
    let handle = binder.bind(connection).await.map_err(|e| match e {
        SignerError::Binding(_) => e,
        other => SignerError::Binding(other.to_string()),
    })?;

    if handle.address() != connection.address {
        return Err(SignerError::Binding(format!(
            "signer address {} does not match connected account {}",
            handle.address(),
            connection.address
        )));
    }

    tracing::debug!(
        connection_id = connection.id,
        address = %connection.address,
        "Signer bound"
    );

    Ok(BoundSigner {
        connection: *connection,
        handle,
    })
}
