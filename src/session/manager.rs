//! The session aggregate and its operations.
//!
//! # Responsibilities
//! - Own `WalletSession`, the eligibility result and the current flow snapshot
//! - Expose connect, disconnect, begin-verification, begin-signature-flow and claim
//! - Publish every change as a `SessionEvent`
//!
//! # Design Decisions
//! - State sits behind one mutex that is never held across an `.await`
//! - Re-entrancy guards are set inside the same critical section as the
//!   precondition checks
//! - Eligibility results are kept while the same account stays connected,
//!   even across a reconnect
//! - A generation counter discards signer and flow updates started under an
//!   earlier connection

use alloy::primitives::Address;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::backend::{
    BackendError, CompletionReporter, EligibilityClient, EligibilityResult,
    FlowPreparationClient, HttpBackend, PresaleBackend,
};
use crate::config::schema::{FlowConfig, ProgramConfig};
use crate::error::ErrorKind;
use crate::networks::registry::RegistryError;
use crate::networks::NetworkRegistry;
use crate::orchestrator::{FlowEvent, FlowObserver, FlowPhase, SignatureFlow, SignatureOrchestrator};
use crate::resilience::RetryPolicy;
use crate::session::events::SessionEvent;
use crate::session::state::{ConnectionState, SessionSnapshot, SignerState};
use crate::signer::{bind_signer, BoundSigner, ConnectionHandle, SignerBinder, SignerError};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Signer not initialized")]
    SignerUnavailable,

    #[error("Wallet is not eligible")]
    NotEligible,

    #[error("A signature flow is already in progress")]
    FlowInProgress,

    #[error("No completed signature flow to claim")]
    NoCompletedFlow,

    #[error("Signer binding failed: {0}")]
    Signer(#[from] SignerError),

    #[error("Unable to verify wallet: {0}")]
    Verification(#[source] BackendError),

    #[error("Claim failed: {0}")]
    Claim(#[source] BackendError),

    #[error("Invalid network registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("Backend client setup failed: {0}")]
    Backend(#[source] BackendError),
}

/// Outcome of `begin_verification`.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The backend answered and the result is now in session state.
    Completed(EligibilityResult),
    /// A check for this address was already running; nothing happened.
    AlreadyInFlight,
    /// The account was switched or disconnected while the check ran; the result was dropped.
    Discarded,
}

#[derive(Default)]
struct SessionState {
    snapshot: SessionSnapshot,
    signer: Option<BoundSigner>,
    generation: u64,
}

struct Inner {
    state: Mutex<SessionState>,
    binder: Arc<dyn SignerBinder>,
    eligibility: EligibilityClient,
    preparation: FlowPreparationClient,
    reporter: CompletionReporter,
    orchestrator: SignatureOrchestrator,
    program: ProgramConfig,
    events: broadcast::Sender<SessionEvent>,
}

/// Cloneable handle to one wallet session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Assemble a session from its collaborators.
    pub fn new(
        backend: Arc<dyn PresaleBackend>,
        binder: Arc<dyn SignerBinder>,
        registry: Arc<NetworkRegistry>,
        config: &FlowConfig,
    ) -> Self {
        let reporter = CompletionReporter::new(
            backend.clone(),
            RetryPolicy::from_config(&config.confirmation),
        );
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::default()),
                binder,
                eligibility: EligibilityClient::new(backend.clone(), registry.clone(), &config.program),
                preparation: FlowPreparationClient::new(backend),
                orchestrator: SignatureOrchestrator::new(registry, reporter.clone(), config),
                reporter,
                program: config.program.clone(),
                events,
            }),
        }
    }

    /// Build a session talking HTTP to the configured backend.
    pub fn from_config(config: &FlowConfig, binder: Arc<dyn SignerBinder>) -> Result<Self, SessionError> {
        let registry = Arc::new(NetworkRegistry::from_config(&config.networks)?);
        let backend = HttpBackend::new(&config.backend).map_err(SessionError::Backend)?;
        Ok(Self::new(Arc::new(backend), binder, registry, config))
    }

    /// Current state for display.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot.clone()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn registry(&self) -> &NetworkRegistry {
        self.inner.orchestrator.registry()
    }

    /// Handle a wallet connection (or a change of connection identity).
    ///
    /// Binds a signer and, for an address without a result yet, starts the
    /// eligibility check. Returns the binding error if the signer could not
    /// be produced; the eligibility check runs either way.
    pub async fn connect_wallet(&self, connection: ConnectionHandle) -> Result<(), SessionError> {
        let generation = {
            let mut state = self.lock();
            if state.signer.as_ref().is_some_and(|s| s.is_bound_to(&connection)) {
                return Ok(());
            }

            let address_changed = state.snapshot.wallet.address != Some(connection.address);
            state.generation += 1;
            if address_changed {
                state.snapshot = SessionSnapshot::default();
            } else {
                if state.snapshot.flow.as_ref().is_some_and(|f| f.phase().is_active()) {
                    // The running attempt belongs to the old connection.
                    state.snapshot.flow = None;
                }
                if state.snapshot.error.is_some_and(|e| e.is_persistent()) {
                    state.snapshot.error = None;
                }
            }
            state.signer = None;
            state.snapshot.wallet.address = Some(connection.address);
            state.snapshot.wallet.connection_state = ConnectionState::Connecting;
            state.snapshot.wallet.signer_state = SignerState::Initializing;
            state.generation
        };
        self.emit(SessionEvent::ConnectionChanged { state: ConnectionState::Connecting });
        self.emit(SessionEvent::SignerChanged { state: SignerState::Initializing });
        tracing::info!(address = %connection.address, connection_id = connection.id, "Wallet connecting");

        let bound = bind_signer(self.inner.binder.as_ref(), &connection).await;

        let (signer_state, needs_verification) = {
            let mut state = self.lock();
            if state.generation != generation {
                tracing::debug!(connection_id = connection.id, "Connection superseded during binding");
                return Ok(());
            }
            state.snapshot.wallet.connection_state = ConnectionState::Connected;
            let signer_state = match &bound {
                Ok(signer) => {
                    state.signer = Some(signer.clone());
                    if state.snapshot.error == Some(ErrorKind::SignerUnavailable) {
                        state.snapshot.error = None;
                    }
                    SignerState::Ready
                }
                Err(e) => {
                    tracing::warn!(address = %connection.address, error = %e, "Signer initialization failed");
                    state.snapshot.error = Some(ErrorKind::SignerUnavailable);
                    state.snapshot.status = ErrorKind::SignerUnavailable.to_string();
                    SignerState::Failed
                }
            };
            state.snapshot.wallet.signer_state = signer_state;
            debug_assert!(state.snapshot.wallet.is_consistent());
            let needs_verification = state.snapshot.eligibility.is_none()
                && !self.inner.eligibility.is_in_flight(&connection.address);
            (signer_state, needs_verification)
        };
        self.emit(SessionEvent::ConnectionChanged { state: ConnectionState::Connected });
        self.emit(SessionEvent::SignerChanged { state: signer_state });

        if needs_verification {
            if let Err(e) = self.begin_verification(connection.address).await {
                tracing::debug!(error = %e, "Automatic verification did not complete");
            }
        }

        bound.map(|_| ()).map_err(SessionError::Signer)
    }

    /// Forget the wallet and everything derived from it.
    pub fn disconnect_wallet(&self) {
        {
            let mut state = self.lock();
            let generation = state.generation + 1;
            *state = SessionState {
                generation,
                ..SessionState::default()
            };
        }
        tracing::info!("Wallet disconnected");
        self.emit(SessionEvent::ConnectionChanged { state: ConnectionState::Disconnected });
        self.emit(SessionEvent::SignerChanged { state: SignerState::Unavailable });
    }

    /// Check eligibility for the connected `address`; prepares the flow when eligible.
    pub async fn begin_verification(&self, address: Address) -> Result<Verification, SessionError> {
        let slot = {
            let mut state = self.lock();
            if state.snapshot.wallet.address != Some(address) {
                return Err(SessionError::WalletNotConnected);
            }
            let Some(slot) = self.inner.eligibility.begin(address) else {
                return Ok(Verification::AlreadyInFlight);
            };
            state.snapshot.status = "Verifying wallet...".to_string();
            slot
        };
        self.emit(SessionEvent::VerificationStarted { address });

        let checked = slot.check().await;

        let result = {
            let mut state = self.lock();
            // A reconnect of the same account keeps the result; a different
            // account or a disconnect makes it stale.
            if state.snapshot.wallet.address != Some(address) {
                return Ok(Verification::Discarded);
            }
            match checked {
                Ok(result) => {
                    if state.snapshot.error == Some(ErrorKind::VerificationUnavailable) {
                        state.snapshot.error = None;
                    }
                    state.snapshot.status = if result.is_eligible {
                        "You qualify!".to_string()
                    } else {
                        "Wallet verified".to_string()
                    };
                    state.snapshot.eligibility = Some(result.clone());
                    state.snapshot.prepared.clear();
                    result
                }
                Err(e) => {
                    state.snapshot.eligibility = None;
                    state.snapshot.error = Some(ErrorKind::VerificationUnavailable);
                    state.snapshot.status = ErrorKind::VerificationUnavailable.to_string();
                    drop(state);
                    self.emit(SessionEvent::VerificationFailed {
                        address,
                        error: ErrorKind::VerificationUnavailable,
                    });
                    return Err(SessionError::Verification(e));
                }
            }
        };
        self.emit(SessionEvent::VerificationFinished {
            address,
            eligible: result.is_eligible,
        });

        if result.is_eligible {
            match self.inner.preparation.prepare_flow(address).await {
                Ok(prepared) => {
                    let mut state = self.lock();
                    let current = state.snapshot.wallet.address == Some(address)
                        && state.snapshot.eligibility.as_ref().is_some_and(|e| e.is_eligible);
                    if current {
                        state.snapshot.prepared = prepared;
                    }
                }
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "Flow preparation failed");
                }
            }
        }

        Ok(Verification::Completed(result))
    }

    /// Start a signature attempt and drive it to a terminal phase.
    ///
    /// Precondition failures return an error; a failed attempt returns the
    /// flow in its `Failed` phase.
    pub async fn begin_signature_flow(&self) -> Result<SignatureFlow, SessionError> {
        let (flow, signer, generation) = {
            let mut state = self.lock();
            if state.snapshot.flow.as_ref().is_some_and(|f| f.phase().is_active()) {
                return Err(SessionError::FlowInProgress);
            }

            let wallet = state.snapshot.wallet.clone();
            let address = match wallet.address {
                Some(address) if wallet.connection_state == ConnectionState::Connected => address,
                _ => return Err(SessionError::WalletNotConnected),
            };
            let signer = state
                .signer
                .as_ref()
                .filter(|_| wallet.can_sign())
                .map(BoundSigner::handle);
            let Some(signer) = signer else {
                state.snapshot.error = Some(ErrorKind::SignerUnavailable);
                state.snapshot.status = ErrorKind::SignerUnavailable.to_string();
                return Err(SessionError::SignerUnavailable);
            };
            if !state.snapshot.is_eligible() {
                return Err(SessionError::NotEligible);
            }

            let flow = self.inner.orchestrator.prepare(address);
            state.snapshot.flow = Some(flow.clone());
            state.snapshot.error = None;
            state.snapshot.celebrate = false;
            state.snapshot.status = status_for(&flow, &FlowEvent::AwaitingSignature, &self.inner.program, 0);
            (flow, signer, state.generation)
        };
        self.emit(SessionEvent::Flow { event: FlowEvent::AwaitingSignature });

        let mut guard = AttemptGuard {
            session: self,
            generation,
            flow_id: flow.flow_id().to_string(),
            armed: true,
        };
        let observer = SessionObserver {
            session: self,
            generation,
        };
        let flow = self.inner.orchestrator.drive(flow, signer.as_ref(), &observer).await;
        guard.armed = false;
        Ok(flow)
    }

    /// Notify the backend of a claim for a completed flow.
    pub async fn claim(&self) -> Result<(), SessionError> {
        let (address, generation) = {
            let state = self.lock();
            let claimable = state
                .snapshot
                .flow
                .as_ref()
                .is_some_and(|f| f.phase().allows_claim());
            match (claimable, state.snapshot.wallet.address) {
                (true, Some(address)) => (address, state.generation),
                _ => return Err(SessionError::NoCompletedFlow),
            }
        };

        let result = self.inner.reporter.notify_claim(&address).await;

        let mut state = self.lock();
        if state.generation != generation {
            return result.map_err(SessionError::Claim);
        }
        match result {
            Ok(()) => {
                state.snapshot.celebrate = true;
                if state.snapshot.error == Some(ErrorKind::ClaimFailed) {
                    state.snapshot.error = None;
                }
                drop(state);
                self.emit(SessionEvent::Claimed { address });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Claim failed");
                state.snapshot.error = Some(ErrorKind::ClaimFailed);
                state.snapshot.status = ErrorKind::ClaimFailed.to_string();
                drop(state);
                self.emit(SessionEvent::ClaimFailed { address });
                Err(SessionError::Claim(e))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().expect("session state mutex poisoned")
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

/// Publishes orchestrator progress into the session it was started from.
struct SessionObserver<'a> {
    session: &'a Session,
    generation: u64,
}

impl FlowObserver for SessionObserver<'_> {
    fn on_event(&self, flow: &SignatureFlow, event: &FlowEvent) {
        {
            let mut state = self.session.lock();
            if state.generation != self.generation {
                return;
            }
            let total = self.session.registry().len();
            state.snapshot.status = status_for(flow, event, &self.session.inner.program, total);
            if let FlowEvent::Finished { phase } = event {
                state.snapshot.error = flow.error();
                state.snapshot.celebrate = *phase == FlowPhase::Completed;
            }
            state.snapshot.flow = Some(flow.clone());
        }
        self.session.emit(SessionEvent::Flow { event: event.clone() });
    }
}

/// Settles the published attempt if the caller drops `begin_signature_flow`
/// before it finishes.
struct AttemptGuard<'a> {
    session: &'a Session,
    generation: u64,
    flow_id: String,
    armed: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut state) = self.session.inner.state.lock() else {
            return;
        };
        if state.generation != self.generation {
            return;
        }
        let total = self.session.registry().len();
        let Some(flow) = state
            .snapshot
            .flow
            .as_mut()
            .filter(|f| f.flow_id() == self.flow_id && f.phase().is_active())
        else {
            return;
        };

        let phase = if flow.phase() == FlowPhase::AwaitingSignature {
            flow.fail(ErrorKind::SigningError);
            FlowPhase::Failed
        } else {
            flow.finish(total)
        };
        let error = flow.error();
        let status = status_for(flow, &FlowEvent::Finished { phase }, &self.session.inner.program, total);
        tracing::warn!(flow_id = %self.flow_id, phase = phase.as_str(), "Signature attempt abandoned by caller");

        state.snapshot.error = error;
        state.snapshot.status = status;
        state.snapshot.celebrate = phase == FlowPhase::Completed;
        drop(state);
        self.session.emit(SessionEvent::Flow {
            event: FlowEvent::Finished { phase },
        });
    }
}

fn status_for(flow: &SignatureFlow, event: &FlowEvent, program: &ProgramConfig, total: usize) -> String {
    match event {
        FlowEvent::AwaitingSignature => "Please sign the message in your wallet...".to_string(),
        FlowEvent::Signed => "Signature verified!".to_string(),
        FlowEvent::NetworkStarted { name, index, total, .. } => {
            format!("Verifying on {} ({}/{})...", name, index + 1, total)
        }
        FlowEvent::NetworkConfirmed { name, .. } => format!("Verified on {}...", name),
        FlowEvent::NetworkFailed { name, .. } => format!("Verification failed on {}", name),
        FlowEvent::Finished { phase: FlowPhase::Completed } => format!(
            "Congratulations! {} {} + {}% Bonus secured!",
            program.allocation_amount, program.token_symbol, program.current_bonus_pct
        ),
        FlowEvent::Finished { phase: FlowPhase::PartiallyCompleted } => flow.progress_label(total),
        FlowEvent::Finished { .. } => flow
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Signature failed".to_string()),
    }
}
