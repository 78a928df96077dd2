//! In-process telephony provider
//!
//! Answers device requests locally and lets the host script the remote
//! side (incoming calls, remote answer/hangup, outages). Every request is
//! recorded so callers can assert on what the device asked for.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::call::CallConnection;
use crate::domain::device::{DeviceEvent, DeviceEventSender, DeviceOptions, TelephonyProvider};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{AccessToken, ProviderCallId};

/// Code the loopback reports for requests made before registration
const NOT_REGISTERED: u32 = 31000;

/// A request the device made of the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    Register { debug: bool },
    Connect { to: String },
    DisconnectAll,
    Accept { call_id: Option<ProviderCallId> },
    Reject { call_id: Option<ProviderCallId> },
    Ignore { call_id: Option<ProviderCallId> },
}

#[derive(Default)]
struct LoopbackState {
    events: Option<DeviceEventSender>,
    requests: Vec<ProviderRequest>,
    /// Outgoing or accepted call
    active: Option<CallConnection>,
    /// Incoming call still ringing
    offered: Option<CallConnection>,
    failing_registration: Option<(String, u32)>,
}

impl LoopbackState {
    fn send(&self, event: DeviceEvent) -> bool {
        match &self.events {
            Some(tx) => {
                debug!("Loopback emits {}", event.event_type());
                tx.send(event).is_ok()
            }
            None => {
                warn!("Loopback has no registered device for {}", event.event_type());
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct LoopbackProvider {
    inner: Arc<Mutex<LoopbackState>>,
    auto_ready: bool,
    auto_answer: bool,
}

impl LoopbackProvider {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LoopbackState::default())),
            auto_ready: true,
            auto_answer: false,
        }
    }

    /// Emit `Ready` as soon as a device registers (default on)
    pub fn with_auto_ready(mut self, auto_ready: bool) -> Self {
        self.auto_ready = auto_ready;
        self
    }

    /// Have the remote side ring and answer every outgoing call
    pub fn with_auto_answer(mut self, auto_answer: bool) -> Self {
        self.auto_answer = auto_answer;
        self
    }

    fn state(&self) -> MutexGuard<'_, LoopbackState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.state().requests.clone()
    }

    /// Make the next `register` fail with a provider error
    pub fn fail_next_registration(&self, message: impl Into<String>, code: u32) {
        self.state().failing_registration = Some((message.into(), code));
    }

    /// Push an arbitrary event to the registered device
    pub fn emit(&self, event: DeviceEvent) -> bool {
        self.state().send(event)
    }

    /// Offer an incoming call from `from`
    pub fn ring_in(&self, from: &str) -> ProviderCallId {
        let call_id = new_call_id();
        let connection = CallConnection::incoming(from, call_id.clone());
        let mut state = self.state();
        state.offered = Some(connection.clone());
        state.send(DeviceEvent::Incoming { connection });
        call_id
    }

    /// Remote party starts ringing for the outgoing call
    pub fn remote_ringing(&self) -> bool {
        let state = self.state();
        state.active.is_some() && state.send(DeviceEvent::Ringing)
    }

    /// Remote party answers the outgoing call
    pub fn remote_answer(&self) -> Option<ProviderCallId> {
        let mut state = self.state();
        let connection = state.active.take()?;
        let connection = match connection.provider_call_id() {
            Some(_) => connection,
            None => connection.with_call_id(new_call_id()),
        };
        let call_id = connection.provider_call_id().cloned();
        state.active = Some(connection.clone());
        state.send(DeviceEvent::Connected { connection });
        call_id
    }

    /// Remote party hangs up an established call
    pub fn remote_hangup(&self) -> bool {
        let mut state = self.state();
        state.active.take().is_some() && state.send(DeviceEvent::Disconnected)
    }

    /// Remote party gives up before the call is answered
    pub fn remote_cancel(&self) -> bool {
        let mut state = self.state();
        let had_call = state.offered.take().is_some() || state.active.take().is_some();
        had_call && state.send(DeviceEvent::Cancelled)
    }

    pub fn go_offline(&self) -> bool {
        self.emit(DeviceEvent::Offline)
    }

    pub fn fail(&self, message: impl Into<String>, code: u32) -> bool {
        self.emit(DeviceEvent::Error {
            message: message.into(),
            code,
        })
    }
}

impl Default for LoopbackProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TelephonyProvider for LoopbackProvider {
    fn register(
        &self,
        token: &AccessToken,
        options: &DeviceOptions,
        events: DeviceEventSender,
    ) -> Result<()> {
        let mut state = self.state();
        if let Some((message, code)) = state.failing_registration.take() {
            return Err(DomainError::provider(message, code));
        }
        if token.is_empty() {
            return Err(DomainError::provider("Access token is empty", 31204));
        }

        info!("Loopback device registered (debug: {})", options.debug);
        state.requests.push(ProviderRequest::Register {
            debug: options.debug,
        });
        state.events = Some(events);
        state.active = None;
        state.offered = None;
        if self.auto_ready {
            state.send(DeviceEvent::Ready);
        }
        Ok(())
    }

    fn connect(&self, to: &str) -> Result<()> {
        let mut state = self.state();
        if state.events.is_none() {
            return Err(DomainError::provider("Device is not registered", NOT_REGISTERED));
        }
        state.requests.push(ProviderRequest::Connect { to: to.to_string() });

        if self.auto_answer {
            let connection = CallConnection::outgoing(to).with_call_id(new_call_id());
            state.active = Some(connection.clone());
            state.send(DeviceEvent::Ringing);
            state.send(DeviceEvent::Connected { connection });
        } else {
            state.active = Some(CallConnection::outgoing(to));
        }
        Ok(())
    }

    fn disconnect_all(&self) {
        let mut state = self.state();
        state.requests.push(ProviderRequest::DisconnectAll);
        let had_call = state.active.take().is_some() | state.offered.take().is_some();
        if had_call {
            state.send(DeviceEvent::Disconnected);
        }
    }

    fn accept(&self, connection: &CallConnection) -> Result<()> {
        let mut state = self.state();
        state.requests.push(ProviderRequest::Accept {
            call_id: connection.provider_call_id().cloned(),
        });
        state.offered = None;
        state.active = Some(connection.clone());
        state.send(DeviceEvent::Connected {
            connection: connection.clone(),
        });
        Ok(())
    }

    fn reject(&self, connection: &CallConnection) -> Result<()> {
        let mut state = self.state();
        state.requests.push(ProviderRequest::Reject {
            call_id: connection.provider_call_id().cloned(),
        });
        clear_offer(&mut state, connection);
        Ok(())
    }

    fn ignore(&self, connection: &CallConnection) -> Result<()> {
        let mut state = self.state();
        state.requests.push(ProviderRequest::Ignore {
            call_id: connection.provider_call_id().cloned(),
        });
        clear_offer(&mut state, connection);
        Ok(())
    }
}

fn clear_offer(state: &mut LoopbackState, connection: &CallConnection) {
    let same_call = state
        .offered
        .as_ref()
        .is_some_and(|offered| offered.provider_call_id() == connection.provider_call_id());
    if same_call {
        state.offered = None;
    }
}

fn new_call_id() -> ProviderCallId {
    ProviderCallId::new(format!("CA{}", Uuid::new_v4().simple()))
}
