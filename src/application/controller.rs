//! Call-session controller
//!
//! Owns the device session and the current call, reacts to provider events
//! and user gestures, and derives the set of actions to offer from an
//! explicit [`SessionState`]. Every error is turned into an entry in the
//! session log; nothing propagates to the caller.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::domain::call::{Action, ActionSet, CallConnection, SessionState};
use crate::domain::device::{
    DeviceEvent, DeviceOptions, DeviceSession, DeviceStatus, TelephonyProvider,
};
use crate::domain::log::{SessionLog, Severity};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::token::TokenProvider;

use super::notification::{NotificationBroadcaster, SessionEvent, SessionNotification};

pub struct CallSessionController {
    state: SessionState,
    /// Last action set published; always `state.actions()`
    actions: ActionSet,
    session: Option<DeviceSession>,
    connection: Option<CallConnection>,
    /// A Call gesture started setup; dial once the device is ready
    dial_after_setup: bool,
    token_url: String,
    remote_address: String,
    token_provider: Arc<dyn TokenProvider>,
    telephony: Arc<dyn TelephonyProvider>,
    device_options: DeviceOptions,
    log: SessionLog,
    notifier: NotificationBroadcaster,
}

impl CallSessionController {
    pub fn new(
        token_provider: Arc<dyn TokenProvider>,
        telephony: Arc<dyn TelephonyProvider>,
        device_options: DeviceOptions,
    ) -> Self {
        let state = SessionState::Unset;
        Self {
            state,
            actions: state.actions(),
            session: None,
            connection: None,
            dial_after_setup: false,
            token_url: String::new(),
            remote_address: String::new(),
            token_provider,
            telephony,
            device_options,
            log: SessionLog::new(),
            notifier: NotificationBroadcaster::default(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = remote_address.into();
        self
    }

    pub fn set_token_url(&mut self, token_url: impl Into<String>) {
        self.token_url = token_url.into();
    }

    pub fn set_remote_address(&mut self, remote_address: impl Into<String>) {
        self.remote_address = remote_address.into();
    }

    /// Subscribe to log, action-set, identity and call-id notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    /// Append an informational line on behalf of the host
    pub fn notice(&mut self, message: impl Into<String>) {
        self.emit(Severity::Info, message);
    }

    /// Dispatch one of the five user gestures
    pub async fn perform(&mut self, action: Action) {
        match action {
            Action::Call => self.call().await,
            Action::Hangup => self.hangup(),
            Action::Accept => self.accept(),
            Action::Reject => self.reject(),
            Action::Ignore => self.ignore(),
        }
    }

    /// Dial the current number, setting the device up first if needed
    pub async fn call(&mut self) {
        if let Err(e) = self.try_call().await {
            self.record_error(&e);
        }
    }

    /// Set the device up without dialing
    pub async fn setup_device(&mut self) {
        if let Err(e) = self.try_setup_device().await {
            self.record_error(&e);
        }
    }

    pub fn hangup(&mut self) {
        if let Err(e) = self.try_hangup() {
            self.record_error(&e);
        }
    }

    pub fn accept(&mut self) {
        if let Err(e) = self.try_accept() {
            self.record_error(&e);
        }
    }

    pub fn reject(&mut self) {
        if let Err(e) = self.try_reject() {
            self.record_error(&e);
        }
    }

    pub fn ignore(&mut self) {
        if let Err(e) = self.try_ignore() {
            self.record_error(&e);
        }
    }

    /// Apply one provider event
    pub fn handle_event(&mut self, event: DeviceEvent) {
        debug!(event = event.event_type(), state = ?self.state, "Device event");
        if let Some(session) = self.session.as_mut() {
            session.observe(&event);
        }
        if let Err(e) = self.try_handle_event(event) {
            self.record_error(&e);
        }
    }

    /// Wait for the next provider event; pends while no device exists
    pub async fn next_event(&mut self) -> Option<DeviceEvent> {
        match self.session.as_mut() {
            Some(session) => session.next_event().await,
            None => std::future::pending().await,
        }
    }

    /// Apply every event the provider has already delivered
    pub fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.session.as_mut().and_then(|s| s.try_next_event()) {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    async fn try_call(&mut self) -> Result<()> {
        self.require(Action::Call)?;
        match self.state {
            SessionState::Unset => {
                self.dial_after_setup = true;
                self.begin_setup().await
            }
            _ => self.dial(),
        }
    }

    async fn try_setup_device(&mut self) -> Result<()> {
        if self.state != SessionState::Unset {
            return Err(DomainError::Precondition(
                "Device is already set up".to_string(),
            ));
        }
        self.dial_after_setup = false;
        self.begin_setup().await
    }

    async fn begin_setup(&mut self) -> Result<()> {
        self.notice("Setting up device");
        self.transition(SessionState::SettingUp)?;

        match self.establish_session().await {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                self.abandon_setup()?;
                Err(e)
            }
        }
    }

    async fn establish_session(&mut self) -> Result<DeviceSession> {
        let grant = self.token_provider.fetch_token(self.token_url.trim()).await?;
        let identity = grant.identity.clone();

        let mut session = DeviceSession::new(self.telephony.clone());
        session.initialize(grant, &self.device_options)?;

        self.notifier
            .publish(SessionNotification::IdentityResolved { identity });
        Ok(session)
    }

    fn abandon_setup(&mut self) -> Result<()> {
        self.dial_after_setup = false;
        self.session = None;
        self.transition(SessionState::Unset)
    }

    fn dial(&mut self) -> Result<()> {
        let number = self.remote_address.trim().to_string();
        if number.is_empty() {
            return Err(DomainError::Precondition(
                "No phone number to call".to_string(),
            ));
        }

        self.notice(format!("Calling {}", number));
        let connection = self.device()?.place_call(&number)?;
        self.connection = Some(connection);
        self.transition(SessionState::Dialing)
    }

    fn try_hangup(&mut self) -> Result<()> {
        self.require(Action::Hangup)?;
        self.notice("Hanging up");
        // State follows the provider's Disconnected/Cancelled event
        self.device()?.terminate_all();
        Ok(())
    }

    fn try_accept(&mut self) -> Result<()> {
        self.require(Action::Accept)?;
        self.notice("Accepting call");
        self.device()?.accept(self.ringing_connection()?)?;
        self.transition(SessionState::OnCall)
    }

    fn try_reject(&mut self) -> Result<()> {
        self.require(Action::Reject)?;
        self.notice("Rejecting call");
        self.device()?.reject(self.ringing_connection()?)?;
        self.connection = None;
        self.transition(SessionState::Idle)
    }

    fn try_ignore(&mut self) -> Result<()> {
        self.require(Action::Ignore)?;
        self.notice("Ignoring call");
        self.device()?.ignore(self.ringing_connection()?)?;
        self.connection = None;
        self.transition(SessionState::Idle)
    }

    fn try_handle_event(&mut self, event: DeviceEvent) -> Result<()> {
        match event {
            DeviceEvent::Ready => {
                self.notice("Device ready");
                if self.state == SessionState::SettingUp {
                    self.transition(SessionState::Idle)?;
                    if std::mem::take(&mut self.dial_after_setup) {
                        self.dial()?;
                    }
                }
                Ok(())
            }
            DeviceEvent::Offline => {
                self.notice("Device offline");
                Ok(())
            }
            DeviceEvent::Error { message, code } => {
                if self.state == SessionState::SettingUp {
                    self.abandon_setup()?;
                }
                Err(DomainError::Provider { message, code })
            }
            DeviceEvent::Ringing => {
                if self.state == SessionState::Dialing {
                    self.notice("Ringing");
                    self.transition(SessionState::RingingOut)?;
                }
                Ok(())
            }
            DeviceEvent::Connected { connection } => match self.state {
                SessionState::Dialing | SessionState::RingingOut | SessionState::OnCall => {
                    self.notice("Connection established");
                    self.store_connection(connection);
                    self.transition(SessionState::OnCall)
                }
                state => {
                    debug!("Ignoring connect for a call already gone ({:?})", state);
                    Ok(())
                }
            },
            DeviceEvent::Disconnected => {
                if !self.state.has_device() {
                    return Ok(());
                }
                self.notice("Call disconnected");
                self.connection = None;
                self.transition(SessionState::Idle)?;
                self.device()?.terminate_all();
                Ok(())
            }
            DeviceEvent::Cancelled => {
                if !self.state.has_device() {
                    return Ok(());
                }
                self.notice("Call cancelled");
                self.connection = None;
                self.transition(SessionState::Idle)
            }
            DeviceEvent::Incoming { connection } => {
                if self.state == SessionState::Idle {
                    self.notice(format!(
                        "Incoming connection from {}",
                        connection.remote_address()
                    ));
                    self.store_connection(connection);
                    self.transition(SessionState::RingingIn)
                } else {
                    self.notice(format!(
                        "Rejecting incoming connection from {} (line busy)",
                        connection.remote_address()
                    ));
                    self.device()?.reject(&connection)
                }
            }
        }
    }

    fn transition(&mut self, next: SessionState) -> Result<()> {
        if next == self.state {
            return Ok(());
        }
        if !self.state.can_transition_to(&next) {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot transition from {:?} to {:?}",
                self.state, next
            )));
        }

        debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;

        let actions = next.actions();
        if actions != self.actions {
            self.actions = actions.clone();
            self.notifier
                .publish(SessionNotification::ActionSetChanged { actions });
        }
        Ok(())
    }

    fn store_connection(&mut self, connection: CallConnection) {
        if let Some(call_id) = connection.provider_call_id() {
            self.notifier.publish(SessionNotification::CallIdChanged {
                call_id: Some(call_id.clone()),
            });
        }
        self.connection = Some(connection);
    }

    fn require(&self, action: Action) -> Result<()> {
        if self.actions.contains(action) {
            Ok(())
        } else {
            Err(DomainError::Precondition(format!(
                "{} is not available while {:?}",
                action, self.state
            )))
        }
    }

    fn device(&self) -> Result<&DeviceSession> {
        self.session.as_ref().ok_or(DomainError::NotReady)
    }

    fn ringing_connection(&self) -> Result<&CallConnection> {
        self.connection
            .as_ref()
            .ok_or_else(|| DomainError::Internal("no connection is ringing".to_string()))
    }

    fn record_error(&mut self, err: &DomainError) {
        self.emit(Severity::Error, err.to_string());
    }

    fn emit(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => info!("{}", message),
            Severity::Error => error!("{}", message),
        }
        let entry = self.log.append(severity, message).clone();
        self.notifier
            .publish(SessionNotification::LogEmitted { entry });
    }

    // Getters
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// The standalone setup control is only offered before setup starts
    pub fn setup_offered(&self) -> bool {
        self.state == SessionState::Unset
    }

    pub fn identity(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.identity())
    }

    pub fn device_status(&self) -> DeviceStatus {
        self.session
            .as_ref()
            .map(|s| s.status())
            .unwrap_or(DeviceStatus::Uninitialized)
    }

    pub fn connection(&self) -> Option<&CallConnection> {
        self.connection.as_ref()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }
}
