//! Popup host
//!
//! Owns the controller, the settings store and the presenter for one
//! popup instance, restores persisted settings on load and forwards
//! controller notifications to the presenter.

use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::application::{CallSessionController, SessionEvent};
use crate::domain::call::Action;
use crate::domain::device::DeviceEvent;
use crate::domain::settings::{SettingKey, SettingsStore};

use super::presenter::ActionPresenter;

/// Gesture or edit coming from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupCommand {
    Perform(Action),
    SetupDevice,
    SetNumber(String),
    SetTokenUrl(String),
}

pub struct Popup {
    controller: CallSessionController,
    settings: Arc<dyn SettingsStore>,
    presenter: Box<dyn ActionPresenter>,
    notifications: broadcast::Receiver<SessionEvent>,
}

impl Popup {
    /// Restore settings into the controller and render the initial view
    pub async fn load(
        mut controller: CallSessionController,
        settings: Arc<dyn SettingsStore>,
        presenter: Box<dyn ActionPresenter>,
    ) -> Self {
        let token_url = restore(settings.as_ref(), SettingKey::TokenUrl).await;
        let number = restore(settings.as_ref(), SettingKey::Number).await;
        controller.set_token_url(token_url);
        controller.set_remote_address(number);

        let notifications = controller.subscribe();
        let mut popup = Self {
            controller,
            settings,
            presenter,
            notifications,
        };

        popup.presenter.present_actions(popup.controller.actions());
        popup.controller.notice("App rendered.");
        popup.flush();
        popup
    }

    pub async fn dispatch(&mut self, command: PopupCommand) {
        match command {
            PopupCommand::Perform(action) => self.controller.perform(action).await,
            PopupCommand::SetupDevice => self.controller.setup_device().await,
            PopupCommand::SetNumber(number) => {
                self.persist(SettingKey::Number, &number).await;
                self.controller.set_remote_address(number);
            }
            PopupCommand::SetTokenUrl(url) => {
                self.persist(SettingKey::TokenUrl, &url).await;
                self.controller.set_token_url(url);
            }
        }
        self.flush();
    }

    pub fn handle_event(&mut self, event: DeviceEvent) {
        self.controller.handle_event(event);
        self.flush();
    }

    /// Apply provider events that are already queued
    pub fn process_pending_events(&mut self) -> usize {
        let handled = self.controller.process_pending_events();
        self.flush();
        handled
    }

    /// Serve user commands and provider events until the command channel closes
    pub async fn run(&mut self, mut commands: mpsc::Receiver<PopupCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command).await,
                    None => break,
                },
                Some(event) = self.controller.next_event() => self.handle_event(event),
            }
        }
        info!("Popup closed");
    }

    pub fn controller(&self) -> &CallSessionController {
        &self.controller
    }

    async fn persist(&self, key: SettingKey, value: &str) {
        if let Err(e) = self.settings.set(key, value).await {
            warn!("Could not save {}: {}", key, e);
        }
    }

    fn flush(&mut self) {
        loop {
            match self.notifications.try_recv() {
                Ok(event) => self.presenter.notify(&event.notification),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Presenter missed {} notifications", missed);
                    self.presenter.present_actions(self.controller.actions());
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        self.presenter.present_setup(self.controller.setup_offered());
    }
}

async fn restore(settings: &dyn SettingsStore, key: SettingKey) -> String {
    match settings.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not restore {}: {}", key, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{ActionSet, SessionState};
    use crate::domain::device::DeviceOptions;
    use crate::domain::settings::MockSettingsStore;
    use crate::domain::shared::error::DomainError;
    use crate::domain::token::MockTokenProvider;
    use crate::infrastructure::provider::LoopbackProvider;
    use crate::infrastructure::settings::MemorySettingsStore;
    use crate::interface::presenter::ConsolePresenter;
    use mockall::predicate::eq;

    fn controller(provider: &LoopbackProvider) -> CallSessionController {
        CallSessionController::new(
            Arc::new(MockTokenProvider::new()),
            Arc::new(provider.clone()),
            DeviceOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_load_restores_settings_and_logs_render() {
        let provider = LoopbackProvider::new();
        let settings = MemorySettingsStore::new()
            .with_value(SettingKey::TokenUrl, "https://tokens.example/token")
            .with_value(SettingKey::Number, "+15550100");

        let popup = Popup::load(
            controller(&provider),
            Arc::new(settings),
            Box::new(ConsolePresenter::new(Vec::new())),
        )
        .await;

        let controller = popup.controller();
        assert_eq!(controller.token_url(), "https://tokens.example/token");
        assert_eq!(controller.remote_address(), "+15550100");
        assert_eq!(controller.actions(), &ActionSet::only(Action::Call));
        assert_eq!(controller.log().last().unwrap().to_string(), "INFO: App rendered.");
    }

    #[tokio::test]
    async fn test_edits_are_persisted() {
        let provider = LoopbackProvider::new();
        let mut settings = MockSettingsStore::new();
        settings.expect_get().returning(|_| Ok(String::new()));
        settings
            .expect_set()
            .with(eq(SettingKey::Number), eq("+15550199"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut popup = Popup::load(
            controller(&provider),
            Arc::new(settings),
            Box::new(ConsolePresenter::new(Vec::new())),
        )
        .await;
        popup.dispatch(PopupCommand::SetNumber("+15550199".to_string())).await;

        assert_eq!(popup.controller().remote_address(), "+15550199");
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_block_the_popup() {
        let provider = LoopbackProvider::new();
        let mut settings = MockSettingsStore::new();
        settings
            .expect_get()
            .returning(|_| Err(DomainError::Storage("quota exceeded".to_string())));
        settings
            .expect_set()
            .returning(|_, _| Err(DomainError::Storage("quota exceeded".to_string())));

        let mut popup = Popup::load(
            controller(&provider),
            Arc::new(settings),
            Box::new(ConsolePresenter::new(Vec::new())),
        )
        .await;
        assert_eq!(popup.controller().token_url(), "");

        popup
            .dispatch(PopupCommand::SetTokenUrl("https://t.example".to_string()))
            .await;
        assert_eq!(popup.controller().token_url(), "https://t.example");
        assert_eq!(popup.controller().state(), SessionState::Unset);
    }
}
