//! Runs a navigator against the mock user manager and records what it publishes.

use std::sync::Arc;
use std::time::Duration;

use authstate_auth::{
    mock_user, AuthController, ControllerConfig, ControllerError, MockOutcome, MockUserManager,
};
use authstate_core::auth::{ActiveNavigator, AuthState, ErrorContext, ManagerError, NavigatorRequest};
use serde::Serialize;

use crate::cli::simulate::SimulateCommand;
use crate::error::Result;

/// Every state a simulated operation went through, in order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub operation: ActiveNavigator,
    pub transitions: Vec<AuthState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorContext>,
}

impl SimulationReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn final_state(&self) -> Option<&AuthState> {
        self.transitions.last()
    }

    /// The recorded failure as an error, for callers that exit on it.
    ///
    /// # Errors
    ///
    /// Returns the operation's `ErrorContext` if it failed.
    pub fn ensure_succeeded(&self) -> std::result::Result<(), ErrorContext> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Initialize a controller, run the requested operation and collect the
/// states observed along the way.
///
/// # Errors
///
/// Returns an error for malformed `--args` or if the controller rejects the
/// call outright. A failing operation is reported in the result, not here.
pub async fn run(cmd: &SimulateCommand) -> Result<SimulationReport> {
    let operation = ActiveNavigator::from(cmd.operation);
    let args = cmd
        .args
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()?;
    let request = NavigatorRequest::from_json(operation, args)?;

    let manager = if cmd.signed_in {
        MockUserManager::with_user(mock_user("mock-user"))
    } else {
        MockUserManager::new()
    }
    .with_latency(Duration::from_millis(cmd.latency_ms));

    if let Some(message) = &cmd.fail {
        manager
            .set_outcome(
                operation,
                MockOutcome::Fail(ManagerError::other(message.clone())),
            )
            .await;
    }

    let controller = AuthController::new(
        Arc::new(manager),
        ControllerConfig {
            error_policy: cmd.policy.into(),
            ..Default::default()
        },
    );

    let mut transitions = vec![controller.state()];
    controller.initialize(None).await?;
    transitions.push(controller.state());

    let mut rx = controller.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            seen.push(rx.borrow_and_update().clone());
        }
        seen
    });

    tracing::debug!(navigator = %operation, "running simulated operation");
    let error = match controller.navigate(request).await {
        Ok(_) => None,
        Err(ControllerError::Operation(context)) => Some(context),
        Err(err) => return Err(err.into()),
    };

    // Closing the channel ends the observer once it has drained.
    drop(controller);
    transitions.extend(observer.await?);

    Ok(SimulationReport {
        operation,
        transitions,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::simulate::{Operation, PolicyArg};
    use authstate_core::Slot;

    fn command(operation: Operation) -> SimulateCommand {
        SimulateCommand {
            operation,
            args: None,
            fail: None,
            policy: PolicyArg::Clear,
            signed_in: false,
            latency_ms: 20,
        }
    }

    #[tokio::test]
    async fn test_successful_redirect() {
        let report = run(&command(Operation::SigninRedirect)).await.unwrap();

        assert!(report.succeeded());
        assert!(report.ensure_succeeded().is_ok());
        assert_eq!(report.transitions[0], authstate_core::auth::initial_auth_state());
        assert!(report
            .transitions
            .iter()
            .any(|state| state.active_navigator() == Some(ActiveNavigator::SigninRedirect)));

        let last = report.final_state().unwrap();
        assert!(last.is_authenticated);
        assert!(!last.is_loading);
        assert_eq!(last.active_navigator, Slot::Cleared);
    }

    #[tokio::test]
    async fn test_failed_popup_records_args() {
        let cmd = SimulateCommand {
            args: Some("{}".to_string()),
            fail: Some("Popup closed by user".to_string()),
            ..command(Operation::SigninPopup)
        };

        let report = run(&cmd).await.unwrap();

        let failure = report.ensure_succeeded().unwrap_err();
        assert_eq!(failure.to_string(), "signinPopup failed: Popup closed by user");

        let error = report.error.as_ref().unwrap();
        assert_eq!(error.source_tag(), "signinPopup");
        assert_eq!(error.message, "Popup closed by user");
        assert_eq!(
            error.origin.args_json().unwrap().unwrap(),
            serde_json::json!({})
        );

        let last = report.final_state().unwrap();
        assert!(!last.is_loading);
        assert_eq!(last.error().unwrap(), error);
        assert!(report.transitions.iter().all(AuthState::is_consistent));
    }

    #[tokio::test]
    async fn test_signout_with_signed_in_user() {
        let cmd = SimulateCommand {
            signed_in: true,
            ..command(Operation::SignoutSilent)
        };

        let report = run(&cmd).await.unwrap();

        assert!(report.transitions[1].is_authenticated);
        let last = report.final_state().unwrap();
        assert!(!last.is_authenticated);
        assert_eq!(last.user, Slot::Cleared);
    }

    #[tokio::test]
    async fn test_invalid_args_are_rejected() {
        let cmd = SimulateCommand {
            args: Some("{\"username\": 42}".to_string()),
            ..command(Operation::SigninResourceOwnerCredentials)
        };

        assert!(run(&cmd).await.is_err());
    }
}
