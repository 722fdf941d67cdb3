//! Pretty output formatting.

use authstate_core::auth::{AuthState, ErrorContext};
use authstate_core::Slot;

use crate::report::{TagList, UrlCheck};
use crate::simulate::SimulationReport;

fn slot_label<T>(slot: &Slot<T>, present: impl FnOnce(&T) -> String) -> String {
    match slot {
        Slot::Absent => "-".to_string(),
        Slot::Cleared => "(cleared)".to_string(),
        Slot::Present(value) => present(value),
    }
}

/// Format an error context for display.
pub fn format_error(error: &ErrorContext) -> String {
    let mut output = format!("{}: {}\n  Source: {}", error.name, error.message, error.origin);
    match error.origin.args_json() {
        Some(Ok(args)) => output.push_str(&format!("\n  Args: {args}")),
        Some(Err(err)) => output.push_str(&format!("\n  Args: (unprintable: {err})")),
        None => {}
    }
    if let Some(inner) = error.inner_error.get() {
        output.push_str(&format!("\n  Inner: {inner}"));
    }
    output
}

/// Format a state for display.
pub fn format_state(state: &AuthState) -> String {
    let user = slot_label(&state.user, |user| match user.profile.email() {
        Some(email) => format!("{} <{}>", user.profile.sub, email),
        None => user.profile.sub.clone(),
    });
    let navigator = slot_label(&state.active_navigator, ToString::to_string);

    let mut output = format!(
        "Loading: {}\n  Authenticated: {}\n  User: {}\n  Navigator: {}",
        state.is_loading, state.is_authenticated, user, navigator
    );
    match &state.error {
        Slot::Present(error) => {
            output.push_str("\n  Error: ");
            output.push_str(&format_error(error).replace('\n', "\n    "));
        }
        other => output.push_str(&format!("\n  Error: {}", slot_label(other, |_| String::new()))),
    }
    output
}

/// Format the tag list for display.
pub fn format_tags(tags: &TagList) -> String {
    let mut output = format!("NAVIGATORS ({})\n", tags.navigators.len());
    output.push_str(&"-".repeat(40));
    for navigator in &tags.navigators {
        output.push_str(&format!("\n  {navigator}"));
    }

    output.push_str(&format!("\n\nERROR SOURCES ({})\n", tags.error_sources.len()));
    output.push_str(&"-".repeat(40));
    for source in &tags.error_sources {
        let marker = if source.carries_args { " [args]" } else { "" };
        output.push_str(&format!("\n  {}{}", source.tag, marker));
    }
    output
}

/// Format a URL check for display.
pub fn format_url_check(check: &UrlCheck) -> String {
    let verdict = if check.has_auth_params {
        "carries auth callback parameters"
    } else {
        "does not carry auth callback parameters"
    };
    format!("{}\n  {} ({:?} mode)", check.url, verdict, check.response_mode)
}

/// Format a simulation report for display.
pub fn format_report(report: &SimulationReport) -> String {
    let status = if report.succeeded() { "succeeded" } else { "failed" };
    let mut output = format!(
        "{} {} ({} transitions)\n",
        report.operation,
        status,
        report.transitions.len()
    );
    output.push_str(&"-".repeat(40));
    for (step, state) in report.transitions.iter().enumerate() {
        output.push_str(&format!("\n[{step}] {}", format_state(state)));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use authstate_core::auth::{initial_auth_state, ErrorSource};

    #[test]
    fn test_format_initial_state() {
        let output = format_state(&initial_auth_state());
        assert!(output.starts_with("Loading: true"));
        assert!(output.contains("User: -"));
        assert!(output.contains("Error: -"));
    }

    #[test]
    fn test_format_error_lists_args() {
        let error = ErrorContext::new(ErrorSource::SignoutSilent { args: None }, "boom");
        let output = format_error(&error);
        assert!(output.contains("Source: signoutSilent"));
        assert!(output.contains("Args: null"));

        let error = ErrorContext::new(ErrorSource::RenewSilent, "boom");
        assert!(!format_error(&error).contains("Args"));
    }

    #[test]
    fn test_format_tags_marks_argument_carrying_sources() {
        let output = format_tags(&TagList::collect());
        assert!(output.contains("signinPopup [args]"));
        assert!(output.contains("\n  unknown"));
        assert!(!output.contains("unknown [args]"));
    }
}
