//! Unit tests for control command parsing and refresh strategies.

use std::time::Duration;

use simdeck::api::{ControlCommand, RefreshStrategy};
use simdeck::config::GlobalConfig;
use simdeck::AppError;

#[test]
fn accepted_commands_parse() {
    assert_eq!("N".parse::<ControlCommand>().expect("N"), ControlCommand::Step);
    assert_eq!("R".parse::<ControlCommand>().expect("R"), ControlCommand::Run);
    assert_eq!("E".parse::<ControlCommand>().expect("E"), ControlCommand::Exit);
}

#[test]
fn commands_are_case_sensitive() {
    let result = "n".parse::<ControlCommand>();
    assert!(matches!(result, Err(AppError::InvalidCommand(ref raw)) if raw == "n"));
}

#[test]
fn anything_else_is_invalid() {
    for raw in ["", "X", "NN", " N", "step"] {
        assert!(
            matches!(raw.parse::<ControlCommand>(), Err(AppError::InvalidCommand(_))),
            "{raw:?} should be rejected"
        );
    }
}

#[test]
fn display_matches_wire_form() {
    for command in [ControlCommand::Step, ControlCommand::Run, ControlCommand::Exit] {
        assert_eq!(command.to_string(), command.as_wire());
    }
}

#[test]
fn step_and_exit_refresh_once_after_delay() {
    let config = GlobalConfig::from_toml_str("[timing]\nstep_refresh_ms = 300\n").expect("config");

    for command in [ControlCommand::Step, ControlCommand::Exit] {
        assert_eq!(
            command.refresh_strategy(&config),
            RefreshStrategy::AfterDelay(Duration::from_millis(300))
        );
    }
}

#[test]
fn run_polls_until_complete() {
    let config = GlobalConfig::from_toml_str("[timing]\nrun_poll_ms = 40\n").expect("config");

    assert_eq!(
        ControlCommand::Run.refresh_strategy(&config),
        RefreshStrategy::UntilComplete {
            poll_interval: Duration::from_millis(40)
        }
    );
}
