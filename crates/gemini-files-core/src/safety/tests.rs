// gemini-files-core/src/safety/tests.rs
// ============================================================================
// Module: Safety Gate Unit Tests
// Description: Exhaustive and property tests for the safety decision table.
// Purpose: Pin every (mode, operation, confirmed) outcome.
// Dependencies: gemini-files-core, proptest
// ============================================================================

//! ## Overview
//! Walks the full decision table and checks mode resolution precedence.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only decision table assertions."
)]

use proptest::prelude::*;

use super::ConfirmationSource;
use super::FileOperation;
use super::SafetyDecision;
use super::SafetyDenial;
use super::SafetyMode;
use super::decide;
use super::enforce;
use super::resolve_safety_mode;
use crate::error::ErrorKind;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Generates any safety mode.
fn any_mode() -> impl Strategy<Value = SafetyMode> {
    prop::sample::select(SafetyMode::ALL.to_vec())
}

/// Generates any file operation.
fn any_operation() -> impl Strategy<Value = FileOperation> {
    prop::sample::select(FileOperation::ALL.to_vec())
}

// ============================================================================
// SECTION: Decision Table
// ============================================================================

#[test]
fn only_list_and_get_are_non_mutating() {
    let non_mutating: Vec<_> =
        FileOperation::ALL.into_iter().filter(|op| !op.is_mutating()).collect();
    assert_eq!(non_mutating, vec![FileOperation::List, FileOperation::Get]);
}

#[test]
fn non_mutating_operations_always_allowed() {
    for mode in SafetyMode::ALL {
        for confirmed in [false, true] {
            assert_eq!(decide(mode, FileOperation::List, confirmed), SafetyDecision::Allow);
            assert_eq!(decide(mode, FileOperation::Get, confirmed), SafetyDecision::Allow);
        }
    }
}

#[test]
fn read_only_blocks_mutations_even_when_confirmed() {
    for op in [FileOperation::Upload, FileOperation::Delete, FileOperation::Download] {
        for confirmed in [false, true] {
            assert_eq!(
                decide(SafetyMode::ReadOnly, op, confirmed),
                SafetyDecision::Deny(SafetyDenial::BlockedByMode)
            );
        }
    }
}

#[test]
fn balanced_requires_confirmation() {
    for op in [FileOperation::Upload, FileOperation::Delete, FileOperation::Download] {
        assert_eq!(
            decide(SafetyMode::Balanced, op, false),
            SafetyDecision::Deny(SafetyDenial::ConfirmationRequired)
        );
        assert_eq!(decide(SafetyMode::Balanced, op, true), SafetyDecision::Allow);
    }
}

#[test]
fn unsafe_allows_everything() {
    for op in FileOperation::ALL {
        for confirmed in [false, true] {
            assert!(decide(SafetyMode::Unsafe, op, confirmed).is_allowed());
        }
    }
}

#[test]
fn enforce_messages_name_the_confirmation_channel() {
    let cli = enforce(SafetyMode::Balanced, FileOperation::Delete, false, ConfirmationSource::ForceFlag)
        .expect_err("denied");
    assert_eq!(cli.to_string(), "Operation delete requires --force in balanced safety mode");
    assert_eq!(cli.kind(), ErrorKind::Validation);

    let rpc = enforce(
        SafetyMode::Balanced,
        FileOperation::Upload,
        false,
        ConfirmationSource::ConfirmArgument,
    )
    .expect_err("denied");
    assert_eq!(rpc.to_string(), "Operation upload requires confirm=true in balanced safety mode");
}

#[test]
fn enforce_blocked_message_mentions_mode() {
    let error =
        enforce(SafetyMode::ReadOnly, FileOperation::Download, true, ConfirmationSource::ForceFlag)
            .expect_err("denied");
    assert_eq!(error.to_string(), "Operation download is blocked in read-only safety mode");
    assert!(!error.retryable());
}

proptest! {
    #[test]
    fn decision_is_deterministic(mode in any_mode(), op in any_operation(), confirmed in any::<bool>()) {
        prop_assert_eq!(decide(mode, op, confirmed), decide(mode, op, confirmed));
    }

    #[test]
    fn enforce_agrees_with_decide(mode in any_mode(), op in any_operation(), confirmed in any::<bool>()) {
        let allowed = decide(mode, op, confirmed).is_allowed();
        let enforced = enforce(mode, op, confirmed, ConfirmationSource::ConfirmArgument);
        prop_assert_eq!(allowed, enforced.is_ok());
    }
}

// ============================================================================
// SECTION: Mode Resolution
// ============================================================================

#[test]
fn mode_defaults_to_read_only() {
    assert_eq!(resolve_safety_mode(None, None).unwrap(), SafetyMode::ReadOnly);
    assert_eq!(resolve_safety_mode(Some(""), Some("")).unwrap(), SafetyMode::ReadOnly);
}

#[test]
fn explicit_mode_beats_environment() {
    assert_eq!(resolve_safety_mode(Some("unsafe"), Some("balanced")).unwrap(), SafetyMode::Unsafe);
}

#[test]
fn environment_mode_used_without_explicit() {
    assert_eq!(resolve_safety_mode(None, Some("balanced")).unwrap(), SafetyMode::Balanced);
}

#[test]
fn invalid_explicit_mode_is_validation_failure() {
    let error = resolve_safety_mode(Some("yolo"), Some("balanced")).expect_err("invalid");
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(
        error.to_string(),
        "Invalid safety mode: yolo. Expected one of: read-only, balanced, unsafe"
    );
}

#[test]
fn invalid_environment_mode_is_not_silently_ignored() {
    let error = resolve_safety_mode(None, Some("permissive")).expect_err("invalid");
    assert_eq!(error.kind(), ErrorKind::Validation);
}

#[test]
fn mode_labels_round_trip() {
    for mode in SafetyMode::ALL {
        assert_eq!(mode.as_str().parse::<SafetyMode>().unwrap(), mode);
    }
}
