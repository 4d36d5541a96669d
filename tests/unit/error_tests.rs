//! Unit tests for error display formats.

use playerdb_relay::{AppError, CommandRejection};

#[test]
fn display_is_prefixed_by_subsystem() {
    let cases = [
        (AppError::Config("x".into()), "config: x"),
        (AppError::Transport("x".into()), "transport: x"),
        (AppError::Bridge("x".into()), "bridge: x"),
        (AppError::Dispatch("x".into()), "dispatch: x"),
        (AppError::Io("x".into()), "io: x"),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn io_error_converts_to_io_variant() {
    let err: AppError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
    assert!(matches!(err, AppError::Io(ref msg) if msg == "pipe"));
}

#[test]
fn rejections_display_short_reason() {
    assert_eq!(
        CommandRejection::PermissionDenied.to_string(),
        "permission denied"
    );
    assert_eq!(CommandRejection::EmptyArgument.to_string(), "empty argument");
}

#[test]
fn app_error_implements_std_error() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    assert_error(&AppError::Dispatch("stopped".into()));
}
