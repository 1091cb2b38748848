use scaffold_logger::{LevelFilter, Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn invalid_directives_fail_before_install() {
    let err = Logger::builder("integration-directives")
        .directives("scaffold=verbose")
        .init()
        .expect_err("directives should be rejected");

    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}

#[test]
#[serial]
fn explicit_directives_install_the_subscriber() {
    let logger = Logger::builder("integration-directives")
        .level(LevelFilter::WARN)
        .directives("scaffold=debug,tower_http=info")
        .init()
        .expect("logger should initialize");

    assert!(!logger.has_file_sink());
    assert!(tracing::enabled!(target: "scaffold", tracing::Level::DEBUG));
}
