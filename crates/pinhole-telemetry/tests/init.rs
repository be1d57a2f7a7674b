use pinhole_telemetry::{init, LogFormat, TelemetryError, TelemetrySettings};

// Installing a global subscriber is once per process, so this file holds a
// single test.
#[test]
fn init_installs_once() {
    let settings = TelemetrySettings::builder()
        .service_name("pinhole-test")
        .format(LogFormat::Json)
        .default_directive("debug")
        .build();

    let guard = init(&settings).expect("first init installs the subscriber");
    tracing::info!("subscriber installed");
    tracing_log::log::info!("bridged log record");

    let err = init(&settings).map(|_| ()).unwrap_err();
    assert!(
        matches!(err, TelemetryError::LogBridge(_) | TelemetryError::Install(_)),
        "{err}"
    );

    drop(guard);
}
