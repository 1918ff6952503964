//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_containing_except_files,
    find_non_export_lines_in_mod_files, path_exists,
};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
            "teloxide::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "reqwest::",
            "teloxide::",
        ],
    );

    assert!(hits.is_empty(), "found outer-layer imports in ports: {hits:#?}");
}

#[test]
fn application_does_not_reach_into_adapters() {
    let hits = find_lines_containing(
        "src/application",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "reqwest::",
            "teloxide::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found adapter or framework imports in application layer: {hits:#?}"
    );
}

#[test]
fn only_the_telegram_adapter_and_bootstrap_touch_teloxide() {
    let hits = find_lines_containing_except_files(
        "src",
        &["use teloxide"],
        &[
            "src/adapter/outbound/telegram/sink.rs",
            "src/adapter/outbound/telegram/listener.rs",
            "src/infrastructure/bootstrap.rs",
        ],
    );

    assert!(hits.is_empty(), "unexpected teloxide imports: {hits:#?}");
}

#[test]
fn polling_loop_reads_time_through_the_clock_port() {
    let hits = find_lines_containing(
        "src/application",
        &["Utc::now()", "SystemTime::now()"],
    );

    assert!(
        hits.is_empty(),
        "application layer must use the Clock port: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn testkit_is_present_for_integration_tests() {
    for file in [
        "src/testkit/clock.rs",
        "src/testkit/source.rs",
        "src/testkit/sink.rs",
        "src/testkit/registry.rs",
    ] {
        assert!(path_exists(file), "missing testkit module {file}");
    }
}
