use reprint_fetch::logging::default_directive;
use reprint_fetch::{Config, ConfigOverrides, Error};
use std::io::Write;
use std::path::PathBuf;

fn toml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_file_values_layer_over_defaults() {
    let file = toml_file(
        r#"
[download]
output_directory = "pdfs"
max_tries = 5

[finders]
extended = true
"#,
    );

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.download.output_directory, PathBuf::from("pdfs"));
    assert_eq!(config.download.max_tries, 5);
    assert!(config.finders.extended);
    // untouched sections keep their defaults
    assert_eq!(config.download.errors_file, PathBuf::from("unfetched_pmids.tsv"));
    assert_eq!(config.resolver.unsupported_providers, vec!["ovid"]);
}

#[test]
fn test_explicit_file_must_exist() {
    let err = Config::load(Some(std::path::Path::new("/nonexistent/reprint-fetch.toml")));
    assert!(matches!(err, Err(Error::Config(_))));
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let file = toml_file("[download]\nmax_tries = 0\n");
    assert!(matches!(
        Config::load(Some(file.path())),
        Err(Error::InvalidInput { .. })
    ));

    let file = toml_file("[resolver]\nhail_mary_url = \"https://pmc.example/\"\n");
    assert!(matches!(
        Config::load(Some(file.path())),
        Err(Error::InvalidInput { .. })
    ));
}

#[test]
fn test_environment_overrides_file() {
    let file = toml_file("[http]\nconnect_timeout_secs = 30\n");
    std::env::set_var("REPRINT_FETCH__HTTP__CONNECT_TIMEOUT_SECS", "7");

    let config = Config::load(Some(file.path()));
    std::env::remove_var("REPRINT_FETCH__HTTP__CONNECT_TIMEOUT_SECS");

    assert_eq!(config.unwrap().http.connect_timeout_secs, 7);
}

#[test]
fn test_command_line_overrides_win() {
    let file = toml_file("[download]\nmax_tries = 5\nconcurrency = 4\n");
    let mut config = Config::load(Some(file.path())).unwrap();

    config
        .apply_overrides(&ConfigOverrides {
            max_tries: Some(2),
            output_directory: Some(PathBuf::from("elsewhere")),
            ..ConfigOverrides::default()
        })
        .unwrap();

    assert_eq!(config.download.max_tries, 2);
    assert_eq!(config.download.concurrency, 4);
    assert_eq!(config.download.output_directory, PathBuf::from("elsewhere"));
    assert_eq!(config.retry_config().max_attempts, 2);
}

#[test]
fn test_dumped_config_loads_back() {
    let mut config = Config::default();
    config.download.max_tries = 4;
    config.finders.extended = true;

    let file = toml_file(&config.to_toml().unwrap());
    let loaded = Config::load(Some(file.path())).unwrap();

    assert_eq!(loaded.download.max_tries, 4);
    assert!(loaded.finders.extended);
    assert_eq!(loaded.http.user_agent, config.http.user_agent);
    assert_eq!(loaded.pdbj, config.pdbj);
}

#[test]
fn test_file_verbose_selects_debug_logging() {
    let file = toml_file("verbose = true\n");
    let config = Config::load(Some(file.path())).unwrap();

    assert!(config.verbose);
    assert!(default_directive(config.verbose).starts_with("reprint_fetch=debug"));

    let quiet = Config::load(Some(toml_file("").path())).unwrap();
    assert!(default_directive(quiet.verbose).starts_with("reprint_fetch=info"));
}
