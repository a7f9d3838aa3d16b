use assert_cmd::Command;
use std::io::Write;
use std::str;

/// Runs the geocoder binary with a clean environment and returns
/// (exit success, stdout, stderr).
fn run_geocoder(args: &[&str]) -> (bool, String, String) {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("geocoder").unwrap();
    let output = cmd
        .env_remove("GEOCODER_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute");

    let stdout = str::from_utf8(&output.stdout)
        .expect("Failed to read stdout as UTF-8")
        .to_string();
    let stderr = str::from_utf8(&output.stderr)
        .expect("Failed to read stderr as UTF-8")
        .to_string();

    (output.status.success(), stdout, stderr)
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("failed to create config file");
    file.write_all(contents.as_bytes())
        .expect("failed to write config file");
    file
}

/// Built-in providers are listed with their display names
#[test]
fn list_providers() {
    let (ok, stdout, _) = run_geocoder(&["list", "provider"]);
    assert!(ok);
    assert_eq!(stdout, "openstreetmap\tOpenStreetMap\n");
}

/// Dumpers are sorted by display name
#[test]
fn list_dumpers() {
    let (ok, stdout, _) = run_geocoder(&["list", "dumper"]);
    assert!(ok);
    assert_eq!(stdout, "gpx\tGPX\ngeojson\tGeoJSON\nkml\tKML\nwkt\tWKT\n");
}

/// An unregistered provider is a configuration error, reported on stderr
#[test]
fn unknown_provider_fails() {
    let (ok, stdout, stderr) =
        run_geocoder(&["--provider", "googlemaps", "geocode", "221B Baker Street"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("unknown provider plugin: googlemaps"),
        "unexpected stderr: '{}'",
        stderr
    );
}

/// An unregistered dumper fails before any provider is tried
#[test]
fn unknown_dumper_fails() {
    let (ok, _, stderr) = run_geocoder(&["--dumper", "shapefile", "geocode", "Paris"]);
    assert!(!ok);
    assert!(stderr.contains("unknown dumper plugin: shapefile"));
}

/// An empty provider list goes straight to the terminal failure
#[test]
fn empty_provider_list_is_terminal_failure() {
    let config = config_file("geocode_providers = []\nreverse_providers = []\n");
    let path = config.path().to_str().unwrap();

    let (ok, stdout, stderr) = run_geocoder(&["--config", path, "geocode", "221B Baker Street"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("No plugin could geocode") && stderr.contains("221B Baker Street"),
        "unexpected stderr: '{}'",
        stderr
    );

    let (ok, _, stderr) = run_geocoder(&["--config", path, "reverse", "51.5237", "-0.1585"]);
    assert!(!ok);
    assert!(stderr.contains("No plugin could reverse geocode"));
}

/// Invalid configuration files are reported with their path
#[test]
fn invalid_config_fails() {
    let config = config_file("geocode_providers = \"openstreetmap\"\n");
    let path = config.path().to_str().unwrap();

    let (ok, _, stderr) = run_geocoder(&["--config", path, "geocode", "Paris"]);
    assert!(!ok);
    assert!(stderr.contains("invalid configuration"));
}

/// Malformed --option values are rejected
#[test]
fn malformed_option_fails() {
    let config = config_file("geocode_providers = []\n");
    let path = config.path().to_str().unwrap();

    let (ok, _, stderr) =
        run_geocoder(&["--config", path, "--option", "limit=3", "geocode", "Paris"]);
    assert!(!ok);
    assert!(stderr.contains("ID.KEY=VALUE"));
}

/// Provider options with the wrong type are a configuration error
#[test]
fn invalid_provider_option_type_fails() {
    let (ok, _, stderr) = run_geocoder(&[
        "--option",
        "openstreetmap.timeout_secs=\"soon\"",
        "geocode",
        "Paris",
    ]);
    assert!(!ok);
    assert!(stderr.contains("invalid options for plugin openstreetmap"));
}
