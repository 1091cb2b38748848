use scaffold_kernel::config::{ConfigLoader, ConfigProvider};
use scaffold_kernel::domain::config::ApiConfig;
use std::fs;
use tempfile::tempdir;

const BASE: &str = r#"
[server]
port = 8080

[open_api]
title = "Orders API"

[identity]
tenant_id = "contoso"

[identity.jwt]
secret = "from-file"
"#;

#[test]
fn layers_override_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;
    let secrets_dir = tempdir()?;
    fs::write(config_dir.path().join("server.toml"), BASE)?;
    fs::write(
        config_dir.path().join("server.Staging.toml"),
        "[open_api]\ntitle = \"Orders API (staging)\"\n",
    )?;
    fs::write(secrets_dir.path().join("identity__jwt__secret"), "from-vault\n")?;
    fs::write(secrets_dir.path().join(".hidden"), "ignored")?;

    let loaded = ConfigLoader::new(config_dir.path())
        .environment("Staging")
        .secrets_dir(secrets_dir.path())
        .env_vars([("SCAFFOLD__SERVER__PORT", "9090"), ("OTHER__SERVER__PORT", "1")])
        .load::<ApiConfig>()?;

    let config = &loaded.config;
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.open_api.title, "Orders API (staging)");
    assert_eq!(config.identity.tenant_id, "contoso");
    assert_eq!(config.identity.jwt.secret, "from-vault");
    assert_eq!(config.identity.app_identifier, "api://scaffold");

    let view = &loaded.view;
    let port = view.get("server.port").expect("port");
    assert_eq!(port.value, "9090");
    assert!(matches!(port.provider, ConfigProvider::Environment { .. }));

    let title = view.get("open_api.title").expect("title");
    assert!(title.provider.to_string().ends_with("server.Staging.toml"));

    let secret = view.get("identity.jwt.secret").expect("secret");
    assert!(secret.provider.is_secret_store());
    assert!(view.get(".hidden").is_none());

    Ok(())
}

#[test]
fn missing_base_file_is_fatal_unless_optional() -> Result<(), Box<dyn std::error::Error>> {
    let empty = tempdir()?;
    let no_env: [(&str, &str); 0] = [];

    let required = ConfigLoader::new(empty.path()).env_vars(no_env).load::<ApiConfig>();
    assert!(required.is_err());

    let loaded =
        ConfigLoader::new(empty.path()).env_vars(no_env).optional_base().load::<ApiConfig>()?;
    assert_eq!(loaded.config.server.port, 8080);
    assert!(loaded.view.is_empty());

    Ok(())
}

#[test]
fn malformed_file_reports_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("server.toml"), "[server]\nport = \"not-a-port\"\n")?;

    let no_env: [(&str, &str); 0] = [];
    let err = ConfigLoader::new(dir.path())
        .env_vars(no_env)
        .load::<ApiConfig>()
        .expect_err("invalid port");
    assert!(err.to_string().contains("deserialize"), "{err}");

    Ok(())
}

#[test]
fn replaced_sections_leave_no_stale_keys() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("server.toml"),
        "[feature]\nhosts = [\"a\", \"b\", \"c\"]\n\n[feature.limits]\nmax = \"10\"\n",
    )?;
    fs::write(dir.path().join("server.Staging.toml"), "[feature]\nhosts = [\"d\"]\n")?;

    let loaded = ConfigLoader::new(dir.path())
        .environment("Staging")
        .env_vars([("SCAFFOLD__FEATURE__LIMITS", "off")])
        .load::<ApiConfig>()?;

    let feature: Vec<String> = loaded
        .view
        .iter()
        .filter(|(key, _)| key.starts_with("feature"))
        .map(|(key, entry)| format!("{key}={}", entry.value))
        .collect();
    assert_eq!(feature, ["feature.hosts[0]=d", "feature.limits=off"]);

    Ok(())
}
