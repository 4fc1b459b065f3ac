// Integration tests for configuration loading

use anyhow::Result;
use loqa_voice::{Config, Language};
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[service]
name = "loqa-voice-test"

[service.http]
bind = "0.0.0.0"
port = 9000

[voice]
public_key = "pk-test"
nats_url = "nats://nats.internal:4222"
subject_prefix = "gateway"
default_language = "ar"
request_timeout_ms = 2500

[assistants]
en = "assistant-en"
ar = "assistant-ar"
"#;

fn write_config(dir: &TempDir, contents: &str) -> Result<String> {
    let path = dir.path().join("loqa-voice.toml");
    fs::write(&path, contents)?;
    Ok(path.to_string_lossy().into_owned())
}

#[test]
fn test_load_full_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, FULL_CONFIG)?;

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.service.name, "loqa-voice-test");
    assert_eq!(cfg.service.http.port, 9000);
    assert_eq!(cfg.voice.public_key, "pk-test");
    assert_eq!(cfg.voice.nats_url, "nats://nats.internal:4222");
    assert_eq!(cfg.voice.subject_prefix, "gateway");
    assert_eq!(cfg.voice.default_language, Language::Ar);
    assert_eq!(cfg.request_timeout().as_millis(), 2500);

    let session = cfg.session_config()?;
    assert_eq!(session.public_key, "pk-test");
    assert_eq!(session.language, Language::Ar);
    assert_eq!(session.assistants.resolve(Language::En).as_str(), "assistant-en");
    assert_eq!(session.assistants.resolve(Language::Ar).as_str(), "assistant-ar");

    Ok(())
}

#[test]
fn test_voice_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[service]
name = "loqa-voice"

[service.http]
bind = "127.0.0.1"
port = 8787

[voice]
public_key = "pk-test"

[assistants]
en = "assistant-en"
ar = "assistant-ar"
"#,
    )?;

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.voice.nats_url, "nats://localhost:4222");
    assert_eq!(cfg.voice.subject_prefix, "voice");
    assert_eq!(cfg.voice.default_language, Language::En);
    assert_eq!(cfg.request_timeout().as_secs(), 10);
    assert_eq!(cfg.session_config()?.ended_grace.as_millis(), 500);

    Ok(())
}

#[test]
fn test_blank_assistant_id_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, &FULL_CONFIG.replace("\"assistant-ar\"", "\"\""))?;

    let cfg = Config::load(&path)?;
    let err = cfg.session_config().unwrap_err();

    assert!(format!("{:#}", err).contains("no assistant configured for language 'ar'"));

    Ok(())
}

#[test]
fn test_missing_assistant_table_fails_to_load() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, &FULL_CONFIG.replace("[assistants]", "[unused]"))?;

    assert!(Config::load(&path).is_err());

    Ok(())
}

#[test]
fn test_bundled_config_loads() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/loqa-voice");
    let cfg = Config::load(path)?;

    assert_eq!(cfg.service.name, "loqa-voice");
    cfg.session_config()?;

    Ok(())
}
