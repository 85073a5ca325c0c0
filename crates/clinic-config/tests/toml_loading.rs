//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed cwd and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use clinic_config::ClinicConfig;
use pretty_assertions::assert_eq;

#[test]
fn loads_all_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/clinic/clinic.db"

[gemini]
api_key = "toml-key"
default_model = "gemini-2.5-pro"
timeout_secs = 30

[anonymization]
patient_codename = "ALEX"
therapist_codename = "ROBIN"
min_name_len = 4

[general]
actor_id = "usr-00000001"
default_limit = 50
"#,
        )?;

        let config: ClinicConfig = Figment::from(Serialized::defaults(ClinicConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/clinic/clinic.db");
        assert!(config.database.has_local_path());
        assert_eq!(config.gemini.api_key, "toml-key");
        assert_eq!(config.gemini.default_model, "gemini-2.5-pro");
        assert_eq!(config.gemini.timeout_secs, 30);
        assert_eq!(config.anonymization.patient_codename, "ALEX");
        assert_eq!(config.anonymization.therapist_codename, "ROBIN");
        assert_eq!(config.anonymization.min_name_len, 4);
        assert_eq!(config.general.actor_id, "usr-00000001");
        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn partial_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[gemini]
api_key = "only-key"
"#,
        )?;

        let config: ClinicConfig = Figment::from(Serialized::defaults(ClinicConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.gemini.is_configured());
        assert_eq!(config.gemini.default_model, "gemini-2.5-flash");
        assert_eq!(config.gemini.timeout_secs, 60);
        assert!(config.anonymization.enabled);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_from_project_dir() {
    Jail::expect_with(|jail| {
        jail.create_dir(".clinic")?;
        jail.create_file(
            ".clinic/config.toml",
            r#"
[general]
actor_id = "usr-fromproj"
"#,
        )?;

        let config = ClinicConfig::load().expect("config loads");
        assert_eq!(config.general.actor_id, "usr-fromproj");
        Ok(())
    });
}

#[test]
fn load_for_reads_an_explicit_project_root() {
    let temp = tempfile::TempDir::new().expect("tempdir should create");
    std::fs::create_dir(temp.path().join(".clinic")).expect(".clinic should create");
    std::fs::write(
        temp.path().join(".clinic/config.toml"),
        "[anonymization]\nenabled = false\n",
    )
    .expect("config should write");

    let config = ClinicConfig::load_for(temp.path()).expect("config loads");
    assert!(!config.anonymization.enabled);
}

#[test]
fn invalid_codenames_fail_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".clinic")?;
        jail.create_file(
            ".clinic/config.toml",
            r#"
[anonymization]
patient_codename = "SAM"
therapist_codename = "SAM"
"#,
        )?;

        let result = ClinicConfig::load();
        assert!(result.is_err());
        Ok(())
    });
}
