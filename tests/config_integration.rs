use datacloud_memory::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("DCMEM_STORE__OBJECT_NAME");
        env::remove_var("DCMEM_DATACLOUD__TIMEOUT_SECS");
        env::remove_var("DATACLOUD_INSTANCE_URL");
        env::remove_var("DATACLOUD_ACCESS_TOKEN");
        env::remove_var("DATACLOUD_TIMEOUT_SECS");
        env::remove_var("CONFIG_FILE");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["dcmem"]).expect("Failed to load config");
    assert_eq!(config.datacloud.timeout_secs, 30);
    assert_eq!(config.store.provider, "datacloud");
    assert_eq!(config.store.connector_name, "mem0");
    assert_eq!(config.store.object_name, "AgentMemory");
    assert_eq!(config.store.vector_index_name, "AgentMemory_index_dlm");
    assert_eq!(config.store.chunk_name, "AgentMemory_chunk_dlm");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("DCMEM_STORE__OBJECT_NAME", "TeamMemory");
        env::set_var("DCMEM_DATACLOUD__TIMEOUT_SECS", "12");
        env::set_var("DATACLOUD_ACCESS_TOKEN", "env-token");
    }

    let config = AppConfig::load_from_args(["dcmem"]).expect("Failed to load config");
    assert_eq!(config.store.object_name, "TeamMemory");
    assert_eq!(config.datacloud.timeout_secs, 12);
    assert_eq!(config.datacloud.access_token, "env-token");

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let config_content = r#"
datacloud:
  instance_url: https://tenant.c360a.salesforce.com
store:
  connector_name: agent_memories
  chunk_name: Memory_chunk_dlm
    "#;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("dcmem.yaml");
    fs::write(&file_path, config_content).expect("Failed to write temp config");

    // Tell AppConfig to use this file via Env Var (mocking CLI arg indirectly)
    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args(["dcmem"]).expect("Failed to load config from file");
    assert_eq!(
        config.datacloud.instance_url,
        "https://tenant.c360a.salesforce.com"
    );
    assert_eq!(config.store.connector_name, "agent_memories");
    assert_eq!(config.store.chunk_name, "Memory_chunk_dlm");
    // Keys missing from the file keep their defaults
    assert_eq!(config.store.object_name, "AgentMemory");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("dcmem.yaml");
    fs::write(
        &file_path,
        "datacloud:\n  instance_url: https://from-file.example\n  access_token: file-token\n",
    )
    .expect("Failed to write temp config");

    let config = AppConfig::load_from_args([
        "dcmem",
        "--config",
        file_path.to_str().unwrap(),
        "--instance-url",
        "https://from-cli.example",
    ])
    .expect("Failed to load config");

    assert_eq!(config.datacloud.instance_url, "https://from-cli.example");
    assert_eq!(config.datacloud.access_token, "file-token");
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["dcmem", "--config", "/nonexistent/dcmem.yaml"]);
    assert!(result.is_err());
}
