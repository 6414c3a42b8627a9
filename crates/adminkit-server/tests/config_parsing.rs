use std::{env, fs};

use adminkit_cache::CacheKind;
use adminkit_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("adminkit.toml");

    let toml_content = r#"
[storage]
backend = "postgres"

[storage.postgres]
url = "postgres://admin:secret@db:5432/adminkit"
pool_size = 4
connect_timeout_ms = 1000

[cache]
cache_type = "redis"
ttl_secs = 120
placeholder_ttl_secs = 30

[redis]
url = "redis://cache:6379"
key_prefix = "staging:"

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert!(cfg.uses_postgres());
    assert_eq!(cfg.storage.postgres.pool_size, 4);
    assert_eq!(cfg.cache.kind(), CacheKind::Redis);
    assert_eq!(cfg.cache.ttl_secs, 120);
    assert_eq!(cfg.cache.placeholder_ttl_secs, 30);
    assert_eq!(cfg.cache.cleanup_interval_secs, 60);
    assert_eq!(cfg.redis.key_prefix, "staging:");
    assert_eq!(cfg.redis.pool_size, 10);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("ADMINKIT__CACHE__TTL_SECS", "45");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.cache.ttl_secs, 45);
    unsafe {
        env::remove_var("ADMINKIT__CACHE__TTL_SECS");
    }

    // 3) Invalid config should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[cache]
placeholder_ttl_secs = 0
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("cache.placeholder_ttl_secs must be > 0"));

    // 4) Missing file falls back to defaults
    let missing = dir.path().join("missing.toml");
    let defaults = load_config(missing.to_str()).expect("defaults are valid");
    assert!(!defaults.uses_postgres());
    assert_eq!(defaults.cache.kind(), CacheKind::Memory);
}
