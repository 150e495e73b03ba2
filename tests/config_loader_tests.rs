use buildings::config::ConfigLoader;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const KEYS: [&str; 7] = [
    "BUILDINGS_PROFILE",
    "BUILDINGS_API_BIND_ADDR",
    "BUILDINGS_LOG_LEVEL",
    "BUILDINGS_DATABASE_URL",
    "BUILDINGS_DEFAULT_PER_PAGE",
    "BUILDINGS_MAX_PER_PAGE",
    "BUILDINGS_RUN_MIGRATIONS",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.pagination.default_per_page, 10);
    assert_eq!(cfg.pagination.max_per_page, 100);
    assert!(cfg.run_migrations);
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "BUILDINGS_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "BUILDINGS_API_BIND_ADDR=192.168.0.10:5000\nBUILDINGS_DEFAULT_PER_PAGE=25\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "BUILDINGS_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "BUILDINGS_PROFILE=test\nBUILDINGS_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.pagination.default_per_page, 25);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "BUILDINGS_API_BIND_ADDR=127.0.0.1:3000\nBUILDINGS_RUN_MIGRATIONS=true\n",
    );

    unsafe {
        env::set_var("BUILDINGS_API_BIND_ADDR", "0.0.0.0:9090");
        env::set_var("BUILDINGS_RUN_MIGRATIONS", "false");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");
    assert!(!cfg.run_migrations);

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("BUILDINGS_API_BIND_ADDR", "not-an-addr");
    }
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn unparsable_page_size_names_the_variable() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("BUILDINGS_MAX_PER_PAGE", "lots");
    }
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("non-numeric page size should fail");
    assert!(format!("{}", err).contains("MAX_PER_PAGE"));

    clear_env();
}

#[test]
fn default_page_size_cannot_exceed_the_maximum() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("BUILDINGS_DEFAULT_PER_PAGE", "50");
        env::set_var("BUILDINGS_MAX_PER_PAGE", "20");
    }
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("default above max should fail");
    assert!(format!("{}", err).contains("default per page must be between 1 and 20"));

    clear_env();
}
