//! Shared test helpers for engine and controller integration tests.
//!
//! Tests run `/bin/sh` as the engine. The engine receives the submitted
//! source as its first argument, so the submitted "program" is the shell
//! script that plays the engine, and `$1`/`$2`/`$3` are the data, stack and
//! instruction dump files.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use simdeck::api::SessionController;
use simdeck::config::GlobalConfig;

/// A scripted engine: `N` steps (one log line, one snapshot, rewritten data
/// dump), `R` reports an intermediate and a final snapshot one second apart
/// and exits, `E` exits.
pub const FAKE_ENGINE: &str = r#"
printf '0x10000000 0\n' > "$1"
printf '0x7ffffff0 0\n' > "$2"
printf '0x0 0x00500093\n0x4 0x00a00113\n' > "$3"
echo "engine ready"
step=0
while IFS= read -r cmd; do
  case "$cmd" in
    N)
      step=$((step + 1))
      printf '0x10000000 %s\n' "$step" > "$1"
      echo "cycle $step"
      echo "{\"registers\":[{\"id\":1,\"value\":$step}]}"
      ;;
    R)
      echo "run started"
      echo '{"registers":[{"id":1,"value":100}]}'
      sleep 1
      echo '{"registers":[{"id":1,"value":200}]}'
      echo "run finished"
      exit 0
      ;;
    E)
      echo "exiting"
      exit 0
      ;;
    *)
      echo "unknown command $cmd" >&2
      ;;
  esac
done
"#;

/// Build a `GlobalConfig` rooted at `work_dir` that launches `engine`, with
/// short refresh timings.
pub fn test_config(work_dir: &Path, engine: &Path) -> GlobalConfig {
    let toml = format!(
        r#"
engine_path = '{engine}'
work_dir = '{root}'
http_port = 0
log_capacity = 50

[timing]
step_refresh_ms = 150
run_poll_ms = 50
drain_timeout_ms = 1000
"#,
        engine = engine.display(),
        root = work_dir.display(),
    );
    GlobalConfig::from_toml_str(&toml).expect("valid test config")
}

/// Config whose engine is `/bin/sh`, running the submitted source.
pub fn sh_config(work_dir: &Path) -> GlobalConfig {
    test_config(work_dir, Path::new("/bin/sh"))
}

/// Controller over `config`.
pub fn test_controller(config: GlobalConfig) -> Arc<SessionController> {
    Arc::new(SessionController::new(Arc::new(config)))
}

/// Poll `condition` every 20 ms until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
