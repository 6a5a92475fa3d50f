//! Process-wide `tracing` subscriber setup.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "camgray_core=info,camgray_gl=info,camgray_render=info";

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Safe to call from every surface-created event: only the first call does
/// anything. Returns `false` if another subscriber was already installed by
/// the host.
pub fn init(default_filter: &str) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new(default_filter),
        };

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok();

        tracing::debug!(installed, "camgray logging initialised");
        installed
    })
}
