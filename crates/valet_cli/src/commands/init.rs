//! Init command implementation

use std::io::Write;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use tracing::info;
use valet_core::CONFIG_FILES;

/// Starter configuration written by `valet init`.
pub const DEFAULT_CONFIG: &str = r#"{
  "$schema": "https://raw.githubusercontent.com/simorgh3196/valet/main/schemas/v1/config.json",
  // "cli" spawns Vale for every check; "server" posts to a running Vale server.
  "type": "cli",
  "cli": {
    // "valePath": "/usr/local/bin/vale",
    // "configPath": ".vale.ini",
    "managed": false
  },
  "server": {
    "url": "http://localhost:7777"
  },
  "debounceDelay": 1000,
  "autoCheck": true,
  "inlineDecorations": true
}
"#;

pub fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILES[0]);
    write_config(&config_path, force)?;
    println!("Created {}", config_path.display());
    Ok(())
}

/// Creates `path` without following symlinks.
fn write_config(path: &Path, force: bool) -> Result<()> {
    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(path) {
            Ok(mut file) => {
                file.write_all(DEFAULT_CONFIG.as_bytes()).into_diagnostic()?;
                info!("Created {}", path.display());
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "Config file already exists. Use --force to overwrite."
                    ));
                }

                match std::fs::remove_file(path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_diagnostic(),
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }
}
