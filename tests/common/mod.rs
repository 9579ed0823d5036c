//! Shared scaffolding: scripted stand-ins for the GDB subprocess.
//!
//! Each test gets its own scratch directory holding a small shell script that
//! speaks just enough of the debugger's line protocol (prompt after every
//! command) to drive the session and control loop deterministically.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gambit-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn fake_gdb(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-gdb.sh");
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
