//! Shared fixtures for the workspace-level integration tests.
//!
//! The fitting and curve-prediction tools are replaced by small `/bin/sh`
//! scripts that honor the same command-line contract.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Fitting tool double that writes `a`, `zr`, `v`, `t0` and `fit`.
///
/// The estimates depend on the dataset name so rows can be told apart:
/// `sN.dat` gets `a = N.00`. Datasets named `late*` list their values in
/// reverse order.
#[cfg(unix)]
pub fn fake_fit(dir: &Path) -> io::Result<PathBuf> {
    write_script(
        dir,
        "fast-dm",
        r#"load=$(sed -n 's/^load "\(.*\)"$/\1/p' "$1")
save=$(sed -n 's/^save "\(.*\)"$/\1/p' "$1")
base=$(basename "$load" .dat)
n=$(echo "$base" | tr -cd '0-9')
case "$base" in
  late*) printf 'fit = 0.90\nt0 = 0.30\nv = 1.50\nzr = 0.50\na = %s.00\n' "$n" > "$save" ;;
  *) printf 'a = %s.00\nzr = 0.50\nv = 1.50\nt0 = 0.30\nfit = 0.90\n' "$n" > "$save" ;;
esac
echo "Processing $base"
"#,
    )
}

/// Curve-prediction tool double writing a two-point curve to `-o`.
#[cfg(unix)]
pub fn fake_plot_cdf(dir: &Path) -> io::Result<PathBuf> {
    write_script(
        dir,
        "plot-cdf",
        r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift 2; else shift; fi
done
printf '%s\n' '-0.4 0.3' '0.6 0.9' > "$out"
"#,
    )
}

/// Write a dataset with columns `RESPONSE TIME`.
pub fn write_dataset(dir: &Path, name: &str, rows: &[(u8, f64)]) -> io::Result<PathBuf> {
    let mut content = String::from("# RESPONSE TIME\n");
    for (response, time) in rows {
        let _ = writeln!(content, "{response} {time:?}");
    }
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}
