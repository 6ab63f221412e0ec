//! Shell scripts standing in for the external tools in unit tests.

use std::path::{Path, PathBuf};

use fdbatch_tests::write_script;

/// Fitting tool double.
///
/// Reads the `load`/`save` lines of its control file and reacts to the
/// dataset file name: `fail*` prints an error marker, `missing*` writes
/// nothing, `slow*` sleeps, `swap*` writes its parameters in reverse order.
/// Anything else gets `a = 1.00`, `v = 1.20`.
pub(crate) fn fake_fit(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-fast-dm",
        r#"cfg="$1"
load=$(sed -n 's/^load "\(.*\)"$/\1/p' "$cfg")
save=$(sed -n 's/^save "\(.*\)"$/\1/p' "$cfg")
base=$(basename "$load")
case "$base" in
  fail*) echo "Not enough data in $base"; exit 0 ;;
  missing*) echo "finished"; exit 0 ;;
  slow*) exec sleep 30 ;;
  swap*) printf 'v = 2.20\na = 2.00\n' > "$save"; echo "finished"; exit 0 ;;
esac
printf 'a = 1.00\nv = 1.20\n' > "$save"
echo "finished"
"#,
    )
    .unwrap()
}

/// Curve-prediction tool double: writes a three-point curve to the `-o` path
/// and echoes its other arguments.
pub(crate) fn fake_plot_cdf(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-plot-cdf",
        r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift 2; else echo "arg $1"; shift; fi
done
printf '%s\n' '-1.0 0.1' '0.5 0.6' '1.5 1.0' > "$out"
"#,
    )
    .unwrap()
}

/// Write a dataset with a `RESPONSE TIME` header.
pub(crate) fn write_dataset(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "# RESPONSE TIME\n1 0.5\n0 0.7\n1 0.9\n0 0.4\n1 0.6\n").unwrap();
    path
}
