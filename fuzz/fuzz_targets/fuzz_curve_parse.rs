#![no_main]

use libfuzzer_sys::fuzz_target;

use fdbatch_core::ecdf::{parse_curve, CdfRecord, EmpiricalCdf};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok((xs, ys)) = parse_curve(&text) else {
        return;
    };
    assert_eq!(xs.len(), ys.len());

    // Reuse the parsed x values as a sample; merging must never panic.
    let empirical = EmpiricalCdf::new(&xs).with_finite_left_edge();
    let record = CdfRecord::new(empirical, (xs, ys));
    let table = record.to_table();
    assert_eq!(table.lines().count(), record.rows() + 1);
});
