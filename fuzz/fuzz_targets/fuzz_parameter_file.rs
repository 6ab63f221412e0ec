#![no_main]

use libfuzzer_sys::fuzz_target;

use fdbatch_core::params_file::ParameterFile;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let file = ParameterFile::parse(&text);

    // Every listed name resolves, and names are unique.
    assert_eq!(file.names().len(), file.len());
    for name in file.names() {
        assert!(file.get(name).is_some());
    }
    assert_eq!(file.entries().count(), file.len());
});
