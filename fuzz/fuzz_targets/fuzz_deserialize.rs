#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either load into a consistent dictionary or be
    // rejected as corrupt; never panic.
    if let Ok(dict) = tridex::TrieDict::deserialize(data) {
        let probe = tridex::encode_str("abc");
        let _ = dict.lookup(&probe);
        let _ = dict.prefix_search(&probe).count();
        if dict.has_suffix_links() {
            let _ = dict.find_iter(&probe).map(|hits| hits.count());
        }
    }
});
