#![no_main]
use libfuzzer_sys::fuzz_target;
use vistext::codec::FlagSet;
use vistext::engine;
use vistext::stream::VisOptions;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the flags, the third the fold width.
    let bits = u16::from_le_bytes([data[0], data[1]]) as u32;
    let mut flags = FlagSet::from_bits_truncate(bits)
        & !(FlagSet::END
            | FlagSet::NO_SLASH
            | FlagSet::SAFE_ONLY
            | FlagSet::NO_ESCAPE
            | FlagSet::HTTP_1866);
    if flags.contains(FlagSet::HTTP_STYLE | FlagSet::MIME_STYLE) {
        flags.remove(FlagSet::MIME_STYLE);
    }
    let payload = &data[2..];
    let fold_width = match payload.first() {
        Some(&w) if w >= 5 && !flags.contains(FlagSet::MIME_STYLE) => Some(w as usize),
        _ => None,
    };

    let opts = VisOptions {
        flags,
        fold_width,
        ..Default::default()
    };
    let encoded = engine::encode_with_options(payload, &opts).unwrap();
    let decoded = engine::decode(&encoded, flags).unwrap();
    assert_eq!(decoded, payload);
});
