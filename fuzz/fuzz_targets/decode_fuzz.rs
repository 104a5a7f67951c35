#![no_main]
use libfuzzer_sys::fuzz_target;
use vistext::codec::{Decoder, FlagSet, State, Step};
use vistext::engine;
use vistext::stream::UnvisOptions;

const DECODER_FLAGS: [FlagSet; 5] = [
    FlagSet::empty(),
    FlagSet::HTTP_STYLE,
    FlagSet::MIME_STYLE,
    FlagSet::HTTP_1866,
    FlagSet::NO_ESCAPE.union(FlagSet::HTTP_1866),
];

fuzz_target!(|data: &[u8]| {
    let Some((&sel, input)) = data.split_first() else {
        return;
    };
    let flags = DECODER_FLAGS[sel as usize % DECODER_FLAGS.len()];

    // Lenient decoding accepts any input; strict decoding only errors.
    let lenient = engine::decode_with_options(
        input,
        UnvisOptions {
            flags,
            strict: false,
        },
    );
    assert!(lenient.is_ok());
    let _ = engine::decode(input, flags);

    // A pushed-back byte never asks to be pushed back again.
    let mut dec = Decoder::new(flags).unwrap();
    for &c in input {
        if let Step::ValidPush(_) = dec.step(c) {
            assert!(!matches!(dec.step(c), Step::ValidPush(_)));
        }
    }
    dec.finish();
    assert_eq!(dec.state(), &State::Ground);
});
