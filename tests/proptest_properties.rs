use proptest::prelude::*;
use vistext::codec::{Decoded, Decoder, FlagSet, State, Step};
use vistext::engine;
use vistext::stream::{UnvisOptions, VisEncoder, VisOptions};

fn encode(input: &[u8], flags: FlagSet, fold_width: Option<usize>) -> Vec<u8> {
    engine::encode_with_options(
        input,
        &VisOptions {
            flags,
            fold_width,
            ..Default::default()
        },
    )
    .unwrap()
}

fn base_flags() -> impl Strategy<Value = FlagSet> {
    prop::sample::select(vec![
        FlagSet::empty(),
        FlagSet::OCTAL,
        FlagSet::C_STYLE,
        FlagSet::OCTAL | FlagSet::C_STYLE,
    ])
}

fn class_flags() -> impl Strategy<Value = FlagSet> {
    (0u32..64).prop_map(|bits| {
        let mut flags = FlagSet::empty();
        for (i, flag) in [
            FlagSet::SPACE,
            FlagSet::TAB,
            FlagSet::NEWLINE,
            FlagSet::GLOB,
            FlagSet::SHELL,
            FlagSet::NO_LOCALE,
        ]
        .into_iter()
        .enumerate()
        {
            if bits & (1 << i) != 0 {
                flags |= flag;
            }
        }
        flags
    })
}

/// Bytes that exercise every decoder state.
fn escape_heavy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop::sample::select(b"\\01234567789xM^-?&#;ampltgfrc%=ABCDEFabcdefns\n\r$ ".to_vec()),
        0..256,
    )
}

fn decoder_flags() -> impl Strategy<Value = FlagSet> {
    prop::sample::select(vec![
        FlagSet::empty(),
        FlagSet::HTTP_STYLE,
        FlagSet::MIME_STYLE,
        FlagSet::HTTP_1866,
        FlagSet::HTTP_STYLE | FlagSet::HTTP_1866,
        FlagSet::NO_ESCAPE | FlagSet::HTTP_1866 | FlagSet::NO_LOCALE,
    ])
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(
        input in proptest::collection::vec(any::<u8>(), 0..2048),
        base in base_flags(),
        class in class_flags(),
    ) {
        let flags = base | class;
        let encoded = encode(&input, flags, None);
        let decoded = engine::decode(&encoded, flags).unwrap();
        prop_assert_eq!(decoded, input);
    }

    #[test]
    fn prop_folded_roundtrip(
        input in proptest::collection::vec(any::<u8>(), 0..2048),
        base in base_flags(),
        class in class_flags(),
        width in 5usize..120,
    ) {
        let flags = base | class;
        let encoded = encode(&input, flags, Some(width));
        let decoded = engine::decode(&encoded, flags).unwrap();
        prop_assert_eq!(decoded, input);
    }

    #[test]
    fn prop_http_and_mime_roundtrip(
        input in proptest::collection::vec(any::<u8>(), 0..1024),
        mime in any::<bool>(),
    ) {
        let flags = if mime { FlagSet::MIME_STYLE } else { FlagSet::HTTP_STYLE };
        let encoded = encode(&input, flags, None);
        let decoded = engine::decode(&encoded, flags).unwrap();
        prop_assert_eq!(decoded, input);
    }

    #[test]
    fn prop_printable_passes_through(
        input in "[ -\\[\\]-~\t\néß€漢]{0,200}",
        base in base_flags(),
    ) {
        let encoded = encode(input.as_bytes(), base, None);
        prop_assert_eq!(&encoded, input.as_bytes());
        let twice = encode(&encoded, base, None);
        prop_assert_eq!(twice, encoded);
    }

    #[test]
    fn prop_fold_invariant(
        input in proptest::collection::vec(any::<u8>(), 1..2048),
        base in base_flags(),
        width in 5usize..120,
    ) {
        // Opaque bytes and escaped whitespace: one output byte per column,
        // and the only newlines are fold breaks.
        let flags = base | FlagSet::WHITE | FlagSet::NO_LOCALE;
        let unfolded = encode(&input, flags, None);
        let folded = encode(&input, flags, Some(width));

        let lines: Vec<&[u8]> = folded.split(|&b| b == b'\n').collect();
        prop_assert_eq!(lines.last().copied(), Some(&b""[..]));
        let mut rejoined = Vec::new();
        for line in &lines[..lines.len() - 1] {
            prop_assert!(line.len() <= width, "line {:?} exceeds {}", line, width);
            prop_assert_eq!(line.last(), Some(&b'\\'));
            rejoined.extend_from_slice(&line[..line.len() - 1]);
        }
        prop_assert_eq!(rejoined, unfolded);
    }

    #[test]
    fn prop_fold_with_raw_tabs(
        input in proptest::collection::vec(
            prop_oneof![Just(b'\t'), Just(b'a'), Just(0x01u8), Just(b' ')],
            1..512,
        ),
        width in 6usize..24,
    ) {
        // Tabs pass through; everything else is one column per byte.
        let flags = FlagSet::SPACE | FlagSet::NEWLINE | FlagSet::NO_LOCALE;
        let folded = encode(&input, flags, Some(width));
        let lines: Vec<&[u8]> = folded.split(|&b| b == b'\n').collect();
        for line in &lines[..lines.len() - 1] {
            prop_assert_eq!(line.last(), Some(&b'\\'));
            let content = &line[..line.len() - 1];
            let mut col = 0;
            for &b in content {
                col = if b == b'\t' { (col + 8) & !7 } else { col + 1 };
            }
            // Only a lone tab may overrun the line.
            prop_assert!(
                col <= width - 2 || content == b"\t",
                "line {:?} overruns width {}", content, width
            );
        }
        prop_assert_eq!(engine::decode(&folded, flags).unwrap(), input);
    }

    #[test]
    fn prop_chunking_is_transparent(
        input in proptest::collection::vec(any::<u8>(), 0..1024),
        base in base_flags(),
        chunk in 1usize..16,
    ) {
        let opts = VisOptions { flags: base, ..Default::default() };
        let whole = engine::encode_with_options(&input, &opts).unwrap();
        let mut enc = VisEncoder::new(Vec::new(), &opts).unwrap();
        for part in input.chunks(chunk) {
            enc.write_input(part).unwrap();
        }
        let (chunked, stats) = enc.finish().unwrap();
        prop_assert_eq!(stats.bytes_in, input.len() as u64);
        prop_assert_eq!(chunked, whole);
    }

    #[test]
    fn prop_pushback_never_repeats(
        input in escape_heavy(),
        flags in decoder_flags(),
    ) {
        let mut dec = Decoder::new(flags).unwrap();
        for &c in &input {
            if let Step::ValidPush(_) = dec.step(c) {
                prop_assert_eq!(dec.state(), &State::Ground);
                let replay = dec.step(c);
                prop_assert!(!matches!(replay, Step::ValidPush(_)));
            }
        }
    }

    #[test]
    fn prop_end_flush_is_complete(
        input in escape_heavy(),
        flags in decoder_flags(),
    ) {
        let mut dec = Decoder::new(flags).unwrap();
        for &c in &input {
            if let Step::ValidPush(_) = dec.step(c) {
                dec.step(c);
            }
        }
        let before = dec.state().clone();
        let last = dec.finish();
        let expected = match &before {
            State::Octal2 { acc } | State::Octal3 { acc } | State::Hex2 { acc } => {
                Step::Valid(Decoded::Byte(*acc))
            }
            State::Ground => Step::NoChar,
            _ => Step::SynBad,
        };
        prop_assert_eq!(last, expected, "flush from {:?}", before);
        prop_assert_eq!(dec.state(), &State::Ground);
        prop_assert_eq!(dec.finish(), Step::NoChar);
    }

    #[test]
    fn prop_lenient_decode_accepts_anything(
        input in proptest::collection::vec(any::<u8>(), 0..1024),
        flags in decoder_flags(),
    ) {
        let opts = UnvisOptions { flags, strict: false };
        prop_assert!(engine::decode_with_options(&input, opts).is_ok());
    }
}
