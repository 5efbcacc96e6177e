use btoon::{decode, encode, DecodeOptions, EncodeOptions, Value};

fn sample_value() -> Value {
    Value::Map(vec![
        ("id".into(), Value::from(42u32)),
        ("name".into(), Value::from("Hello, Unified BTOON!")),
        ("active".into(), Value::Bool(true)),
        ("ratio".into(), Value::Float(0.5)),
        (
            "tags".into(),
            Value::Array(vec![Value::from("a"), Value::from("b"), Value::Nil]),
        ),
        ("created".into(), Value::Date(1_700_000_000_000)),
        (
            "big".into(),
            Value::BigInt(vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
        ),
    ])
}

#[test]
fn decode_of_encode_is_identity_for_every_strict_and_tabular_combination() {
    let value = sample_value();
    for auto_tabular in [true, false] {
        for strict in [true, false] {
            let enc_opts = EncodeOptions { auto_tabular };
            let dec_opts = DecodeOptions {
                strict,
                ..DecodeOptions::default()
            };
            let bytes = encode(&value, &enc_opts).unwrap();
            let back = decode(&bytes, &dec_opts).unwrap();
            assert_eq!(back, value);
        }
    }
}

#[test]
fn nil_encodes_as_single_c0_byte() {
    assert_eq!(encode(&Value::Nil, &EncodeOptions::default()).unwrap(), vec![0xc0]);
    assert_eq!(decode(&[0xc0], &DecodeOptions::default()).unwrap(), Value::Nil);
}

#[test]
fn date_round_trips_through_the_extension() {
    let value = Value::Date(-12345);
    let bytes = encode(&value, &EncodeOptions::default()).unwrap();
    assert_eq!(decode(&bytes, &DecodeOptions::default()).unwrap(), value);
}

#[test]
fn bigint_round_trips_through_the_extension() {
    let value = Value::BigInt(vec![0xff, 0x00, 0x7f]);
    let bytes = encode(&value, &EncodeOptions::default()).unwrap();
    assert_eq!(decode(&bytes, &DecodeOptions::default()).unwrap(), value);
}

#[test]
fn unknown_extension_type_passes_through_opaque() {
    let value = Value::Extension(42, vec![1, 2, 3]);
    let bytes = encode(&value, &EncodeOptions::default()).unwrap();
    assert_eq!(decode(&bytes, &DecodeOptions::default()).unwrap(), value);
}

#[test]
fn lenient_decode_replaces_invalid_utf8_instead_of_erroring() {
    // fixstr of length 1 containing an invalid UTF-8 lead byte.
    let buf = [0xa1, 0xff];
    assert!(decode(&buf, &DecodeOptions::default()).is_err());

    let lenient = DecodeOptions {
        strict: false,
        ..DecodeOptions::default()
    };
    assert!(decode(&buf, &lenient).is_ok());
}
