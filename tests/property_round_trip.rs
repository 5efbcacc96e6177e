//! Randomized round-trip coverage: a small recursive `generate` helper drives repeated
//! encode/decode cycles instead of a handful of fixed fixtures, checking
//! `decode(encode(v)) == v` for every auto_tabular/strict combination.

use rand::Rng;

use btoon::{decode, encode, validate, DecodeOptions, EncodeOptions, Value, ValidateOptions};

fn generate_value<R: Rng>(rng: &mut R, depth: u32) -> Value {
    if depth == 0 {
        return generate_scalar(rng);
    }
    match rng.gen_range(0..7) {
        0..=3 => generate_scalar(rng),
        4 => {
            let len = rng.gen_range(0..4);
            Value::Array((0..len).map(|_| generate_value(rng, depth - 1)).collect())
        }
        5 => {
            let len = rng.gen_range(0..4);
            Value::Map(
                (0..len)
                    .map(|i| (format!("k{i}"), generate_value(rng, depth - 1)))
                    .collect(),
            )
        }
        _ => generate_tabular_array(rng),
    }
}

/// Build a uniform array-of-maps so the auto-tabular pass has something to bite on.
fn generate_tabular_array<R: Rng>(rng: &mut R) -> Value {
    let row_count = rng.gen_range(2..6);
    let columns = ["id", "name", "active"];
    let rows = (0..row_count)
        .map(|i| {
            Value::Map(
                columns
                    .iter()
                    .map(|&col| {
                        let v = match col {
                            "id" => Value::from(i as u32),
                            "active" => Value::Bool(i % 2 == 0),
                            _ => generate_scalar(rng),
                        };
                        (col.to_string(), v)
                    })
                    .collect(),
            )
        })
        .collect();
    Value::Array(rows)
}

fn generate_scalar<R: Rng>(rng: &mut R) -> Value {
    match rng.gen_range(0..8) {
        0 => Value::Nil,
        1 => Value::Bool(rng.gen()),
        2 => Value::from(rng.gen::<i64>()),
        3 => Value::from(rng.gen::<u64>()),
        4 => Value::Float(rng.gen::<f64>()),
        5 => Value::from(format!("s{}", rng.gen::<u32>())),
        6 => Value::Binary((0..rng.gen_range(0..8)).map(|_| rng.gen()).collect()),
        _ => Value::Date(rng.gen::<i64>() % 10_000_000_000_000),
    }
}

#[test]
fn random_values_round_trip_under_every_option_combination() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let value = generate_value(&mut rng, 3);
        for auto_tabular in [true, false] {
            for strict in [true, false] {
                let bytes = encode(&value, &EncodeOptions { auto_tabular }).unwrap();
                let dec_opts = DecodeOptions {
                    strict,
                    ..DecodeOptions::default()
                };
                let back = decode(&bytes, &dec_opts).unwrap();
                assert_eq!(back, value, "round trip mismatch for {value:?}");
            }
        }
    }
}

#[test]
fn random_values_pass_validation_before_decode() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let value = generate_value(&mut rng, 3);
        let bytes = encode(&value, &EncodeOptions::default()).unwrap();
        let result = validate(&bytes, &ValidateOptions::default());
        assert!(result.valid, "validate rejected a well-formed buffer: {:?}", result.error);
        assert!(decode(&bytes, &DecodeOptions::default()).is_ok());
    }
}

#[test]
fn random_byte_garbage_never_panics_the_decoder() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let len = rng.gen_range(0..64);
        let buf: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        // Either outcome is acceptable; the property under test is "doesn't panic, doesn't read
        // past buf.len()", which a panic-free return (Ok or Err) demonstrates.
        let _ = decode(&buf, &DecodeOptions::default());
        let _ = validate(&buf, &ValidateOptions::default());
    }
}
