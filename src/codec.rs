// Copyright 2021 CoD Technologies Corp.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `Decimal` encoder and decoder.

use crate::buf::{format_canonical, format_f64, Buf};
use crate::error::{Error, Result};
use crate::registry::{DecodeContext, EncodeContext, RegistryBuilder};
use crate::value::{BsonReader, RawBsonReader, ValueReader, ValueWriter};
use bson::spec::ElementType;
use bson::{Bson, Decimal128, RawBsonRef};
use decimal_rs::{Decimal, DecimalConvertError};

/// Name of the `Decimal` encoder in the registry.
pub const ENCODER_NAME: &str = "DecimalEncodeValue";
/// Name of the `Decimal` decoder in the registry.
pub const DECODER_NAME: &str = "DecimalDecodeValue";

/// Registers the `Decimal` encoder and decoder into `builder`.
#[inline]
pub fn register_encode_decoder(builder: &mut RegistryBuilder) {
    builder
        .register_type_encoder::<Decimal, _>(ENCODER_NAME, encode_decimal)
        .register_type_decoder::<Decimal, _>(DECODER_NAME, decode_decimal);
}

/// Writes `value` into `writer` as a BSON `Decimal128`.
///
/// Fails with [`Error::WireDecimal`] when the value has more significant digits than `Decimal128`
/// can hold.
pub fn encode_decimal(_ctx: &EncodeContext, writer: &mut dyn ValueWriter, value: &Decimal) -> Result<()> {
    let d128 = to_decimal128(value)?;
    writer.write_decimal128(d128)
}

/// Converts a float through its shortest round-trip representation, so `3.14` stays `3.14`.
#[inline]
fn decimal_from_f64(value: f64) -> Result<Decimal> {
    if value.is_nan() {
        return Err(DecimalConvertError::Invalid.into());
    }
    if value.is_infinite() {
        return Err(DecimalConvertError::Overflow.into());
    }

    let mut buf = Buf::new();
    let s = format_f64(value, &mut buf)?;
    Ok(s.parse::<Decimal>()?)
}

/// Reads a BSON `Decimal128`, double, int32, int64, string or null from `reader` into `target`.
///
/// Null is decoded as zero. `target` is only assigned when decoding succeeds.
pub fn decode_decimal(_ctx: &DecodeContext, reader: &mut dyn ValueReader, target: &mut Decimal) -> Result<()> {
    let element_type = reader.element_type();
    tracing::trace!(?element_type, "decoding decimal");

    let dec = match element_type {
        ElementType::Decimal128 => {
            let d128 = reader.read_decimal128()?;
            d128.to_string().parse::<Decimal>()?
        }
        ElementType::Double => decimal_from_f64(reader.read_double()?)?,
        ElementType::Int32 => Decimal::from(reader.read_i32()?),
        ElementType::Int64 => Decimal::from(reader.read_i64()?),
        ElementType::String => reader.read_string()?.parse::<Decimal>()?,
        ElementType::Null => {
            reader.read_null()?;
            Decimal::ZERO
        }
        _ => {
            tracing::debug!(?element_type, "unsupported BSON type for decimal");
            return Err(Error::UnsupportedType(element_type));
        }
    };

    *target = dec;
    Ok(())
}

/// Converts a decimal to `Decimal128`.
#[inline]
pub fn to_decimal128(value: &Decimal) -> Result<Decimal128> {
    let mut buf = Buf::new();
    let s = format_canonical(value, &mut buf)?;
    Ok(s.parse::<Decimal128>()?)
}

/// Converts a `Decimal128` to decimal.
#[inline]
pub fn from_decimal128(value: Decimal128) -> Result<Decimal> {
    from_bson(&Bson::Decimal128(value))
}

/// Converts a decimal to a BSON value.
#[inline]
pub fn to_bson(value: &Decimal) -> Result<Bson> {
    to_decimal128(value).map(Bson::Decimal128)
}

/// Converts a BSON value to decimal.
#[inline]
pub fn from_bson(value: &Bson) -> Result<Decimal> {
    let mut dec = Decimal::ZERO;
    decode_decimal(&DecodeContext::default(), &mut BsonReader::new(value), &mut dec)?;
    Ok(dec)
}

/// Converts a raw BSON element to decimal.
#[inline]
pub fn from_raw_bson(value: RawBsonRef) -> Result<Decimal> {
    let mut dec = Decimal::ZERO;
    decode_decimal(&DecodeContext::default(), &mut RawBsonReader::new(value), &mut dec)?;
    Ok(dec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::value::BsonWriter;
    use bson::{doc, RawDocumentBuf};
    use decimal_rs::DecimalParseError;
    use proptest::prelude::*;
    use std::any::TypeId;
    use std::sync::Arc;

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        register_encode_decoder(&mut builder);
        builder.build()
    }

    fn d128(s: &str) -> Decimal128 {
        s.parse().unwrap()
    }

    fn decode(value: &Bson) -> Result<Decimal> {
        registry().decode(&DecodeContext::default(), &mut BsonReader::new(value))
    }

    fn assert_decode(value: Bson, expected: &str) {
        let dec = decode(&value).unwrap();
        assert_eq!(dec.to_string(), expected, "decoding {:?}", value);
    }

    fn assert_round_trip(val: &str) {
        let dec = val.parse::<Decimal>().unwrap();
        let bson = to_bson(&dec).unwrap();
        assert!(matches!(bson, Bson::Decimal128(_)));
        assert_eq!(decode(&bson).unwrap(), dec, "round trip of {}", val);
    }

    struct FailingWriter;

    impl ValueWriter for FailingWriter {
        fn write_decimal128(&mut self, _value: Decimal128) -> Result<()> {
            Err(Error::custom("disk full"))
        }
    }

    /// Reports `element_type` but fails every read.
    struct FailingReader(ElementType);

    impl FailingReader {
        fn fail<T>(&self) -> Result<T> {
            Err(Error::custom(format!("connection reset while reading {:?}", self.0)))
        }
    }

    impl ValueReader for FailingReader {
        fn element_type(&self) -> ElementType {
            self.0
        }

        fn read_decimal128(&mut self) -> Result<Decimal128> {
            self.fail()
        }

        fn read_double(&mut self) -> Result<f64> {
            self.fail()
        }

        fn read_i32(&mut self) -> Result<i32> {
            self.fail()
        }

        fn read_i64(&mut self) -> Result<i64> {
            self.fail()
        }

        fn read_string(&mut self) -> Result<String> {
            self.fail()
        }

        fn read_null(&mut self) -> Result<()> {
            self.fail()
        }
    }

    #[test]
    fn test_encode() {
        let registry = registry();
        let mut writer = BsonWriter::new();
        let dec = "3.14".parse::<Decimal>().unwrap();
        registry.encode(&EncodeContext::default(), &mut writer, &dec).unwrap();
        assert_eq!(writer.into_value(), Some(Bson::Decimal128(d128("3.14"))));

        assert_eq!(to_decimal128(&Decimal::ZERO).unwrap(), d128("0"));
        assert_eq!(to_decimal128(&Decimal::from(-42_i32)).unwrap(), d128("-42"));
        assert_eq!(
            to_decimal128(&"1e-100".parse::<Decimal>().unwrap()).unwrap(),
            d128("1E-100")
        );
        assert_eq!(
            to_decimal128(&"-123456789.987654321".parse::<Decimal>().unwrap()).unwrap(),
            d128("-123456789.987654321")
        );
    }

    #[test]
    fn test_encode_out_of_range() {
        let dec = "12345678901234567890123456789012345678".parse::<Decimal>().unwrap();
        let mut writer = BsonWriter::new();
        let err = encode_decimal(&EncodeContext::default(), &mut writer, &dec).unwrap_err();
        let expected = "12345678901234567890123456789012345678E0"
            .parse::<Decimal128>()
            .unwrap_err();
        match err {
            Error::WireDecimal(e) => assert_eq!(e.to_string(), expected.to_string()),
            e => panic!("unexpected error: {}", e),
        }
        assert_eq!(writer.into_value(), None);

        assert!(matches!(to_bson(&dec), Err(Error::WireDecimal(_))));
    }

    #[test]
    fn test_encode_type_mismatch() {
        let registry = registry();
        let encoder = registry.lookup_encoder(TypeId::of::<Decimal>()).unwrap();

        let mut writer = BsonWriter::new();
        let err = encoder
            .encode_value(&EncodeContext::default(), &mut writer, &42_i32)
            .unwrap_err();
        match err {
            Error::TypeMismatch { name, expected, received } => {
                assert_eq!(name, ENCODER_NAME);
                assert_eq!(expected[0], std::any::type_name::<Decimal>());
                assert_eq!(received, "i32");
            }
            e => panic!("unexpected error: {}", e),
        }
        assert_eq!(writer.into_value(), None);

        let mut writer = BsonWriter::new();
        let boxed = Box::new("42".parse::<Decimal>().unwrap());
        encoder
            .encode_value(&EncodeContext::default(), &mut writer, &boxed)
            .unwrap();
        assert_eq!(writer.into_value(), Some(Bson::Decimal128(d128("42"))));

        // the registry looks encoders up by the static type, so a box needs its own registration
        let mut writer = BsonWriter::new();
        let err = registry
            .encode(&EncodeContext::default(), &mut writer, &boxed)
            .unwrap_err();
        assert!(matches!(err, Error::NoEncoder(_)));
        assert_eq!(writer.into_value(), None);
    }

    #[test]
    fn test_encode_writer_error() {
        let err = encode_decimal(&EncodeContext::default(), &mut FailingWriter, &Decimal::ONE).unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_decode() {
        assert_decode(Bson::Decimal128(d128("3.14")), "3.14");
        assert_decode(Bson::Decimal128(d128("-1.5E+10")), "-15000000000");
        assert_decode(Bson::Decimal128(d128("1E-20")), "0.00000000000000000001");
        assert_decode(Bson::Double(3.14), "3.14");
        assert_decode(Bson::Double(0.1), "0.1");
        assert_decode(Bson::Double(-0.5), "-0.5");
        assert_decode(Bson::Double(1e20), "100000000000000000000");
        assert_decode(Bson::Double(-2.5e-7), "-0.00000025");
        assert_decode(Bson::Double(0.0), "0");
        assert_decode(Bson::Int32(42), "42");
        assert_decode(Bson::Int32(i32::MIN), "-2147483648");
        assert_decode(Bson::Int64(i64::MAX), "9223372036854775807");
        assert_decode(Bson::String("-0.001".to_owned()), "-0.001");
        assert_decode(Bson::String("1.2345e3".to_owned()), "1234.5");
        assert_decode(Bson::Null, "0");
    }

    #[test]
    fn test_decode_reader_error() {
        for &ty in &[
            ElementType::Decimal128,
            ElementType::Double,
            ElementType::Int32,
            ElementType::Int64,
            ElementType::String,
            ElementType::Null,
        ] {
            let mut target = Decimal::ONE;
            let err = decode_decimal(&DecodeContext::default(), &mut FailingReader(ty), &mut target).unwrap_err();
            assert!(matches!(err, Error::Custom(_)), "{:?}: {}", ty, err);
            assert_eq!(err.to_string(), format!("connection reset while reading {:?}", ty));
            assert_eq!(target, Decimal::ONE);
        }
    }

    #[test]
    fn test_decode_null_is_zero() {
        let dec = decode(&Bson::Null).unwrap();
        assert!(dec.is_zero());
        assert_eq!(dec.into_parts(), (0, 0, false));

        let mut target = Decimal::ONE;
        decode_decimal(&DecodeContext::default(), &mut BsonReader::new(&Bson::Null), &mut target).unwrap();
        assert_eq!(target, Decimal::ZERO);
    }

    #[test]
    fn test_decode_unsupported() {
        fn assert_unsupported(value: Bson, expected: ElementType) {
            let mut target = Decimal::ONE;
            let err = decode_decimal(&DecodeContext::default(), &mut BsonReader::new(&value), &mut target).unwrap_err();
            match err {
                Error::UnsupportedType(ty) => assert_eq!(ty, expected),
                e => panic!("unexpected error: {}", e),
            }
            assert_eq!(target, Decimal::ONE);
        }

        assert_unsupported(Bson::Boolean(true), ElementType::Boolean);
        assert_unsupported(Bson::Document(doc! { "a": 1 }), ElementType::EmbeddedDocument);
        assert_unsupported(Bson::Array(vec![]), ElementType::Array);
        assert_unsupported(Bson::Undefined, ElementType::Undefined);
    }

    #[test]
    fn test_decode_malformed() {
        let mut target = Decimal::ONE;
        let value = Bson::String("not-a-number".to_owned());
        let err = decode_decimal(&DecodeContext::default(), &mut BsonReader::new(&value), &mut target).unwrap_err();
        assert!(matches!(err, Error::DecimalParse(DecimalParseError::Invalid)));
        assert_eq!(target, Decimal::ONE);

        let value = Bson::String(String::new());
        let err = decode_decimal(&DecodeContext::default(), &mut BsonReader::new(&value), &mut target).unwrap_err();
        assert!(matches!(err, Error::DecimalParse(DecimalParseError::Empty)));

        let err = from_bson(&Bson::Decimal128(d128("NaN"))).unwrap_err();
        assert!(matches!(err, Error::DecimalParse(_)));

        let err = from_bson(&Bson::Double(f64::NAN)).unwrap_err();
        assert!(matches!(err, Error::DecimalConvert(DecimalConvertError::Invalid)));
        let err = from_bson(&Bson::Double(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, Error::DecimalConvert(DecimalConvertError::Overflow)));

        // beyond the decimal scale range
        let err = from_bson(&Bson::Decimal128(d128("1E+200"))).unwrap_err();
        assert!(matches!(err, Error::DecimalParse(_)));
        assert_eq!(target, Decimal::ONE);
    }

    #[test]
    fn test_decode_raw() {
        let doc = doc! {
            "price": d128("99.95"),
            "qty": 7_i32,
            "name": "widget",
        };
        let raw = RawDocumentBuf::from_document(&doc).unwrap();

        let price = from_raw_bson(raw.get("price").unwrap().unwrap()).unwrap();
        assert_eq!(price.to_string(), "99.95");
        let qty = from_raw_bson(raw.get("qty").unwrap().unwrap()).unwrap();
        assert_eq!(qty, Decimal::from(7_i32));
        let err = from_raw_bson(raw.get("name").unwrap().unwrap()).unwrap_err();
        assert!(matches!(err, Error::DecimalParse(_)));
    }

    #[test]
    fn test_round_trip() {
        assert_round_trip("0");
        assert_round_trip("1");
        assert_round_trip("-1");
        assert_round_trip("3.14");
        assert_round_trip("-0.001");
        assert_round_trip("123456789.987654321");
        assert_round_trip("1e100");
        assert_round_trip("-1.5e-120");
        assert_round_trip("9999999999999999999999999999999999");
        assert_round_trip("0.0000000000000000000000000000000001");

        let dec = from_decimal128(to_decimal128(&Decimal::from(i64::MIN)).unwrap()).unwrap();
        assert_eq!(dec, Decimal::from(i64::MIN));
    }

    #[test]
    fn test_concurrent_use() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for n in 0..100_i64 {
                        let dec = Decimal::from(i * 1000 + n);
                        let mut writer = BsonWriter::new();
                        registry.encode(&EncodeContext::default(), &mut writer, &dec).unwrap();
                        let bson = writer.into_value().unwrap();
                        let back: Decimal = registry
                            .decode(&DecodeContext::default(), &mut BsonReader::new(&bson))
                            .unwrap();
                        assert_eq!(back, dec);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(int_val in 0u128..10u128.pow(34), scale in -90i16..=90, negative in any::<bool>()) {
            let dec = Decimal::from_parts(int_val, scale, negative).unwrap();
            let bson = to_bson(&dec).unwrap();
            prop_assert_eq!(from_bson(&bson).unwrap(), dec);
        }

        #[test]
        fn prop_excess_precision_fails(int_val in 10u128.pow(37)..10u128.pow(38), scale in -10i16..=10) {
            // trailing zeros can be dropped without loss
            prop_assume!(int_val % 10 != 0);
            let dec = Decimal::from_parts(int_val, scale, false).unwrap();
            prop_assert!(matches!(to_bson(&dec), Err(Error::WireDecimal(_))));
        }
    }
}
