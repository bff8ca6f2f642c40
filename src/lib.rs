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

//! BSON `Decimal128` codec for [`decimal_rs::Decimal`].
//!
//! ## Optional features
//!
//! ### `serde`
//!
//! When this optional dependency is enabled, the `serde` module provides helpers to store
//! `Decimal` fields as `Decimal128` with `#[serde(with = "decimal_rs_bson::serde")]`.
//!
//! ## Usage
//!
//! Register the codec, then encode and decode through the registry:
//!
//! ```
//! use bson::Bson;
//! use decimal_rs::Decimal;
//! use decimal_rs_bson::{register_encode_decoder, BsonReader, BsonWriter, DecodeContext, EncodeContext, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::new();
//! register_encode_decoder(&mut builder);
//! let registry = builder.build();
//!
//! let price: Decimal = "123.45".parse().unwrap();
//! let mut writer = BsonWriter::new();
//! registry.encode(&EncodeContext::default(), &mut writer, &price).unwrap();
//! let bson = writer.into_value().unwrap();
//! assert!(matches!(bson, Bson::Decimal128(_)));
//!
//! let decoded: Decimal = registry.decode(&DecodeContext::default(), &mut BsonReader::new(&bson)).unwrap();
//! assert_eq!(decoded, price);
//! ```
//!
//! Numbers and strings are accepted too, and null decodes as zero:
//!
//! ```
//! use bson::Bson;
//! use decimal_rs::Decimal;
//! use decimal_rs_bson::from_bson;
//!
//! assert_eq!(from_bson(&Bson::Int32(42)).unwrap().to_string(), "42");
//! assert_eq!(from_bson(&Bson::Double(3.14)).unwrap().to_string(), "3.14");
//! assert_eq!(from_bson(&Bson::String("-0.001".to_owned())).unwrap().to_string(), "-0.001");
//! assert_eq!(from_bson(&Bson::Null).unwrap(), Decimal::ZERO);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod buf;
mod codec;
mod error;
mod registry;
mod value;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde;

pub use crate::codec::{
    decode_decimal, encode_decimal, from_bson, from_decimal128, from_raw_bson, register_encode_decoder, to_bson,
    to_decimal128, DECODER_NAME, ENCODER_NAME,
};
pub use crate::error::{Error, Result};
pub use crate::registry::{
    DecodeContext, EncodeContext, Registry, RegistryBuilder, Value, ValueDecoder, ValueEncoder,
};
pub use crate::value::{BsonReader, BsonWriter, RawBsonReader, ValueReader, ValueWriter};
