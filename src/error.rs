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

//! Codec error definitions.

use bson::decimal128::ParseError;
use bson::spec::ElementType;
use decimal_rs::{DecimalConvertError, DecimalParseError};
use thiserror::Error;

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error which can be returned when encoding or decoding a value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The registered handler received a value of another type.
    #[error("{name} can only process {}, but got {received}", .expected.join(", "))]
    TypeMismatch {
        /// Name of the handler that rejected the value.
        name: &'static str,
        /// Type names the handler accepts.
        expected: Vec<&'static str>,
        /// Type name of the value actually received.
        received: &'static str,
    },
    /// No encoder is registered for the type.
    #[error("no encoder found for {0}")]
    NoEncoder(&'static str),
    /// No decoder is registered for the type.
    #[error("no decoder found for {0}")]
    NoDecoder(&'static str),
    /// The wire value has a BSON type with no conversion into a decimal.
    #[error("received invalid BSON type to decode into decimal_rs::Decimal: {0:?}")]
    UnsupportedType(ElementType),
    /// The decimal string cannot be represented as a `Decimal128`.
    #[error(transparent)]
    WireDecimal(#[from] ParseError),
    /// A number could not be formatted into the stack buffer.
    #[error(transparent)]
    Format(#[from] std::fmt::Error),
    /// The decimal string cannot be parsed as a `Decimal`.
    #[error("{0}")]
    DecimalParse(DecimalParseError),
    /// The number cannot be converted to a `Decimal`.
    #[error("{0}")]
    DecimalConvert(DecimalConvertError),
    /// A value was read as a type other than the one the source holds.
    #[error("expected BSON type {expected:?}, but the value is {actual:?}")]
    UnexpectedType {
        /// The type the read operation asked for.
        expected: ElementType,
        /// The type of the value in the source.
        actual: ElementType,
    },
    /// The value source has already been read.
    #[error("value has already been consumed")]
    ValueConsumed,
    /// The value sink has already been written.
    #[error("value has already been written")]
    ValueAlreadyWritten,
    /// An error raised by a third-party value source or sink.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary error raised by a value source or sink.
    #[inline]
    pub fn custom<E>(e: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Custom(e.into())
    }
}

impl From<DecimalParseError> for Error {
    #[inline]
    fn from(e: DecimalParseError) -> Self {
        Error::DecimalParse(e)
    }
}

impl From<DecimalConvertError> for Error {
    #[inline]
    fn from(e: DecimalConvertError) -> Self {
        Error::DecimalConvert(e)
    }
}
