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

//! Single value sources and sinks.

use crate::error::{Error, Result};
use bson::spec::ElementType;
use bson::{Bson, Decimal128, RawBsonRef};

/// A source of exactly one BSON value.
///
/// `element_type` reports the type of the pending value, the `read_*` methods consume it.
pub trait ValueReader {
    /// Returns the BSON type of the value.
    fn element_type(&self) -> ElementType;

    /// Reads a `Decimal128` value.
    fn read_decimal128(&mut self) -> Result<Decimal128>;

    /// Reads a double value.
    fn read_double(&mut self) -> Result<f64>;

    /// Reads an int32 value.
    fn read_i32(&mut self) -> Result<i32>;

    /// Reads an int64 value.
    fn read_i64(&mut self) -> Result<i64>;

    /// Reads a string value.
    fn read_string(&mut self) -> Result<String>;

    /// Consumes a null value.
    fn read_null(&mut self) -> Result<()>;
}

/// A sink for exactly one BSON value.
pub trait ValueWriter {
    /// Writes a `Decimal128` value.
    fn write_decimal128(&mut self, value: Decimal128) -> Result<()>;
}

macro_rules! read_as {
    ($self: ident, $expected: expr, $pat: pat => $val: expr) => {{
        let value = $self.value.ok_or(Error::ValueConsumed)?;
        match value {
            $pat => {
                $self.value = None;
                Ok($val)
            }
            _ => Err(Error::UnexpectedType {
                expected: $expected,
                actual: $self.element_type,
            }),
        }
    }};
}

/// Reads a value out of a `Bson`.
#[derive(Debug, Clone)]
pub struct BsonReader<'a> {
    value: Option<&'a Bson>,
    element_type: ElementType,
}

impl<'a> BsonReader<'a> {
    #[inline]
    pub fn new(value: &'a Bson) -> Self {
        BsonReader {
            value: Some(value),
            element_type: value.element_type(),
        }
    }
}

impl ValueReader for BsonReader<'_> {
    #[inline]
    fn element_type(&self) -> ElementType {
        self.element_type
    }

    #[inline]
    fn read_decimal128(&mut self) -> Result<Decimal128> {
        read_as!(self, ElementType::Decimal128, Bson::Decimal128(d) => *d)
    }

    #[inline]
    fn read_double(&mut self) -> Result<f64> {
        read_as!(self, ElementType::Double, Bson::Double(f) => *f)
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32> {
        read_as!(self, ElementType::Int32, Bson::Int32(i) => *i)
    }

    #[inline]
    fn read_i64(&mut self) -> Result<i64> {
        read_as!(self, ElementType::Int64, Bson::Int64(i) => *i)
    }

    #[inline]
    fn read_string(&mut self) -> Result<String> {
        read_as!(self, ElementType::String, Bson::String(s) => s.clone())
    }

    #[inline]
    fn read_null(&mut self) -> Result<()> {
        read_as!(self, ElementType::Null, Bson::Null => ())
    }
}

/// Reads a value borrowed from a raw BSON document.
#[derive(Debug, Clone)]
pub struct RawBsonReader<'a> {
    value: Option<RawBsonRef<'a>>,
    element_type: ElementType,
}

impl<'a> RawBsonReader<'a> {
    #[inline]
    pub fn new(value: RawBsonRef<'a>) -> Self {
        RawBsonReader {
            element_type: value.element_type(),
            value: Some(value),
        }
    }
}

impl ValueReader for RawBsonReader<'_> {
    #[inline]
    fn element_type(&self) -> ElementType {
        self.element_type
    }

    #[inline]
    fn read_decimal128(&mut self) -> Result<Decimal128> {
        read_as!(self, ElementType::Decimal128, RawBsonRef::Decimal128(d) => d)
    }

    #[inline]
    fn read_double(&mut self) -> Result<f64> {
        read_as!(self, ElementType::Double, RawBsonRef::Double(f) => f)
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32> {
        read_as!(self, ElementType::Int32, RawBsonRef::Int32(i) => i)
    }

    #[inline]
    fn read_i64(&mut self) -> Result<i64> {
        read_as!(self, ElementType::Int64, RawBsonRef::Int64(i) => i)
    }

    #[inline]
    fn read_string(&mut self) -> Result<String> {
        read_as!(self, ElementType::String, RawBsonRef::String(s) => s.to_owned())
    }

    #[inline]
    fn read_null(&mut self) -> Result<()> {
        read_as!(self, ElementType::Null, RawBsonRef::Null => ())
    }
}

/// Collects a written value as a `Bson`.
#[derive(Debug, Clone, Default)]
pub struct BsonWriter {
    value: Option<Bson>,
}

impl BsonWriter {
    #[inline]
    pub const fn new() -> Self {
        BsonWriter { value: None }
    }

    /// Returns the written value, if any.
    #[inline]
    pub fn into_value(self) -> Option<Bson> {
        self.value
    }

    #[inline]
    fn put(&mut self, value: Bson) -> Result<()> {
        if self.value.is_some() {
            return Err(Error::ValueAlreadyWritten);
        }
        self.value = Some(value);
        Ok(())
    }
}

impl ValueWriter for BsonWriter {
    #[inline]
    fn write_decimal128(&mut self, value: Decimal128) -> Result<()> {
        self.put(Bson::Decimal128(value))
    }
}
