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

//! Type-keyed encoder and decoder registry.

use crate::error::{Error, Result};
use crate::value::{ValueReader, ValueWriter};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Context passed to every encoder.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct EncodeContext {}

/// Context passed to every decoder.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct DecodeContext {}

/// A value whose concrete type is only known at runtime.
pub trait Value: Any {
    /// Returns the name of the concrete type.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> Value for T {
    #[inline]
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Encodes a type-erased value into a sink.
pub trait ValueEncoder: Send + Sync {
    fn encode_value(&self, ctx: &EncodeContext, writer: &mut dyn ValueWriter, value: &dyn Value) -> Result<()>;
}

/// Decodes a value from a source into a type-erased target.
pub trait ValueDecoder: Send + Sync {
    fn decode_value(&self, ctx: &DecodeContext, reader: &mut dyn ValueReader, target: &mut dyn Value) -> Result<()>;
}

/// Checks the runtime type of the value, then hands it to a typed encoder.
///
/// Both `T` and `Box<T>` are accepted when the encoder is called through
/// [`Registry::lookup_encoder`].
struct TypedEncoder<T, F> {
    name: &'static str,
    f: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> ValueEncoder for TypedEncoder<T, F>
where
    T: Any,
    F: Fn(&EncodeContext, &mut dyn ValueWriter, &T) -> Result<()> + Send + Sync,
{
    #[inline]
    fn encode_value(&self, ctx: &EncodeContext, writer: &mut dyn ValueWriter, value: &dyn Value) -> Result<()> {
        let any = value.as_any();
        let typed = match any.downcast_ref::<T>() {
            Some(v) => v,
            None => match any.downcast_ref::<Box<T>>() {
                Some(v) => &**v,
                None => {
                    return Err(Error::TypeMismatch {
                        name: self.name,
                        expected: vec![type_name::<T>(), type_name::<Box<T>>()],
                        received: Value::type_name(value),
                    })
                }
            },
        };
        (self.f)(ctx, writer, typed)
    }
}

/// Checks the runtime type of the target, then hands it to a typed decoder.
struct TypedDecoder<T, F> {
    name: &'static str,
    f: F,
    _marker: PhantomData<fn(&mut T)>,
}

impl<T, F> ValueDecoder for TypedDecoder<T, F>
where
    T: Any,
    F: Fn(&DecodeContext, &mut dyn ValueReader, &mut T) -> Result<()> + Send + Sync,
{
    #[inline]
    fn decode_value(&self, ctx: &DecodeContext, reader: &mut dyn ValueReader, target: &mut dyn Value) -> Result<()> {
        let received = Value::type_name(&*target);
        match target.as_any_mut().downcast_mut::<T>() {
            Some(typed) => (self.f)(ctx, reader, typed),
            None => Err(Error::TypeMismatch {
                name: self.name,
                expected: vec![type_name::<T>()],
                received,
            }),
        }
    }
}

/// Builds a [`Registry`].
///
/// Registering a second handler for the same type replaces the first one.
#[derive(Default, Clone)]
pub struct RegistryBuilder {
    encoders: HashMap<TypeId, Arc<dyn ValueEncoder>>,
    decoders: HashMap<TypeId, Arc<dyn ValueDecoder>>,
}

impl RegistryBuilder {
    #[inline]
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Registers an encoder for the exact type `T`.
    pub fn register_type_encoder<T, F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        T: Any,
        F: Fn(&EncodeContext, &mut dyn ValueWriter, &T) -> Result<()> + Send + Sync + 'static,
    {
        let encoder = TypedEncoder {
            name,
            f,
            _marker: PhantomData,
        };
        if self.encoders.insert(TypeId::of::<T>(), Arc::new(encoder)).is_some() {
            tracing::debug!(type_name = type_name::<T>(), handler = name, "replaced type encoder");
        } else {
            tracing::debug!(type_name = type_name::<T>(), handler = name, "registered type encoder");
        }
        self
    }

    /// Registers a decoder for the exact type `T`.
    pub fn register_type_decoder<T, F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        T: Any,
        F: Fn(&DecodeContext, &mut dyn ValueReader, &mut T) -> Result<()> + Send + Sync + 'static,
    {
        let decoder = TypedDecoder {
            name,
            f,
            _marker: PhantomData,
        };
        if self.decoders.insert(TypeId::of::<T>(), Arc::new(decoder)).is_some() {
            tracing::debug!(type_name = type_name::<T>(), handler = name, "replaced type decoder");
        } else {
            tracing::debug!(type_name = type_name::<T>(), handler = name, "registered type decoder");
        }
        self
    }

    #[inline]
    pub fn build(&self) -> Registry {
        Registry {
            encoders: self.encoders.clone(),
            decoders: self.decoders.clone(),
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("encoders", &self.encoders.len())
            .field("decoders", &self.decoders.len())
            .finish()
    }
}

/// An immutable set of encoders and decoders keyed by type.
#[derive(Clone)]
pub struct Registry {
    encoders: HashMap<TypeId, Arc<dyn ValueEncoder>>,
    decoders: HashMap<TypeId, Arc<dyn ValueDecoder>>,
}

impl Registry {
    #[inline]
    pub fn lookup_encoder(&self, ty: TypeId) -> Option<&dyn ValueEncoder> {
        self.encoders.get(&ty).map(|e| &**e)
    }

    #[inline]
    pub fn lookup_decoder(&self, ty: TypeId) -> Option<&dyn ValueDecoder> {
        self.decoders.get(&ty).map(|d| &**d)
    }

    /// Encodes `value` with the encoder registered for `T`.
    ///
    /// The lookup uses the static type, so `Box<T>` needs its own registration; otherwise fails
    /// with [`Error::NoEncoder`].
    pub fn encode<T: Any>(&self, ctx: &EncodeContext, writer: &mut dyn ValueWriter, value: &T) -> Result<()> {
        let encoder = self
            .lookup_encoder(TypeId::of::<T>())
            .ok_or_else(|| Error::NoEncoder(type_name::<T>()))?;
        encoder.encode_value(ctx, writer, value)
    }

    /// Decodes into `target` with the decoder registered for `T`.
    ///
    /// `target` is left untouched when an error is returned.
    pub fn decode_into<T: Any>(&self, ctx: &DecodeContext, reader: &mut dyn ValueReader, target: &mut T) -> Result<()> {
        let decoder = self
            .lookup_decoder(TypeId::of::<T>())
            .ok_or_else(|| Error::NoDecoder(type_name::<T>()))?;
        decoder.decode_value(ctx, reader, target)
    }

    #[inline]
    pub fn decode<T: Any + Default>(&self, ctx: &DecodeContext, reader: &mut dyn ValueReader) -> Result<T> {
        let mut value = T::default();
        self.decode_into(ctx, reader, &mut value)?;
        Ok(value)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("encoders", &self.encoders.len())
            .field("decoders", &self.decoders.len())
            .finish()
    }
}
