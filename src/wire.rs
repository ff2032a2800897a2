//! Field layout descriptors and bounds-checked byte access
//!
//! A version layout is data: an ordered list of `(name, offset, encoding)`
//! descriptors plus the header length. Applying it to a payload yields a
//! typed [`HeaderFields`] set and the body slice that follows the header.
//!
//! ## Performance Characteristics
//!
//! - Field extraction borrows from the payload, no copies
//! - Every read is bounds checked against the declared header length first
//! - Stride iteration uses `chunks_exact`, so an entry is never read past the body

use tracing::trace;

use crate::{DecodeError, Result};

/// Wire encoding of a single header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer, little-endian
    U16Le,
    /// 16-bit unsigned integer, big-endian (network order identifiers)
    U16Be,
    /// 32-bit unsigned integer, little-endian
    U32Le,
    /// Fixed-length byte run (BCD identifiers, opaque blocks)
    Bytes(usize),
}

impl FieldType {
    /// Returns the size in bytes of this encoding.
    pub const fn size(&self) -> usize {
        match self {
            FieldType::U8 => 1,
            FieldType::U16Le | FieldType::U16Be => 2,
            FieldType::U32Le => 4,
            FieldType::Bytes(len) => *len,
        }
    }
}

/// One `(name, offset, encoding)` descriptor in a header layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub field_type: FieldType,
}

/// Shorthand constructor for layout tables.
pub const fn field(name: &'static str, offset: usize, field_type: FieldType) -> FieldSpec {
    FieldSpec { name, offset, field_type }
}

/// Fixed-size header description of one format version.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    /// Header length in bytes; the body starts right after it
    pub len: usize,
    /// Ordered field descriptors, all within `len`
    pub fields: &'static [FieldSpec],
}

impl HeaderLayout {
    /// Check that every descriptor fits within the header and names are unique.
    pub fn validate(&self) -> Result<()> {
        for (i, spec) in self.fields.iter().enumerate() {
            let end = spec.offset + spec.field_type.size();
            if end > self.len {
                return Err(DecodeError::layout(
                    spec.name,
                    format!("ends at byte {} past header length {}", end, self.len),
                ));
            }
            if self.fields[..i].iter().any(|other| other.name == spec.name) {
                return Err(DecodeError::layout(spec.name, "declared twice"));
            }
        }
        Ok(())
    }

    /// Apply the layout to a payload, returning typed fields and the body slice.
    ///
    /// A payload shorter than the header is rejected before any field is read.
    pub fn parse<'a>(&self, payload: &'a [u8], context: &str) -> Result<(HeaderFields<'a>, &'a [u8])> {
        if payload.len() < self.len {
            return Err(DecodeError::malformed(format!("{} header", context), self.len, payload.len()));
        }
        let (header, body) = payload.split_at(self.len);

        let mut values = Vec::with_capacity(self.fields.len());
        for spec in self.fields {
            values.push((spec.name, read_field(header, spec)?));
        }

        trace!(context, header_len = self.len, body_len = body.len(), "Applied header layout");
        Ok((HeaderFields { values }, body))
    }
}

/// Runtime value of one extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    Bytes(&'a [u8]),
}

fn read_field<'a>(header: &'a [u8], spec: &FieldSpec) -> Result<FieldValue<'a>> {
    let size = spec.field_type.size();
    let bytes = header.get(spec.offset..spec.offset + size).ok_or_else(|| {
        DecodeError::malformed(format!("field '{}'", spec.name), spec.offset + size, header.len())
    })?;

    Ok(match spec.field_type {
        FieldType::U8 => FieldValue::U8(bytes[0]),
        FieldType::U16Le => FieldValue::U16(u16::from_le_bytes([bytes[0], bytes[1]])),
        FieldType::U16Be => FieldValue::U16(u16::from_be_bytes([bytes[0], bytes[1]])),
        FieldType::U32Le => {
            FieldValue::U32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        FieldType::Bytes(_) => FieldValue::Bytes(bytes),
    })
}

/// Typed header tuple produced by [`HeaderLayout::parse`].
#[derive(Debug, Clone)]
pub struct HeaderFields<'a> {
    values: Vec<(&'static str, FieldValue<'a>)>,
}

impl<'a> HeaderFields<'a> {
    /// Fetch a field by name as the requested type.
    pub fn get<T: FieldData<'a>>(&self, name: &str) -> Result<T> {
        let value = self
            .values
            .iter()
            .find(|(field_name, _)| *field_name == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| DecodeError::layout(name, "not declared by the version layout"))?;
        T::from_value(value, name)
    }

    /// Number of extracted fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the layout declared no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Types that can be read out of a [`FieldValue`].
pub trait FieldData<'a>: Sized {
    fn from_value(value: FieldValue<'a>, name: &str) -> Result<Self>;
}

impl<'a> FieldData<'a> for u8 {
    fn from_value(value: FieldValue<'a>, name: &str) -> Result<Self> {
        match value {
            FieldValue::U8(v) => Ok(v),
            other => Err(DecodeError::layout(name, format!("expected U8, got {:?}", other))),
        }
    }
}

impl<'a> FieldData<'a> for u16 {
    fn from_value(value: FieldValue<'a>, name: &str) -> Result<Self> {
        match value {
            FieldValue::U16(v) => Ok(v),
            FieldValue::U8(v) => Ok(v as u16),
            other => Err(DecodeError::layout(name, format!("expected U16, got {:?}", other))),
        }
    }
}

impl<'a> FieldData<'a> for u32 {
    fn from_value(value: FieldValue<'a>, name: &str) -> Result<Self> {
        match value {
            FieldValue::U32(v) => Ok(v),
            FieldValue::U16(v) => Ok(v as u32),
            FieldValue::U8(v) => Ok(v as u32),
            other => Err(DecodeError::layout(name, format!("expected U32, got {:?}", other))),
        }
    }
}

impl<'a> FieldData<'a> for &'a [u8] {
    fn from_value(value: FieldValue<'a>, name: &str) -> Result<Self> {
        match value {
            FieldValue::Bytes(bytes) => Ok(bytes),
            other => Err(DecodeError::layout(name, format!("expected Bytes, got {:?}", other))),
        }
    }
}

impl<'a, const N: usize> FieldData<'a> for [u8; N] {
    fn from_value(value: FieldValue<'a>, name: &str) -> Result<Self> {
        let bytes = <&'a [u8]>::from_value(value, name)?;
        bytes.try_into().map_err(|_| {
            DecodeError::layout(name, format!("expected {} bytes, got {}", N, bytes.len()))
        })
    }
}

/// Split a body into fixed-stride entries.
///
/// The body must be an exact multiple of `stride`; otherwise the packet is
/// malformed and nothing is yielded.
pub fn entries<'a>(body: &'a [u8], stride: usize, context: &str) -> Result<std::slice::ChunksExact<'a, u8>> {
    if stride == 0 || body.len() % stride != 0 {
        return Err(DecodeError::stride_mismatch(context, stride, body.len()));
    }
    Ok(body.chunks_exact(stride))
}

/// Read a little-endian u32 at `offset`, if the payload is long enough.
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a little-endian u16 at `offset`, if the slice is long enough.
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Sequential reader for count-prefixed layouts.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `len` bytes or fail without consuming anything.
    pub fn take(&mut self, len: usize, context: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::malformed(context, self.pos + len, self.data.len()));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn u8(&mut self, context: &str) -> Result<u8> {
        Ok(self.take(1, context)?[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: HeaderLayout = HeaderLayout {
        len: 9,
        fields: &[
            field("version", 0, FieldType::U32Le),
            field("id", 4, FieldType::U16Be),
            field("tag", 6, FieldType::U8),
            field("code", 7, FieldType::Bytes(2)),
        ],
    };

    proptest! {
        #[test]
        fn prop_stride_split_is_exact(k in 0usize..20, stride in 1usize..24, r in 0usize..24) {
            let r = r % stride;
            let body = vec![0xa5u8; k * stride + r];
            match entries(&body, stride, "prop") {
                Ok(chunks) => {
                    prop_assert_eq!(r, 0);
                    prop_assert_eq!(chunks.len(), k);
                }
                Err(err) => {
                    prop_assert!(r != 0);
                    let is_stride_mismatch = matches!(err, DecodeError::StrideMismatch { .. });
                    prop_assert!(is_stride_mismatch);
                }
            }
        }

        #[test]
        fn prop_short_payloads_rejected_before_extraction(len in 0usize..9) {
            let payload = vec![0u8; len];
            let result = SAMPLE.parse(&payload, "prop");
            let is_malformed = matches!(result, Err(DecodeError::MalformedLength { needed: 9, .. }));
            prop_assert!(is_malformed);
        }

        #[test]
        fn prop_read_helpers_never_panic(data in prop::collection::vec(any::<u8>(), 0..16), offset in any::<usize>()) {
            let _ = read_u32_le(&data, offset);
            let _ = read_u16_le(&data, offset);
        }
    }

    #[test]
    fn layout_yields_typed_fields_and_body() {
        let payload = [9, 0, 0, 0, 0x01, 0x34, 0x07, 0x62, 0xf2, 0xaa, 0xbb];
        let (fields, body) = SAMPLE.parse(&payload, "sample").unwrap();

        assert_eq!(fields.len(), 4);
        assert_eq!(fields.get::<u32>("version").unwrap(), 9);
        assert_eq!(fields.get::<u16>("id").unwrap(), 0x0134);
        assert_eq!(fields.get::<u8>("tag").unwrap(), 7);
        assert_eq!(fields.get::<[u8; 2]>("code").unwrap(), [0x62, 0xf2]);
        assert_eq!(body, &[0xaa, 0xbb]);
    }

    #[test]
    fn undeclared_or_mistyped_fields_are_layout_errors() {
        let payload = [0u8; 9];
        let (fields, _) = SAMPLE.parse(&payload, "sample").unwrap();

        assert!(matches!(fields.get::<u8>("missing"), Err(DecodeError::Layout { .. })));
        assert!(matches!(fields.get::<u8>("version"), Err(DecodeError::Layout { .. })));
        assert!(matches!(fields.get::<[u8; 3]>("code"), Err(DecodeError::Layout { .. })));
    }

    #[test]
    fn layout_validation_catches_overruns_and_duplicates() {
        assert!(SAMPLE.validate().is_ok());

        const OVERRUN: HeaderLayout =
            HeaderLayout { len: 4, fields: &[field("wide", 2, FieldType::U32Le)] };
        assert!(OVERRUN.validate().is_err());

        const DUPLICATE: HeaderLayout = HeaderLayout {
            len: 4,
            fields: &[field("a", 0, FieldType::U8), field("a", 1, FieldType::U8)],
        };
        assert!(DUPLICATE.validate().is_err());
    }

    #[test]
    fn cursor_does_not_consume_on_failure() {
        let data = [3u8, 1, 2];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.u8("count").unwrap(), 3);
        assert!(cursor.take(3, "entries").is_err());
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.take(2, "entries").unwrap(), &[1, 2]);
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert!(entries(&[], 0, "zero").is_err());
    }
}
