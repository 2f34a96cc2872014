// Protobuf wire-format primitives

use std::io::{self, Read};

use crate::error::Result;

/// Trait for types with a canonical byte encoding
pub trait Serializable {
    fn serialize(&self) -> Vec<u8>;
    fn deserialize(data: &[u8]) -> Result<Self> where Self: Sized;
}

/// Longest LEB128 encoding of a u64
const MAX_VARINT_LEN: usize = 10;

/// Wire types used by the transaction encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    LengthDelimited,
}

impl WireType {
    pub fn to_u8(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::LengthDelimited => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(WireType::Varint),
            2 => Some(WireType::LengthDelimited),
            _ => None,
        }
    }
}

/// Append a base-128 varint, low groups first
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Read a base-128 varint
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> io::Result<u64> {
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        let low = (byte[0] & 0x7f) as u64;

        // the tenth byte may only carry the top bit of a u64
        if i == MAX_VARINT_LEN - 1 && low > 1 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "varint overflows u64"));
        }
        value |= low << (7 * i);

        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(io::Error::new(io::ErrorKind::InvalidData, "varint too long"))
}

/// Append a field key
pub fn write_tag(buf: &mut Vec<u8>, field: u32, wire_type: WireType) {
    write_varint(buf, ((field as u64) << 3) | wire_type.to_u8() as u64)
}

/// Read a field key, rejecting wire types the encoding never uses
pub fn read_tag<R: Read + ?Sized>(reader: &mut R) -> io::Result<(u32, WireType)> {
    let key = read_varint(reader)?;
    let wire_type = WireType::from_u8((key & 0x7) as u8).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, format!("unsupported wire type {}", key & 0x7))
    })?;
    let field = u32::try_from(key >> 3)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "field number out of range"))?;
    Ok((field, wire_type))
}

/// Append bytes with length prefix (varint length + data)
pub fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

/// Read bytes with length prefix.
///
/// A length running past the end of input is an `UnexpectedEof`.
pub fn read_var_bytes<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = read_varint(reader)?;
    let mut data = Vec::new();
    reader.take(len).read_to_end(&mut data)?;
    if data.len() as u64 != len {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "length-delimited field truncated"));
    }
    Ok(data)
}
