// Canonical transaction encoding (ProtoTransactionCoreInfo)
//
// field 1 version      varint
// field 2 nonce        varint
// field 3 toaddr       bytes(20)
// field 4 senderpubkey { 1: bytes(33) }
// field 5 amount       { 1: bytes(16) big-endian }
// field 6 gasprice     { 1: bytes(16) big-endian }
// field 7 gaslimit     varint
// field 8 code         bytes, omitted when empty
// field 9 data         bytes, omitted when empty

use std::io::{self, Cursor};

use super::serialize::{
    read_tag, read_var_bytes, read_varint, write_tag, write_var_bytes, write_varint,
    Serializable, WireType,
};
use crate::address::{Address, ADDRESS_SIZE_BYTES};
use crate::error::{Error, Result};

const AMOUNT_SIZE_BYTES: usize = 16;

/// Public key bytes written when the sender key is not yet known
pub const EMPTY_PUBKEY: [u8; 1] = [0x00];

/// Pack a chain id and message version into the `version` field
pub fn pack_version(chain_id: u16, msg_version: u16) -> u32 {
    ((chain_id as u32) << 16) + msg_version as u32
}

/// The signed portion of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxCore {
    pub version: u32,
    pub nonce: u64,
    pub to_addr: Address,
    pub sender_pubkey: Vec<u8>,
    pub amount: u128,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub code: String,
    pub data: String,
}

fn codec_err(e: io::Error) -> Error {
    Error::Codec(e.to_string())
}

fn write_byte_array(buf: &mut Vec<u8>, field: u32, data: &[u8]) {
    let mut inner = Vec::with_capacity(data.len() + 2);
    write_tag(&mut inner, 1, WireType::LengthDelimited);
    write_var_bytes(&mut inner, data);

    write_tag(buf, field, WireType::LengthDelimited);
    write_var_bytes(buf, &inner);
}

/// Parse a `ByteArray { 1: bytes }` sub-message
fn read_byte_array(raw: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(raw);
    let mut data = None;

    while (cursor.position() as usize) < raw.len() {
        let (field, wire_type) = read_tag(&mut cursor).map_err(codec_err)?;
        if field != 1 || wire_type != WireType::LengthDelimited || data.is_some() {
            return Err(Error::Codec(format!("unexpected field {} in {}", field, name)));
        }
        data = Some(read_var_bytes(&mut cursor).map_err(codec_err)?);
    }

    data.ok_or_else(|| Error::Codec(format!("{} is missing its data field", name)))
}

fn read_u128(raw: &[u8], name: &str) -> Result<u128> {
    let bytes = read_byte_array(raw, name)?;
    let fixed: [u8; AMOUNT_SIZE_BYTES] = bytes.as_slice().try_into().map_err(|_| {
        Error::Codec(format!("{} must be {} bytes, got {}", name, AMOUNT_SIZE_BYTES, bytes.len()))
    })?;
    Ok(u128::from_be_bytes(fixed))
}

fn into_utf8(bytes: Vec<u8>, name: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| Error::Codec(format!("{} is not valid UTF-8", name)))
}

fn expect_wire(field: u32, actual: WireType, expected: WireType) -> Result<()> {
    if actual != expected {
        return Err(Error::Codec(format!("field {} has wire type {:?}", field, actual)));
    }
    Ok(())
}

/// Encode the signed portion of a transaction
pub fn encode(core: &TxCore) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + core.code.len() + core.data.len());
    write_fields(&mut buf, core);
    buf
}

fn write_fields(buf: &mut Vec<u8>, core: &TxCore) {
    write_tag(buf, 1, WireType::Varint);
    write_varint(buf, core.version as u64);

    write_tag(buf, 2, WireType::Varint);
    write_varint(buf, core.nonce);

    write_tag(buf, 3, WireType::LengthDelimited);
    write_var_bytes(buf, core.to_addr.as_bytes());

    write_byte_array(buf, 4, &core.sender_pubkey);
    write_byte_array(buf, 5, &core.amount.to_be_bytes());
    write_byte_array(buf, 6, &core.gas_price.to_be_bytes());

    write_tag(buf, 7, WireType::Varint);
    write_varint(buf, core.gas_limit);

    if !core.code.is_empty() {
        write_tag(buf, 8, WireType::LengthDelimited);
        write_var_bytes(buf, core.code.as_bytes());
    }
    if !core.data.is_empty() {
        write_tag(buf, 9, WireType::LengthDelimited);
        write_var_bytes(buf, core.data.as_bytes());
    }
}

/// Decode bytes produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<TxCore> {
    let mut cursor = Cursor::new(bytes);

    let mut version = None;
    let mut nonce = None;
    let mut to_addr = None;
    let mut sender_pubkey = None;
    let mut amount = None;
    let mut gas_price = None;
    let mut gas_limit = None;
    let mut code = None;
    let mut data = None;

    while (cursor.position() as usize) < bytes.len() {
        let (field, wire_type) = read_tag(&mut cursor).map_err(codec_err)?;

        match field {
            1 | 2 | 7 => {
                expect_wire(field, wire_type, WireType::Varint)?;
                let value = read_varint(&mut cursor).map_err(codec_err)?;
                let slot = match field {
                    1 => &mut version,
                    2 => &mut nonce,
                    _ => &mut gas_limit,
                };
                if slot.replace(value).is_some() {
                    return Err(Error::Codec(format!("duplicate field {}", field)));
                }
            }
            3..=6 | 8 | 9 => {
                expect_wire(field, wire_type, WireType::LengthDelimited)?;
                let raw = read_var_bytes(&mut cursor).map_err(codec_err)?;
                let duplicate = match field {
                    3 => {
                        let addr = Address::from_slice(&raw).map_err(|_| {
                            Error::Codec(format!(
                                "toaddr must be {} bytes, got {}",
                                ADDRESS_SIZE_BYTES,
                                raw.len()
                            ))
                        })?;
                        to_addr.replace(addr).is_some()
                    }
                    4 => sender_pubkey.replace(read_byte_array(&raw, "senderpubkey")?).is_some(),
                    5 => amount.replace(read_u128(&raw, "amount")?).is_some(),
                    6 => gas_price.replace(read_u128(&raw, "gasprice")?).is_some(),
                    8 => code.replace(into_utf8(raw, "code")?).is_some(),
                    _ => data.replace(into_utf8(raw, "data")?).is_some(),
                };
                if duplicate {
                    return Err(Error::Codec(format!("duplicate field {}", field)));
                }
            }
            _ => return Err(Error::Codec(format!("unknown field {}", field))),
        }
    }

    let missing = |name: &str| Error::Codec(format!("missing field {}", name));

    let version = version.ok_or_else(|| missing("version"))?;
    let version = u32::try_from(version)
        .map_err(|_| Error::Codec(format!("version {} does not fit in 32 bits", version)))?;

    Ok(TxCore {
        version,
        nonce: nonce.unwrap_or(0),
        to_addr: to_addr.ok_or_else(|| missing("toaddr"))?,
        sender_pubkey: sender_pubkey.ok_or_else(|| missing("senderpubkey"))?,
        amount: amount.ok_or_else(|| missing("amount"))?,
        gas_price: gas_price.ok_or_else(|| missing("gasprice"))?,
        gas_limit: gas_limit.ok_or_else(|| missing("gaslimit"))?,
        code: code.unwrap_or_default(),
        data: data.unwrap_or_default(),
    })
}

impl Serializable for TxCore {
    fn serialize(&self) -> Vec<u8> {
        encode(self)
    }

    fn deserialize(data: &[u8]) -> Result<Self> {
        decode(data)
    }
}
