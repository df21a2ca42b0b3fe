//! Low-level frame writer.
//!
//! Both directions of the link share one grammar, so the same writer serves
//! outbound host events and the test/client side that builds command frames.
//! Writing is a plain memory copy with no transformation; size limits are
//! the only thing enforced here.

use bytes::BufMut;

use crate::{
    errors::ProtocolError,
    message::{DataTag, Message, MAX_DATA_LEN, MAX_PARAMS, SYNC_TOKEN},
};

/// Write a frame header and its parameters.
///
/// Layout: `SYNC_TOKEN opcode PARAM_BYTE_LEN(u16 LE) [u16 LE] x n`.
///
/// # Errors
///
/// - `ProtocolError::TooManyParams` if `params` exceeds [`MAX_PARAMS`]
pub fn write_header(opcode: u8, params: &[u16], dst: &mut impl BufMut) -> Result<(), ProtocolError> {
    if params.len() > MAX_PARAMS {
        return Err(ProtocolError::TooManyParams { count: params.len(), max: MAX_PARAMS });
    }

    dst.put_u8(SYNC_TOKEN);
    dst.put_u8(opcode);
    dst.put_u16_le((params.len() * 2) as u16);
    for &param in params {
        dst.put_u16_le(param);
    }
    Ok(())
}

/// Write a trailing data block.
///
/// Layout: `SYNC_TOKEN tag DATA_BYTE_LEN(u16 LE) <raw bytes>`.
///
/// # Errors
///
/// - `ProtocolError::DataTooLarge` if `bytes` exceeds [`MAX_DATA_LEN`]
pub fn write_data_block(
    tag: DataTag,
    bytes: &[u8],
    dst: &mut impl BufMut,
) -> Result<(), ProtocolError> {
    if bytes.len() > MAX_DATA_LEN {
        return Err(ProtocolError::DataTooLarge { len: bytes.len(), max: MAX_DATA_LEN });
    }

    dst.put_u8(SYNC_TOKEN);
    dst.put_u8(tag.to_u8());
    dst.put_u16_le(bytes.len() as u16);
    dst.put_slice(bytes);
    Ok(())
}

/// Write a complete message, data block included.
pub fn write_message(message: &Message, dst: &mut impl BufMut) -> Result<(), ProtocolError> {
    write_header(message.opcode, &message.params, dst)?;
    if let Some(block) = &message.data {
        write_data_block(block.tag, &block.bytes, dst)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DataBlock;

    #[test]
    fn header_layout_is_sync_opcode_len_params() {
        let mut wire = Vec::new();
        write_header(0x21, &[0x0102, 0xA5A5], &mut wire).unwrap();
        assert_eq!(wire, vec![0xA5, 0x21, 0x04, 0x00, 0x02, 0x01, 0xA5, 0xA5]);
    }

    #[test]
    fn data_block_layout() {
        let mut wire = Vec::new();
        write_data_block(DataTag::Byte, b"Hi", &mut wire).unwrap();
        assert_eq!(wire, vec![0xA5, 0x01, 0x02, 0x00, b'H', b'i']);
    }

    #[test]
    fn message_with_data_concatenates_both_frames() {
        let msg = Message::with_data(0x60, vec![5, 10], DataBlock::new(DataTag::Byte, vec![b'x']));
        let mut wire = Vec::new();
        write_message(&msg, &mut wire).unwrap();
        assert_eq!(wire[0], SYNC_TOKEN);
        assert_eq!(wire[1], 0x60);
        assert_eq!(wire[8], SYNC_TOKEN);
        assert_eq!(wire[9], 0x01);
        assert_eq!(*wire.last().unwrap(), b'x');
    }

    #[test]
    fn oversized_inputs_are_rejected() {
        let params = vec![0u16; MAX_PARAMS + 1];
        let mut wire = Vec::new();
        assert!(matches!(
            write_header(0x21, &params, &mut wire),
            Err(ProtocolError::TooManyParams { .. })
        ));

        let data = vec![0u8; MAX_DATA_LEN + 1];
        assert!(matches!(
            write_data_block(DataTag::Byte, &data, &mut wire),
            Err(ProtocolError::DataTooLarge { .. })
        ));
    }
}
