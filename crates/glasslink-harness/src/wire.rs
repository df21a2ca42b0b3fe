//! Client command frame builders.
//!
//! Tests feed these byte streams through the production decoder, so the
//! whole inbound path (framing included) is exercised, not just the
//! handlers. Shapes mirror what the embedded client libraries send.

use glasslink_proto::{
    encode,
    message::{DataBlock, DataTag},
    opcode::{button, cmd, global, slider},
    Message,
};

/// Encode one message to wire bytes.
///
/// # Panics
///
/// Panics when the message exceeds the wire limits; builders are test
/// input, so that is a test bug.
#[must_use]
pub fn frame(message: &Message) -> Vec<u8> {
    let mut wire = Vec::new();
    #[allow(clippy::unwrap_used)]
    encode::write_message(message, &mut wire).unwrap();
    wire
}

/// A command without data block.
#[must_use]
pub fn command(opcode: u8, params: &[u16]) -> Vec<u8> {
    frame(&Message::new(opcode, params.to_vec()))
}

/// A command with a text data block.
#[must_use]
pub fn command_with_text(opcode: u8, params: &[u16], text: &str) -> Vec<u8> {
    frame(&Message::with_data(
        opcode,
        params.to_vec(),
        DataBlock::new(DataTag::Byte, text.as_bytes().to_vec()),
    ))
}

/// GLOBAL_SETTINGS / SET_FLAGS_AND_SIZE.
#[must_use]
pub fn set_flags_and_size(flags: u16, width: u16, height: u16) -> Vec<u8> {
    command(cmd::GLOBAL_SETTINGS, &[global::SET_FLAGS_AND_SIZE, flags, width, height])
}

/// BUTTON_INIT in the current 11-parameter shape (32-bit callback).
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn button_init(
    index: u16,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    color565: u16,
    caption_size: u16,
    flags: u16,
    value: u16,
    callback: u32,
    caption: &str,
) -> Vec<u8> {
    command_with_text(
        button::INIT,
        &[
            index,
            x,
            y,
            width,
            height,
            color565,
            caption_size,
            flags,
            value,
            (callback & 0xFFFF) as u16,
            (callback >> 16) as u16,
        ],
        caption,
    )
}

/// BUTTON_INIT in the legacy 9-parameter shape (combined size+flags field,
/// 16-bit callback).
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn button_init_legacy(
    index: u16,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    color565: u16,
    caption_size: u8,
    flags: u8,
    value: u16,
    callback: u16,
    caption: &str,
) -> Vec<u8> {
    let size_and_flags = u16::from(caption_size) | (u16::from(flags) << 8);
    command_with_text(
        button::INIT,
        &[index, x, y, width, height, color565, size_and_flags, value, callback],
        caption,
    )
}

/// BUTTON_SETTINGS with a subcommand and its parameters.
#[must_use]
pub fn button_settings(index: u16, subcommand: u16, params: &[u16]) -> Vec<u8> {
    let mut all = vec![index, subcommand];
    all.extend_from_slice(params);
    command(button::SETTINGS, &all)
}

/// SLIDER_INIT in the 12-parameter shape (32-bit callback).
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn slider_init(
    index: u16,
    x: u16,
    y: u16,
    bar_width: u16,
    bar_length: u16,
    threshold: u16,
    initial_value: u16,
    border_color565: u16,
    bar_color565: u16,
    flags: u16,
    callback: u32,
) -> Vec<u8> {
    command(
        slider::INIT,
        &[
            index,
            x,
            y,
            bar_width,
            bar_length,
            threshold,
            initial_value,
            border_color565,
            bar_color565,
            flags,
            (callback & 0xFFFF) as u16,
            (callback >> 16) as u16,
        ],
    )
}
