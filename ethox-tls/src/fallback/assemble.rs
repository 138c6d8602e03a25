use crate::buffer::{Buffer, Headers};
use crate::nic::Egress;
use crate::wire::{Checksum, tcp_segment};
use crate::Result;

/// Build the replacement of `original` in the zeroed `frame`.
///
/// Headers are copied verbatim and the payload is replaced with `live`, the ciphertext of exactly
/// the retransmitted range. The owner moves over last, once nothing can fail anymore.
pub(crate) fn assemble(
    original: &mut Buffer,
    mut frame: Vec<u8>,
    headers: &Headers,
    live: &[u8],
    egress: Option<&Egress>,
) -> Result<Buffer> {
    let (head, payload) = frame.split_at_mut(headers.payload);
    head.copy_from_slice(&original.data()[..headers.payload]);
    payload.copy_from_slice(live);

    let mut replacement = Buffer::new(frame, original.network_offset());
    replacement.set_checksum(original.checksum());
    update_checksum(&mut replacement, headers, egress)?;

    replacement.take_owner(original);
    Ok(replacement)
}

/// Refresh the TCP checksum after the payload changed.
///
/// Nothing needs to be done if the device already completes it. Otherwise the checksum is handed
/// to an egress device that can complete it, or computed here.
fn update_checksum(buffer: &mut Buffer, headers: &Headers, egress: Option<&Egress>) -> Result<()> {
    if buffer.checksum() == Checksum::Ignored {
        return Ok(());
    }

    let offload = egress.map_or(Checksum::Manual, |egress| egress.capabilities().tcp().tx_checksum());
    let segment = tcp_segment::new_checked_mut(&mut buffer.data_mut()[headers.transport..])?;
    match offload {
        Checksum::Ignored => {
            segment.seed_checksum(&headers.addresses);
            buffer.set_checksum(Checksum::Ignored);
        },
        Checksum::Manual => segment.fill_checksum(&headers.addresses),
    }

    Ok(())
}
