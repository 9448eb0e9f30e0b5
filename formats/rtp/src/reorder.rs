use std::collections::BTreeMap;

use utils::traits::buffer::GenericSequencer;

use crate::{errors::RtpError, packet::RtpTrivialPacket, sequence_number::SequenceNumber};

pub const DEFAULT_REORDER_CAPACITY: usize = 64;

/// Jitter buffer that re-establishes sequence order before depacketization.
///
/// Packets are keyed by their extended sequence number (RFC 1982 style
/// modular comparison against the highest number seen). Delivery is strictly
/// in order; a hole that survives a full deliver cycle is bridged by
/// force-delivering the oldest buffered packet, which also re-anchors the
/// expected sequence. Packets at or before the delivery point cannot be
/// emitted in order any more and are dropped as duplicates/late arrivals.
#[derive(Debug)]
pub struct RtpReorderBuffer {
    capacity: usize,
    pending: BTreeMap<u64, RtpTrivialPacket>,
    next_expected: Option<SequenceNumber>,
    highest_seen: Option<SequenceNumber>,
    stalled: bool,
    duplicate_count: u64,
    late_count: u64,
    gap_count: u64,
}

impl RtpReorderBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            capacity,
            pending: BTreeMap::new(),
            next_expected: None,
            highest_seen: None,
            stalled: false,
            duplicate_count: 0,
            late_count: 0,
            gap_count: 0,
        }
    }

    pub fn duplicate_count(&self) -> u64 {
        self.duplicate_count
    }

    pub fn late_count(&self) -> u64 {
        self.late_count
    }

    pub fn gap_count(&self) -> u64 {
        self.gap_count
    }

    /// Extends the 16-bit wire number against the highest extended number
    /// seen so far. Returns None for packets from before the stream start.
    fn extend(&self, number: u16) -> Option<SequenceNumber> {
        let Some(highest) = self.highest_seen else {
            return Some(SequenceNumber::new(0, number));
        };

        let forward = number.wrapping_sub(highest.number());
        if forward < 0x8000 {
            Some(highest + forward)
        } else {
            let backward = highest.number().wrapping_sub(number) as u64;
            if highest.value() < backward {
                return None;
            }
            Some(highest - backward)
        }
    }

    fn drain_in_order(&mut self, out: &mut Vec<RtpTrivialPacket>) {
        while let Some(expected) = self.next_expected {
            match self.pending.remove(&expected.value()) {
                Some(packet) => {
                    out.push(packet);
                    self.next_expected = Some(expected + 1_u16);
                }
                None => break,
            }
        }
    }

    fn force_deliver_oldest(&mut self, out: &mut Vec<RtpTrivialPacket>) {
        let Some((&key, _)) = self.pending.first_key_value() else {
            return;
        };
        let packet = self.pending.remove(&key).unwrap();
        let delivered = SequenceNumber::new(
            (key / (u16::MAX as u64 + 1)) as u16,
            (key % (u16::MAX as u64 + 1)) as u16,
        );
        if self.next_expected.is_some() {
            // bridging an actual hole, not the initial anchor
            self.gap_count += 1;
            tracing::trace!(
                "sequence hole bridged by force delivering {}",
                delivered.number()
            );
        }
        self.next_expected = Some(delivered + 1_u16);
        out.push(packet);
    }
}

impl GenericSequencer for RtpReorderBuffer {
    type In = RtpTrivialPacket;
    type Out = RtpTrivialPacket;
    type Error = RtpError;

    fn enqueue(&mut self, packet: Self::In) -> Result<(), Self::Error> {
        let Some(extended) = self.extend(packet.header.sequence_number) else {
            self.late_count += 1;
            return Ok(());
        };

        if self.highest_seen.map_or(true, |highest| extended > highest) {
            self.highest_seen = Some(extended);
        }

        if let Some(expected) = self.next_expected {
            if extended < expected {
                self.late_count += 1;
                return Ok(());
            }
        }

        if self.pending.insert(extended.value(), packet).is_some() {
            self.duplicate_count += 1;
        }
        Ok(())
    }

    fn try_dump(&mut self) -> Vec<Self::Out> {
        let mut out = Vec::new();
        self.drain_in_order(&mut out);

        while self.pending.len() > self.capacity {
            self.force_deliver_oldest(&mut out);
            self.drain_in_order(&mut out);
        }

        if out.is_empty() && !self.pending.is_empty() {
            if self.stalled {
                self.force_deliver_oldest(&mut out);
                self.drain_in_order(&mut out);
                self.stalled = false;
            } else {
                self.stalled = true;
            }
        } else {
            self.stalled = false;
        }

        out
    }
}

#[cfg(test)]
mod test {
    use tokio_util::bytes::Bytes;

    use crate::header::RtpHeader;

    use super::*;

    fn packet(sequence_number: u16) -> RtpTrivialPacket {
        RtpTrivialPacket::new(
            RtpHeader {
                version: 2,
                padding: false,
                extension: false,
                csrc_count: 0,
                marker: false,
                payload_type: 96,
                sequence_number,
                timestamp: sequence_number as u32 * 3000,
                ssrc: 0x11223344,
                csrc_list: Vec::new(),
                header_extension: None,
            },
            Bytes::from_static(&[0x65, 0x00]),
        )
    }

    fn drain_all(buffer: &mut RtpReorderBuffer) -> Vec<u16> {
        let mut delivered = Vec::new();
        loop {
            let batch = buffer.try_dump();
            if batch.is_empty() && buffer.pending.is_empty() {
                break;
            }
            delivered.extend(batch.iter().map(|p| p.header.sequence_number));
        }
        delivered
    }

    #[test]
    fn test_in_order_stream_is_passed_through() {
        let mut buffer = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
        let mut delivered = Vec::new();
        for seq in 0..10_u16 {
            buffer.enqueue(packet(seq)).unwrap();
            delivered.extend(buffer.try_dump().iter().map(|p| p.header.sequence_number));
        }
        delivered.extend(drain_all(&mut buffer));
        assert_eq!(delivered, (0..10).collect::<Vec<u16>>());
        assert_eq!(buffer.gap_count(), 0);
    }

    #[test]
    fn test_any_permutation_restores_order() {
        // a fixed scramble of 64 consecutive sequence numbers
        let mut sequences: Vec<u16> = (100..164).collect();
        sequences.reverse();
        sequences.swap(3, 40);
        sequences.swap(17, 62);

        let mut buffer = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
        for seq in &sequences {
            buffer.enqueue(packet(*seq)).unwrap();
        }
        let delivered = drain_all(&mut buffer);
        assert_eq!(delivered, (100..164).collect::<Vec<u16>>());
    }

    #[test]
    fn test_small_reorder_heals_without_gap() {
        let mut buffer = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
        let mut delivered = Vec::new();
        for seq in [0_u16, 1, 2, 4, 3, 5] {
            buffer.enqueue(packet(seq)).unwrap();
            delivered.extend(buffer.try_dump().iter().map(|p| p.header.sequence_number));
        }
        delivered.extend(drain_all(&mut buffer));
        assert_eq!(delivered, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(buffer.gap_count(), 0);
    }

    #[test]
    fn test_persistent_hole_is_bridged() {
        let mut buffer = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
        let mut delivered = Vec::new();
        // sequence 3 never arrives
        for seq in [0_u16, 1, 2, 4, 5, 6] {
            buffer.enqueue(packet(seq)).unwrap();
            delivered.extend(buffer.try_dump().iter().map(|p| p.header.sequence_number));
        }
        delivered.extend(drain_all(&mut buffer));
        assert_eq!(delivered, vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(buffer.gap_count(), 1);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut buffer = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
        let mut delivered = Vec::new();
        for seq in [0_u16, 1, 1, 2] {
            buffer.enqueue(packet(seq)).unwrap();
            delivered.extend(buffer.try_dump().iter().map(|p| p.header.sequence_number));
        }
        delivered.extend(drain_all(&mut buffer));
        assert_eq!(delivered, vec![0, 1, 2]);
        assert!(buffer.duplicate_count() + buffer.late_count() >= 1);
    }

    #[test]
    fn test_sequence_wraparound() {
        let mut buffer = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
        let mut delivered = Vec::new();
        for seq in [65533_u16, 65534, 65535, 0, 1, 2] {
            buffer.enqueue(packet(seq)).unwrap();
            delivered.extend(buffer.try_dump().iter().map(|p| p.header.sequence_number));
        }
        delivered.extend(drain_all(&mut buffer));
        assert_eq!(delivered, vec![65533, 65534, 65535, 0, 1, 2]);
        assert_eq!(buffer.gap_count(), 0);
    }
}
