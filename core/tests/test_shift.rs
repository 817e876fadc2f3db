// Shift engine: idempotence, length bookkeeping, direct-buffer capacity
// and read-only enforcement.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use vrt_core::buffer::{shift_payload, shift_trailer, Region, SegmentedStore};
    use vrt_core::constants::MAX_PACKET_LEN;
    use vrt_core::header::{ClassId, PacketType, TimeStamp};
    use vrt_core::packet::{Packet, PacketError};

    fn bare_data() -> Packet<'static> {
        // Type 1, no class id, no time stamps, no trailer, 8-byte payload.
        Packet::from_bytes(&[0x10, 0x00, 0x00, 0x04, 0, 0, 0, 7, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap()
    }

// ## 1️⃣ Insert then remove restores the original bytes

    #[test]
    fn class_id_insert_remove_is_identity() {
        let mut p = bare_data();
        let before = p.to_bytes();

        p.set_class_id(Some(ClassId::new(0x12_3456, 1, 2).unwrap())).unwrap();
        assert_eq!(p.packet_len(), before.len() + 8);
        assert_eq!(p.header_len(), 16);
        assert_eq!(p.payload(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        p.set_class_id(None).unwrap();
        assert_eq!(p.to_bytes(), before);
    }

    #[test]
    fn time_stamp_insert_remove_is_identity() {
        let mut p = bare_data();
        let before = p.to_bytes();

        p.set_time(&TimeStamp::utc(1_700_000_000, 250_000)).unwrap();
        assert_eq!(p.header_len(), 8 + 12);
        assert_eq!(p.integer_timestamp(), Some(1_700_000_000));
        assert_eq!(p.fractional_timestamp(), Some(250_000));
        assert_eq!(p.payload(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        p.set_time(&TimeStamp::none()).unwrap();
        assert_eq!(p.to_bytes(), before);
    }

    #[test]
    fn trailer_insert_remove_is_identity() {
        let mut p = bare_data();
        let before = p.to_bytes();

        let mut store = SegmentedStore::single(Region::Owned(before.clone()));
        shift_trailer(&mut store, 4).unwrap();
        assert_eq!(store.trailer_len(), 4);
        assert_eq!(store.packet_len(), before.len() + 4);
        shift_trailer(&mut store, 4).unwrap(); // already present
        assert_eq!(store.packet_len(), before.len() + 4);
        shift_trailer(&mut store, -4).unwrap();
        assert_eq!(store.to_vec(), before);

        p.set_trailer(Some(Default::default())).unwrap();
        p.set_trailer(None).unwrap();
        assert_eq!(p.to_bytes(), before);
    }

    #[test]
    fn context_field_insert_remove_is_identity() {
        let mut p = Packet::new_context();
        let before = p.to_bytes();
        p.set_sample_rate(Some(10e6)).unwrap();
        p.set_gain(Some(Default::default())).unwrap();
        p.set_sample_rate(None).unwrap();
        p.set_gain(None).unwrap();
        assert_eq!(p.to_bytes(), before);
    }

    proptest! {
        #[test]
        fn payload_shift_is_idempotent(words in 0usize..32, at_word in 0usize..32, n_words in 1usize..16) {
            let payload: Vec<u8> = (0..words * 4).map(|i| i as u8).collect();
            let mut p = bare_data();
            p.set_payload(&payload).unwrap();
            let before = p.to_bytes();

            let mut store = SegmentedStore::single(Region::Owned(before.clone()));
            let at = (at_word.min(words)) * 4;
            shift_payload(&mut store, at, n_words * 4, true).unwrap();
            prop_assert_eq!(store.packet_len(), before.len() + n_words * 4);
            prop_assert!(store.payload()[at..at + n_words * 4].iter().all(|&b| b == 0));
            shift_payload(&mut store, at, n_words * 4, false).unwrap();
            prop_assert_eq!(store.to_vec(), before);
        }
    }

// ## 2️⃣ Length invariant

    #[test]
    fn length_field_tracks_every_part() {
        let mut p = Packet::new_data();
        for len in [0usize, 4, 4096, 4100, 12, 0] {
            p.set_payload(&vec![0xEE; len]).unwrap();
            assert_eq!(p.packet_len(), p.header_len() + p.payload_len() + p.trailer_len());
            assert_eq!(p.payload_len(), len);
            assert_eq!(p.packet_len() % 4, 0);
        }
    }

    #[test]
    fn set_packet_type_moves_stream_id_and_trailer() {
        let mut p = Packet::new_data();
        p.set_stream_id(0xCAFE_F00D).unwrap();
        p.set_payload(&[9; 8]).unwrap();

        p.set_packet_type(PacketType::UnidentifiedData).unwrap();
        assert_eq!(p.stream_id(), None);
        assert_eq!(p.header_len(), 24);
        assert_eq!(p.payload(), &[9; 8]);
        assert!(p.has_trailer());

        p.set_packet_type(PacketType::Context).unwrap();
        assert!(!p.has_trailer());
        assert_eq!(p.stream_id(), Some(0));
        assert_eq!(p.to_bytes()[0], 0x48);
        assert_eq!(p.packet_len(), 28 + 8);
    }

    #[test]
    fn oversized_packet_is_rejected() {
        let mut p = Packet::new_data();
        let err = p.set_payload_len(MAX_PACKET_LEN).unwrap_err();
        assert!(matches!(err, PacketError::PacketTooLong { .. }));
    }

    #[test]
    #[should_panic]
    fn unaligned_shift_panics() {
        let mut store = SegmentedStore::single(Region::Owned(bare_data().to_bytes()));
        let _ = shift_payload(&mut store, 0, 3, true);
    }

// ## 3️⃣ Direct and read-only regions

    #[test]
    fn direct_buffer_grows_in_place() {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&Packet::new_context().to_bytes());
        {
            let mut p = Packet::wrap(&mut buf).unwrap();
            assert!(p.is_direct());
            p.set_bandwidth(Some(1.0e6)).unwrap();
            assert_eq!(p.packet_len(), 40);
        }
        assert_eq!(&buf[..4], &[0x48, 0x60, 0x00, 0x0A]);
        assert_eq!(&buf[28..32], &0x2000_0000u32.to_be_bytes());
    }

    #[test]
    fn direct_buffer_cannot_grow_past_its_end() {
        let mut buf = Packet::new_context().to_bytes();
        let mut p = Packet::wrap(&mut buf).unwrap();
        let err = p.set_bandwidth(Some(1.0e6)).unwrap_err();
        assert_eq!(err, PacketError::CapacityExceeded { needed: 40, capacity: 32 });
    }

    #[test]
    fn read_only_view_rejects_every_mutator() {
        let bytes = Packet::new_data().to_bytes();
        let mut p = Packet::view(&bytes).unwrap();
        assert!(p.is_read_only());
        assert_eq!(p.set_stream_id(1), Err(PacketError::ReadOnly));
        assert_eq!(p.set_class_id(None), Err(PacketError::ReadOnly));
        assert_eq!(p.set_payload(&[0; 4]), Err(PacketError::ReadOnly));
        assert_eq!(p.set_trailer(None), Err(PacketError::ReadOnly));
        assert_eq!(p.set_packet_count(3), Err(PacketError::ReadOnly));

        let mut owned = Packet::new_context().into_read_only();
        assert_eq!(owned.set_sample_rate(Some(1.0)), Err(PacketError::ReadOnly));
    }

    #[test]
    fn split_regions_keep_payload_separate() {
        let ctx = Packet::new_context().to_bytes();
        let mut header = ctx[..28].to_vec();
        let mut payload = vec![0u8; 64];
        let mut p = Packet::wrap_parts(&mut header, &mut payload, None).unwrap();
        p.set_reference_level(Some(-10.5)).unwrap();
        assert_eq!(p.reference_level().unwrap(), Some(-10.5));
        assert_eq!(p.packet_len(), 36);
        drop(p);
        assert_eq!(&payload[..4], &0x0100_0000u32.to_be_bytes());
    }
}
