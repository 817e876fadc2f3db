// Structural validity: reserved bits per sub-version, length bounds,
// expected length and buffer coverage, first failure wins.

#[cfg(test)]
mod tests {
    use vrt_core::header::{ClassId, Vita49Version};
    use vrt_core::packet::{check_packet, CheckMode, InvalidReason, Packet, PacketError};

    const V0: Vita49Version = Vita49Version::V49_0;
    const V2: Vita49Version = Vita49Version::V49_2;

    fn strict(bytes: &[u8], version: Vita49Version) -> Result<(), InvalidReason> {
        check_packet(bytes, bytes.len(), CheckMode::Strict, version, None)
    }

    fn lenient(bytes: &[u8]) -> Result<(), InvalidReason> {
        check_packet(bytes, bytes.len(), CheckMode::Lenient, V0, None)
    }

// # ✅ 1. Length bounds

    #[test]
    fn empty_payload_is_valid() {
        assert!(Packet::new_context().is_valid());
        assert!(Packet::new_data().is_valid());
        assert_eq!(strict(&Packet::new_data().to_bytes(), V0), Ok(()));
    }

    #[test]
    fn one_word_short_fails_length() {
        let mut bytes = Packet::new_data().to_bytes();
        bytes[3] = 7;
        assert_eq!(strict(&bytes, V0), Err(InvalidReason::Length { declared: 28, minimum: 32 }));
        assert_eq!(lenient(&bytes), Err(InvalidReason::Length { declared: 28, minimum: 32 }));
    }

    #[test]
    fn expected_length_must_match() {
        let p = Packet::new_context();
        assert_eq!(p.check(CheckMode::Strict, Some(32)), Ok(()));
        assert_eq!(
            p.check(CheckMode::Strict, Some(36)),
            Err(InvalidReason::ExpectedLength { expected: 36, actual: 32 })
        );
    }

    #[test]
    fn declared_length_must_fit_the_buffer() {
        let bytes = Packet::new_data().to_bytes();
        assert_eq!(
            check_packet(&bytes[..16], 16, CheckMode::Strict, V0, None),
            Err(InvalidReason::BufferTooShort { declared: 32, available: 16 })
        );
        // Header-only prefix with the rest known to exist.
        assert_eq!(check_packet(&bytes[..28], 32, CheckMode::Strict, V0, None), Ok(()));
        assert_eq!(
            strict(&bytes[..2], V0),
            Err(InvalidReason::BufferTooShort { declared: 4, available: 2 })
        );
    }

    #[test]
    fn truncated_bytes_are_rejected_by_constructors() {
        let bytes = Packet::new_data().to_bytes();
        assert!(matches!(
            Packet::from_bytes(&bytes[..16]),
            Err(PacketError::Invalid(InvalidReason::BufferTooShort { declared: 32, .. }))
        ));
        assert!(matches!(Packet::view(&bytes[..16]), Err(PacketError::Invalid(_))));
        assert!(matches!(Packet::from_bytes(&bytes[..3]), Err(PacketError::Truncated { needed: 4, available: 3 })));
    }

// # ✅ 2. Reserved bits

    #[test]
    fn data_reserved_bits_depend_on_version() {
        let mut bytes = Packet::new_data().to_bytes();
        bytes[0] |= 0x01;
        assert_eq!(strict(&bytes, V0), Err(InvalidReason::ReservedBits));
        assert_eq!(strict(&bytes, V2), Ok(()));
        assert_eq!(lenient(&bytes), Ok(()));
    }

    #[test]
    fn context_reserved_bits_depend_on_version() {
        // Bit 1 is the not-a-49.0 indicator in 49.2 and reserved in 49.0.
        let mut bytes = Packet::new_context().to_bytes();
        bytes[0] |= 0x02;
        assert_eq!(strict(&bytes, V0), Err(InvalidReason::ReservedBits));
        assert_eq!(strict(&bytes, V2), Ok(()));

        // Bit 2 stays reserved in both.
        bytes[0] |= 0x04;
        assert_eq!(strict(&bytes, V0), Err(InvalidReason::ReservedBits));
        assert_eq!(strict(&bytes, V2), Err(InvalidReason::ReservedBits));
        assert_eq!(lenient(&bytes), Ok(()));
    }

    #[test]
    fn bare_49_2_context_with_indicator_is_valid() {
        let mut bytes = [0x42, 0, 0, 3, 0, 0, 0, 1, 0, 0, 0, 0];
        assert_eq!(check_packet(&bytes, 12, CheckMode::Strict, V2, None), Ok(()));
        bytes[0] = 0x44;
        assert_eq!(check_packet(&bytes, 12, CheckMode::Strict, V2, None), Err(InvalidReason::ReservedBits));
    }

    #[test]
    fn reserved_packet_types_fail_strict() {
        let mut bytes = Packet::new_context().to_bytes();
        for t in 6u8..16 {
            bytes[0] = (t << 4) | 0x08;
            assert_eq!(strict(&bytes, V0), Err(InvalidReason::ReservedBits), "type {t}");
            assert_eq!(strict(&bytes, V2), Err(InvalidReason::ReservedBits), "type {t}");
        }
    }

    #[test]
    fn class_id_pad_bits() {
        let mut p = Packet::new_data();
        p.set_class_id(Some(ClassId::new(0x12_3456, 1, 2).unwrap().with_pad_bits(5).unwrap())).unwrap();
        let bytes = p.to_bytes();
        assert_eq!(strict(&bytes, V0), Err(InvalidReason::ClassIdReservedBits));
        assert_eq!(strict(&bytes, V2), Ok(()));
        assert_eq!(lenient(&bytes), Ok(()));

        // Reserved bits below the pad count are still reserved in 49.2.
        let mut bad = bytes.clone();
        bad[8] |= 0x01;
        assert_eq!(strict(&bad, V2), Err(InvalidReason::ClassIdReservedBits));

        // Context packets carry no pad count at all.
        let mut ctx = Packet::new_context();
        ctx.set_class_id(Some(ClassId::new(1, 1, 1).unwrap().with_pad_bits(1).unwrap())).unwrap();
        assert_eq!(strict(&ctx.to_bytes(), V2), Err(InvalidReason::ClassIdReservedBits));
    }

    #[test]
    fn packet_version_selects_masks() {
        let mut bytes = Packet::new_data().to_bytes();
        bytes[0] |= 0x02;
        let p = Packet::from_bytes(&bytes).unwrap();
        assert!(!p.is_valid());
        assert!(p.with_version(V2).is_valid());
    }

// # ✅ 3. Priority

    #[test]
    fn first_failure_wins() {
        let mut bytes = Packet::new_data().to_bytes();
        bytes[0] |= 0x01; // reserved
        bytes[3] = 2; // too short
        assert_eq!(strict(&bytes, V0), Err(InvalidReason::ReservedBits));
        assert_eq!(lenient(&bytes), Err(InvalidReason::Length { declared: 8, minimum: 32 }));
        assert_eq!(
            check_packet(&bytes, bytes.len(), CheckMode::Lenient, V0, Some(8)),
            Err(InvalidReason::Length { declared: 8, minimum: 32 })
        );
    }
}
