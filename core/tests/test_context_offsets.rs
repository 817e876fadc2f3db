// Context (CIF0) offset algorithm against a naive walk over the fields in
// wire order: exhaustive for the low 20 field bits, sampled above that
// with real variable-length sections.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use vrt_core::context::fields::{ContextField, FIELD_BITS};
    use vrt_core::context::{context_end, context_offset, GpsAscii};
    use vrt_core::packet::{Packet, PacketError};

    fn word(p: &[u8], at: usize) -> u32 {
        u32::from_be_bytes([p[at], p[at + 1], p[at + 2], p[at + 3]])
    }

    fn fixed_width(bit: u32) -> usize {
        match bit {
            30 | 24 | 23 | 22 | 19 | 18 | 16 | 10 => 4,
            29 | 28 | 27 | 26 | 25 | 21 | 20 | 17 | 15 => 8,
            14 | 13 => 44,
            12 | 11 => 52,
            _ => unreachable!("bit {bit}"),
        }
    }

    fn width_at(p: &[u8], bit: u32, at: usize) -> usize {
        match bit {
            9 => 8 + 4 * word(p, at + 4) as usize,
            8 => {
                let (w0, w1) = (word(p, at), word(p, at + 4));
                let n = ((w0 >> 16) & 0x1FF) + (w0 & 0x1FF) + ((w1 >> 16) & 0xFFFF) + (w1 & 0x7FFF) * (1 + ((w1 >> 15) & 1));
                8 + 4 * n as usize
            }
            b => fixed_width(b),
        }
    }

    fn naive_offset(p: &[u8], field: ContextField) -> i32 {
        let cif0 = word(p, 0);
        let mut off = 4 + 4 * (cif0 & 0x6).count_ones() as usize;
        for bit in (8..=30).rev() {
            let f = 1u32 << bit;
            if f == field.bit() {
                return if cif0 & f != 0 { off as i32 } else { -(off as i32) };
            }
            if cif0 & f != 0 {
                off += width_at(p, bit, off);
            }
        }
        off as i32
    }

    /// Lays out a payload for `cif0`, with real length words in the two
    /// variable sections.
    fn build_payload(cif0: u32, gps_words: u32, lists: (u32, u32, u32, u32, bool)) -> Vec<u8> {
        let mut p = cif0.to_be_bytes().to_vec();
        p.extend(std::iter::repeat(0u8).take(4 * (cif0 & 0x6).count_ones() as usize));
        for bit in (8..=30).rev() {
            if cif0 & (1 << bit) == 0 {
                continue;
            }
            match bit {
                9 => {
                    p.extend(0x00AB_CDEFu32.to_be_bytes());
                    p.extend(gps_words.to_be_bytes());
                    p.extend(std::iter::repeat(b'A').take(4 * gps_words as usize));
                }
                8 => {
                    let (src, sys, vec, asy, tag) = lists;
                    p.extend(((src << 16) | sys).to_be_bytes());
                    p.extend(((vec << 16) | ((tag as u32) << 15) | asy).to_be_bytes());
                    let n = src + sys + vec + asy * (1 + tag as u32);
                    p.extend(std::iter::repeat(0x5Au8).take(4 * n as usize));
                }
                b => p.extend(std::iter::repeat(0u8).take(fixed_width(b))),
            }
        }
        p
    }

    fn all_targets() -> Vec<ContextField> {
        let mut v = ContextField::FIELDS.to_vec();
        v.push(ContextField::ContextEnd);
        v
    }

// # ✅ 1. Exhaustive over the low 20 field bits (8..27)

    #[test]
    fn offsets_match_naive_for_low_twenty_bits() {
        // Zero-filled payload: both variable sections are 8 bytes long.
        let mut p = vec![0u8; 1024];
        let targets = all_targets();
        for low in 0u32..(1 << 20) {
            let cif0 = low << 8;
            p[0..4].copy_from_slice(&cif0.to_be_bytes());
            let field = targets[(low as usize) % targets.len()];
            assert_eq!(context_offset(&p, field).unwrap(), naive_offset(&p, field), "cif0 0x{cif0:08x} {field:?}");
            assert_eq!(
                context_offset(&p, ContextField::ContextEnd).unwrap(),
                naive_offset(&p, ContextField::ContextEnd)
            );
        }
    }

    #[test]
    fn every_field_for_selected_masks() {
        let mut p = vec![0u8; 1024];
        for cif0 in [0u32, FIELD_BITS, 0x2000_0000, 0x0000_1800, 0x0000_0300, 0xA5A5_A500 & FIELD_BITS, 0x8000_0006 | 0x0000_0200] {
            p[0..4].copy_from_slice(&cif0.to_be_bytes());
            for field in all_targets() {
                assert_eq!(context_offset(&p, field).unwrap(), naive_offset(&p, field), "cif0 0x{cif0:08x} {field:?}");
            }
        }
    }

// # ✅ 2. Sampled above 20 bits, real variable sections

    proptest! {
        #[test]
        fn offsets_match_naive_sampled(
            bits in any::<u32>(),
            gps_words in 0u32..6,
            src in 0u32..4, sys in 0u32..4, vec in 0u32..4, asy in 0u32..4, tag in any::<bool>(),
        ) {
            let cif0 = bits & FIELD_BITS;
            let p = build_payload(cif0, gps_words, (src, sys, vec, asy, tag));
            for field in all_targets() {
                prop_assert_eq!(context_offset(&p, field).unwrap(), naive_offset(&p, field));
            }
            prop_assert_eq!(context_end(&p).unwrap(), p.len());
        }
    }

// # ✅ 3. Special cases

    #[test]
    fn cif0_is_always_offset_zero() {
        assert_eq!(context_offset(&[], ContextField::Cif0).unwrap(), 0);
        assert_eq!(context_offset(&0xFFFF_FFFFu32.to_be_bytes(), ContextField::Cif0).unwrap(), 0);
    }

    #[test]
    fn cif_words_sit_right_after_cif0() {
        let p = build_payload(0x2000_0006, 0, (0, 0, 0, 0, false));
        assert_eq!(context_offset(&p, ContextField::Cif1).unwrap(), 4);
        assert_eq!(context_offset(&p, ContextField::Cif2).unwrap(), 8);
        assert_eq!(context_offset(&p, ContextField::Bandwidth).unwrap(), 12);

        let p = build_payload(0x2000_0004, 0, (0, 0, 0, 0, false));
        assert_eq!(context_offset(&p, ContextField::Cif1).unwrap(), -4);
        assert_eq!(context_offset(&p, ContextField::Cif2).unwrap(), 4);
        assert_eq!(context_offset(&p, ContextField::Bandwidth).unwrap(), 8);
    }

    #[test]
    fn ephemeris_fields_are_fifty_two_bytes() {
        let p = build_payload(0x0000_1800, 0, (0, 0, 0, 0, false));
        assert_eq!(context_offset(&p, ContextField::EcefEphemeris).unwrap(), 4);
        assert_eq!(context_offset(&p, ContextField::RelativeEphemeris).unwrap(), 56);
        assert_eq!(context_end(&p).unwrap(), 108);
    }

    #[test]
    fn association_lists_follow_gps_ascii() {
        let p = build_payload(0x0000_0300, 3, (1, 2, 0, 2, true));
        assert_eq!(context_offset(&p, ContextField::GpsAscii).unwrap(), 4);
        assert_eq!(context_offset(&p, ContextField::ContextAssociationLists).unwrap(), 4 + 8 + 12);
        // 8 + 4·(1 + 2 + 0 + 2·2)
        assert_eq!(context_end(&p).unwrap(), 24 + 36);
    }

    #[test]
    fn truncated_variable_section_is_an_error() {
        let mut p = build_payload(0x0000_0200, 2, (0, 0, 0, 0, false));
        p.truncate(6);
        assert!(matches!(
            context_offset(&p, ContextField::ContextEnd),
            Err(PacketError::Truncated { .. })
        ));
        assert!(matches!(context_offset(&[0, 0], ContextField::Bandwidth), Err(PacketError::Truncated { .. })));
    }

    #[test]
    fn oversized_gps_word_count_is_truncated() {
        let p = build_payload(0x0000_0300, 1, (0, 0, 0, 0, false));
        let len = p.len();
        for words in [4u32, 0x2000_0000, 0x3FFF_FFF0, u32::MAX] {
            let mut bad = p.clone();
            bad[8..12].copy_from_slice(&words.to_be_bytes());
            for field in [ContextField::ContextEnd, ContextField::ContextAssociationLists] {
                match context_offset(&bad, field) {
                    Err(PacketError::Truncated { needed, available }) => {
                        assert_eq!(available, len);
                        assert!(needed > len, "0x{words:08x}");
                    }
                    other => panic!("0x{words:08x} {field:?}: {other:?}"),
                }
            }
            assert!(context_end(&bad).is_err());
            // Fields in front of the block do not read it.
            assert_eq!(context_offset(&bad, ContextField::GpsAscii).unwrap(), 4);
        }
    }

    #[test]
    fn oversized_association_lists_are_truncated() {
        let mut p = build_payload(0x0000_0100, 0, (1, 0, 0, 0, false));
        assert_eq!(context_end(&p).unwrap(), 16);
        p[4..8].copy_from_slice(&0x01FF_01FFu32.to_be_bytes());
        assert!(matches!(
            context_offset(&p, ContextField::ContextEnd),
            Err(PacketError::Truncated { available: 16, .. })
        ));
    }

    #[test]
    fn valid_packet_with_lying_gps_count_has_no_context_end() {
        let mut p = Packet::new_context();
        p.set_gps_ascii(Some(&GpsAscii { oui: 0x12_3456, text: b"ABCD".to_vec() })).unwrap();
        let mut bytes = p.to_bytes();
        let count_at = bytes.len() - p.payload_len() + 8;
        bytes[count_at..count_at + 4].copy_from_slice(&0x3FFF_FFF0u32.to_be_bytes());

        let q = Packet::from_bytes(&bytes).unwrap();
        assert!(q.is_valid());
        assert!(matches!(q.context_offset(ContextField::ContextEnd), Err(PacketError::Truncated { .. })));
        assert!(matches!(q.gps_ascii(), Err(PacketError::Truncated { .. })));
    }
}
