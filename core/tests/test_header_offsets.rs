// Header offset algorithm against a plain loop over the optional fields,
// for every possible control word.

#[cfg(test)]
mod tests {
    use vrt_core::header::{header_length, header_offset, presence_vector, HeaderField, PacketType};
    use vrt_core::packet::Packet;

    /// Walks the optional fields in wire order and sums widths.
    fn naive_offset(control: u16, field: HeaderField) -> i32 {
        let ptype = (control >> 12) as u8;
        let present = [
            (ptype & 0x5) != 0,           // stream id
            control & 0x0800 != 0,        // class id
            (control >> 6) & 0x3 != 0,    // integer time
            (control >> 4) & 0x3 != 0,    // fractional time
            true,                         // payload
        ];
        let mut off = 4;
        for (i, f) in HeaderField::ALL.iter().enumerate() {
            if *f == field {
                return if present[i] { off } else { -off };
            }
            if present[i] {
                off += f.width() as i32;
            }
        }
        unreachable!()
    }

// # ✅ 1. Exhaustive equivalence over the 16-bit control word

    #[test]
    fn offsets_match_naive_for_every_control_word() {
        for control in 0..=u16::MAX {
            for field in HeaderField::ALL {
                assert_eq!(
                    header_offset(control, field),
                    naive_offset(control, field),
                    "control 0x{control:04x} field {field:?}"
                );
            }
        }
    }

    #[test]
    fn payload_bit_is_always_on() {
        for control in [0u16, 0x0000, 0xFFFF, 0x1C60, 0x4860] {
            assert_ne!(presence_vector(control) & 0x10, 0);
            assert!(header_offset(control, HeaderField::Payload) > 0);
        }
    }

// # ✅ 2. Known layouts

    #[test]
    fn default_data_header_layout() {
        let c = 0x1C60;
        assert_eq!(header_offset(c, HeaderField::StreamId), 4);
        assert_eq!(header_offset(c, HeaderField::ClassId), 8);
        assert_eq!(header_offset(c, HeaderField::IntegerTime), 16);
        assert_eq!(header_offset(c, HeaderField::FractionalTime), 20);
        assert_eq!(header_length(c), 28);
    }

    #[test]
    fn absent_fields_report_insertion_point() {
        // Unidentified data, no class id, no time stamps.
        let c = 0x0000;
        assert_eq!(header_offset(c, HeaderField::StreamId), -4);
        assert_eq!(header_offset(c, HeaderField::ClassId), -4);
        assert_eq!(header_offset(c, HeaderField::FractionalTime), -4);
        assert_eq!(header_length(c), 4);

        // Data with stream id and fractional time only.
        let c = 0x1010;
        assert_eq!(header_offset(c, HeaderField::ClassId), -8);
        assert_eq!(header_offset(c, HeaderField::IntegerTime), -8);
        assert_eq!(header_offset(c, HeaderField::FractionalTime), 8);
        assert_eq!(header_length(c), 16);
    }

    #[test]
    fn stream_id_follows_packet_type() {
        for t in 0u8..16 {
            let c = (t as u16) << 12;
            let has = header_offset(c, HeaderField::StreamId) > 0;
            assert_eq!(has, PacketType::from(t).has_stream_id(), "type {t}");
        }
    }

// # ✅ 3. Stream code from a bare default packet

    #[test]
    fn stream_code_from_default_packets() {
        let mut data = Packet::new_data();
        data.set_stream_id(0x1234_5678).unwrap();
        assert_eq!(data.stream_code(), (0x1u64 << 60) | 0x1234_5678);

        let ctx = Packet::new_context();
        assert_eq!(ctx.stream_code(), 0x4u64 << 60);

        let unident = Packet::new(PacketType::UnidentifiedData).unwrap();
        assert_eq!(unident.stream_code(), 0);
    }
}
