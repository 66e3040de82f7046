use proptest::prelude::*;

use veritag_types::{
    is_hex_digest, ContentHash, ScanPayload, Timestamp, TypesError, VerificationRequest,
};

proptest! {
    /// Any 32-byte value rendered as hex has the digest shape.
    #[test]
    fn hex_encoded_bytes_are_digests(bytes in prop::array::uniform32(0u8..)) {
        let encoded: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        prop_assert!(is_hex_digest(&encoded));
        prop_assert!(is_hex_digest(&encoded.to_ascii_uppercase()));
    }

    /// Strings of the wrong length never pass the digest shape check.
    #[test]
    fn wrong_length_is_never_a_digest(s in "[0-9a-f]{0,63}") {
        prop_assert!(!is_hex_digest(&s));
    }

    /// A content address matches its own bytes and nothing it was not computed from.
    #[test]
    fn content_hash_binds_bytes(data in prop::collection::vec(any::<u8>(), 0..256), flip in any::<u8>()) {
        let hash = ContentHash::of(&data);
        prop_assert!(hash.addresses(&data));
        let mut tampered = data.clone();
        tampered.push(flip);
        prop_assert!(!hash.addresses(&tampered));
    }

    /// Stepping back in days never moves a timestamp forward.
    #[test]
    fn days_before_is_monotone(secs in 0u64..u64::MAX / 2, days in 0u64..100_000) {
        let ts = Timestamp::new(secs);
        prop_assert!(ts.days_before(days) <= ts);
    }

    /// Shape validation accepts every positive product id and only those.
    #[test]
    fn product_id_validation(id in proptest::option::of(0u64..1_000_000), qr in ".{0,80}") {
        let request = VerificationRequest {
            product_id: id,
            claimed_qr_hash: qr,
            ..Default::default()
        };
        match (id, ScanPayload::from_request(request)) {
            (Some(n), Ok(payload)) if n > 0 => prop_assert_eq!(payload.product_id().get(), n),
            (Some(0) | None, Err(TypesError::MissingProductId)) => {}
            (id, other) => prop_assert!(false, "unexpected result for {:?}: {:?}", id, other),
        }
    }
}
