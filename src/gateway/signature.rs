//! Confirmation signature verification.
//!
//! The gateway signs `"{remote_order_id}|{payment_id}"` with HMAC-SHA256
//! keyed by the shared secret and sends the hex digest along with the
//! redirect. The concatenation format is fixed; any drift breaks
//! verification for every legitimate payment.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    Some(mac)
}

/// Hex digest the gateway is expected to have produced.
pub fn expected(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> Option<String> {
    mac_for(secret, gateway_order_id, gateway_payment_id)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of the supplied hex signature against the
/// recomputed one. Anything malformed verifies as false.
pub fn verify(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    supplied: &str,
) -> bool {
    let Some(mac) = mac_for(secret, gateway_order_id, gateway_payment_id) else {
        return false;
    };
    let Ok(raw) = hex::decode(supplied) else {
        return false;
    };
    mac.verify_slice(&raw).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "gw-test-secret";

    #[test]
    fn test_roundtrip_verifies() {
        let sig = expected(SECRET, "order_abc", "pay_xyz").unwrap();
        assert!(verify(SECRET, "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn test_tampered_fields_fail() {
        let sig = expected(SECRET, "order_abc", "pay_xyz").unwrap();
        assert!(!verify(SECRET, "order_abc", "pay_other", &sig));
        assert!(!verify(SECRET, "order_other", "pay_xyz", &sig));
        assert!(!verify("other-secret", "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn test_malformed_signature_fails() {
        assert!(!verify(SECRET, "order_abc", "pay_xyz", "not hex at all"));
        assert!(!verify(SECRET, "order_abc", "pay_xyz", ""));
    }
}
