//! Request signing for the private API.
//!
//! The server's scheme, which must be matched byte for byte:
//! 1. SHA256(nonce + url-encoded POST data)
//! 2. HMAC-SHA512(uri_path + sha256_digest, base64-decoded secret)
//! 3. Base64 encode the result, sent in the `API-Sign` header

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use crate::error::{ApiError, ApiResult};

type HmacSha512 = Hmac<Sha512>;

/// Sign a private request. `params` must already contain the `nonce` entry
/// and is encoded in insertion order. Pure function: fixed inputs give a
/// fixed signature; in practice the nonce makes every request unique.
///
/// Fails if the secret is not valid base64, so a bad key surfaces as a
/// configuration error instead of a silently wrong signature.
pub fn sign_request(urlpath: &str, secret_b64: &str, params: &[(String, String)]) -> ApiResult<String> {
    let nonce = params
        .iter()
        .find(|(name, _)| name == "nonce")
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| ApiError::Signing("request parameters are missing a nonce".into()))?;

    let postdata = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();

    let mut sha256 = Sha256::new();
    sha256.update(nonce.as_bytes());
    sha256.update(postdata.as_bytes());
    let digest = sha256.finalize();

    let secret = BASE64.decode(secret_b64)?;
    let mut mac = HmacSha512::new_from_slice(&secret).expect("HMAC can take keys of any size");
    mac.update(urlpath.as_bytes());
    mac.update(&digest);

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Base64 encoded "test_secret_key_12345"
    const TEST_SECRET_B64: &str = "dGVzdF9zZWNyZXRfa2V5XzEyMzQ1";

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn known_answer_vector() {
        // Published reference vector for this signing scheme.
        let secret = "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";
        let data = params(&[
            ("nonce", "1616492376594"),
            ("ordertype", "limit"),
            ("pair", "XBTUSD"),
            ("price", "37500"),
            ("type", "buy"),
            ("volume", "1.25"),
        ]);
        let signature = sign_request("/0/private/AddOrder", secret, &data).unwrap();
        assert_eq!(
            signature,
            "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ=="
        );
    }

    #[test]
    fn fixed_inputs_give_fixed_signature() {
        let data = params(&[("nonce", "1234567890"), ("trades", "true")]);
        let sig1 = sign_request("/0/private/OpenOrders", TEST_SECRET_B64, &data).unwrap();
        let sig2 = sign_request("/0/private/OpenOrders", TEST_SECRET_B64, &data).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn signature_changes_with_nonce() {
        let first = params(&[("nonce", "1234567890"), ("trades", "true")]);
        let second = params(&[("nonce", "1234567891"), ("trades", "true")]);
        let sig1 = sign_request("/0/private/OpenOrders", TEST_SECRET_B64, &first).unwrap();
        let sig2 = sign_request("/0/private/OpenOrders", TEST_SECRET_B64, &second).unwrap();
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn signature_changes_with_path() {
        let data = params(&[("nonce", "1234567890")]);
        let sig1 = sign_request("/0/private/Balance", TEST_SECRET_B64, &data).unwrap();
        let sig2 = sign_request("/0/private/OpenOrders", TEST_SECRET_B64, &data).unwrap();
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn invalid_base64_secret_is_an_error() {
        let data = params(&[("nonce", "1234567890")]);
        let err = sign_request("/0/private/OpenOrders", "not-valid-base64!!!", &data).unwrap_err();
        assert!(matches!(err, ApiError::InvalidSecret(_)));
    }

    #[test]
    fn missing_nonce_is_an_error() {
        let data = params(&[("trades", "true")]);
        let err = sign_request("/0/private/OpenOrders", TEST_SECRET_B64, &data).unwrap_err();
        assert!(matches!(err, ApiError::Signing(_)));
    }

    #[test]
    fn signature_is_base64_of_64_bytes() {
        let data = params(&[("nonce", "123")]);
        let signature = sign_request("/0/private/Balance", TEST_SECRET_B64, &data).unwrap();
        let decoded = BASE64.decode(&signature).unwrap();
        assert_eq!(decoded.len(), 64);
    }
}
