//! Identifier and image codec.
//!
//! Checkplot identifiers are file names that may contain arbitrary UTF-8.
//! They are embedded in backend URLs as percent-encoded standard base64 of
//! their UTF-8 bytes; the backend reverses both steps.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::errors::CoreError;

/// MIME type the backend renders every checkplot image as.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Encode a checkplot identifier into a URL-safe path token.
#[must_use]
pub fn encode_identifier(raw: &str) -> String {
    let b64 = STANDARD.encode(raw.as_bytes());
    urlencoding::encode(&b64).into_owned()
}

/// Decode a path token produced by [`encode_identifier`].
///
/// # Errors
///
/// Returns [`CoreError::InvalidToken`] if the token is not percent-encoded
/// base64 of valid UTF-8.
pub fn decode_identifier(token: &str) -> Result<String, CoreError> {
    let invalid = |reason: String| CoreError::InvalidToken {
        token: token.to_string(),
        reason,
    };

    let b64 = urlencoding::decode(token).map_err(|e| invalid(e.to_string()))?;
    let bytes = STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| invalid(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))
}

/// A displayable image: a `data:` URI wrapping the backend payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSurface {
    data_uri: String,
}

impl ImageSurface {
    #[must_use]
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Length of the wrapped payload in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.data_uri
            .split_once(',')
            .map_or(0, |(_, payload)| payload.len())
    }
}

/// Wrap a base64 image payload for display.
///
/// The payload is not validated: a malformed payload renders as a broken
/// image rather than failing.
#[must_use]
pub fn decode_image(payload: &str, mime: &str) -> ImageSurface {
    ImageSurface {
        data_uri: format!("data:{mime};base64,{payload}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("obj001.pkl")]
    #[case("checkplot-HAT-123-0001234.pkl.gz")]
    #[case("/data/checkplots/field 07/obj+1=2.pkl")]
    #[case("星雲-ngc2264.pkl")]
    #[case("Ωmega Centauri ✦ 01.pkl")]
    #[case("")]
    fn identifier_roundtrip(#[case] raw: &str) {
        let token = encode_identifier(raw);
        assert_eq!(decode_identifier(&token).unwrap(), raw);
    }

    #[test]
    fn token_is_url_safe() {
        // Base64 of these bytes contains '+' and '='.
        let token = encode_identifier("??>>~~ü");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '%' | '-' | '_' | '.' | '~'))
        );
    }

    #[test]
    fn token_matches_backend_format() {
        // base64("obj001.pkl") == "b2JqMDAxLnBrbA==", '=' percent-encoded
        assert_eq!(encode_identifier("obj001.pkl"), "b2JqMDAxLnBrbA%3D%3D");
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_identifier("!!!not-base64").unwrap_err();
        assert!(matches!(err, CoreError::InvalidToken { .. }));
    }

    #[test]
    fn decode_rejects_non_utf8() {
        let token = urlencoding::encode(&STANDARD.encode([0xff, 0xfe])).into_owned();
        assert!(decode_identifier(&token).is_err());
    }

    #[test]
    fn image_surface_wraps_payload_verbatim() {
        let surface = decode_image("not really png", DEFAULT_IMAGE_MIME);
        assert_eq!(surface.data_uri(), "data:image/png;base64,not really png");
        assert_eq!(surface.payload_len(), 14);
    }
}
