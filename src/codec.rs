//! # Code Page Transcoding
//!
//! Field names, character fields and text memos are stored in the table's
//! legacy code page. The caller supplies a [`Codec`] at open time; foxdbf never
//! guesses one from the header's code-page byte.
//!
//! `encoding_rs` statics (`&'static Encoding`) implement `Codec`, so they can
//! be passed directly:
//!
//! ```ignore
//! let table = Table::open("contacts.dbf", encoding_rs::WINDOWS_1252)?;
//! ```
//!
//! The decoding entry point writes into a caller-provided buffer so that the
//! record decoder can transcode into pooled scratch space.

use std::sync::Arc;

use encoding_rs::Encoding;

pub trait Codec: Send + Sync {
    /// Upper bound of UTF-8 bytes produced for `byte_len` input bytes.
    fn max_decoded_len(&self, byte_len: usize) -> usize;

    /// Decodes `src` into `dst` as UTF-8 and returns the number of bytes written.
    ///
    /// `dst` must be at least `max_decoded_len(src.len())` long. Unmappable
    /// input is replaced, never reported.
    fn decode_to_utf8(&self, src: &[u8], dst: &mut [u8]) -> usize;

    fn decode_string(&self, src: &[u8]) -> String {
        let mut buf = vec![0u8; self.max_decoded_len(src.len())];
        let written = self.decode_to_utf8(src, &mut buf);
        buf.truncate(written);
        String::from_utf8(buf)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}

impl Codec for &'static Encoding {
    fn max_decoded_len(&self, byte_len: usize) -> usize {
        self.new_decoder_without_bom_handling()
            .max_utf8_buffer_length(byte_len)
            .unwrap_or(byte_len.saturating_mul(3))
    }

    fn decode_to_utf8(&self, src: &[u8], dst: &mut [u8]) -> usize {
        let mut decoder = self.new_decoder_without_bom_handling();
        let (_, _, written, _) = decoder.decode_to_utf8(src, dst, true);
        written
    }
}

impl<C: Codec + ?Sized> Codec for Arc<C> {
    fn max_decoded_len(&self, byte_len: usize) -> usize {
        (**self).max_decoded_len(byte_len)
    }

    fn decode_to_utf8(&self, src: &[u8], dst: &mut [u8]) -> usize {
        (**self).decode_to_utf8(src, dst)
    }
}

/// Converts the accepted codec arguments into the shared form stored by tables.
pub trait IntoCodec {
    fn into_codec(self) -> Arc<dyn Codec>;
}

impl IntoCodec for &'static Encoding {
    fn into_codec(self) -> Arc<dyn Codec> {
        Arc::new(self)
    }
}

impl IntoCodec for Arc<dyn Codec> {
    fn into_codec(self) -> Arc<dyn Codec> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_1252_decodes_high_bytes() {
        let codec = encoding_rs::WINDOWS_1252;
        assert_eq!(codec.decode_string(b"M\xfcller"), "Müller");
    }

    #[test]
    fn decode_to_utf8_reports_written_length() {
        let codec = encoding_rs::WINDOWS_1252;
        let mut dst = vec![0u8; codec.max_decoded_len(3)];

        let written = codec.decode_to_utf8(b"\xe4bc", &mut dst);

        assert_eq!(&dst[..written], "äbc".as_bytes());
    }

    #[test]
    fn static_encoding_is_usable_as_dyn_codec() {
        let codec: &dyn Codec = &encoding_rs::WINDOWS_1252;
        assert!(codec.max_decoded_len(4) >= 4);
        assert_eq!(codec.decode_string(b"Caf\xe9"), "Café");
    }

    #[test]
    fn shared_codec_delegates() {
        let codec: Arc<dyn Codec> = encoding_rs::IBM866.into_codec();
        assert_eq!(codec.decode_string(b"\x80"), "А");
    }
}
