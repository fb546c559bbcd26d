//! Obfuscation of catalog image file names on the public CDN.
//!
//! Four hex characters taken from positions 24, 32, 6 and 12 of the stem are
//! shifted by +7 (mod 16) and inserted after every sixth character of the first
//! 24, so a 34-character stem becomes 38 characters long.

/// Shortest stem the codec rewrites.
pub const MIN_STEM_LEN: usize = 34;
/// Positions the shifted characters are inserted at (in the encoded stem).
const INSERTED_AT: [usize; 4] = [6, 13, 20, 27];
/// Source positions of the shifted characters (in the plain stem).
const TAKEN_FROM: [usize; 4] = [24, 32, 6, 12];

fn shift_hex(c: u8) -> Option<u8> {
    let digit = match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => return None,
    };
    let shifted = (digit + 7) % 16;
    Some(if shifted < 10 {
        b'0' + shifted
    } else {
        b'a' + shifted - 10
    })
}

fn split_stem(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    }
}

fn encode_stem(stem: &str) -> Option<String> {
    if stem.len() < MIN_STEM_LEN || !stem.is_ascii() {
        return None;
    }
    let bytes = stem.as_bytes();
    let mut shifted = [0u8; 4];
    for (slot, &from) in shifted.iter_mut().zip(TAKEN_FROM.iter()) {
        *slot = shift_hex(bytes[from])?;
    }

    let mut out = String::with_capacity(stem.len() + 4);
    for (i, chunk_start) in [0usize, 6, 12, 18].into_iter().enumerate() {
        out.push_str(&stem[chunk_start..chunk_start + 6]);
        out.push(char::from(shifted[i]));
    }
    out.push_str(&stem[24..]);
    Some(out)
}

/// Encodes the stem of `name`; short, non-ASCII or non-hex stems pass through.
pub fn encode(name: &str) -> String {
    let (stem, ext) = split_stem(name);
    match encode_stem(stem) {
        Some(encoded) => format!("{}{}", encoded, ext),
        None => name.to_string(),
    }
}

/// Inverse of [`encode`]: drops the inserted characters from stems of at least 38 characters.
pub fn decode(name: &str) -> String {
    let (stem, ext) = split_stem(name);
    if stem.len() < MIN_STEM_LEN + INSERTED_AT.len() || !stem.is_ascii() {
        return name.to_string();
    }
    let plain: String = stem
        .char_indices()
        .filter(|(i, _)| !INSERTED_AT.contains(i))
        .map(|(_, c)| c)
        .collect();
    format!("{}{}", plain, ext)
}

/// Inserts `suffix` before the extension, or appends it when there is none.
pub fn add_suffix(name: &str, suffix: &str) -> String {
    let (stem, ext) = split_stem(name);
    format!("{}{}{}", stem, suffix, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_catalog_name() {
        let encoded = encode("10603a19f1becb348842b54fd132dd1403.jpeg");
        assert_eq!(encoded, "10603a419f1be7cb3488842b54f3d132dd1403.jpeg");
        assert_eq!(
            add_suffix(&encoded, "0005"),
            "10603a419f1be7cb3488842b54f3d132dd14030005.jpeg"
        );
    }

    #[test]
    fn decode_recovers_the_stem() {
        let names = [
            "05375f5bf51cd0207d02e5655f14e89cb.jpeg",
            "10603a19f1becb348842b54fd132dd1403.jpeg",
            "ffffffffffffffffffffffffffffffffff0123",
            "0123456789abcdef0123456789abcdef01.png",
        ];
        for name in names {
            assert_eq!(decode(&encode(name)), name, "{}", name);
        }
    }

    #[test]
    fn short_and_unusual_names_pass_through() {
        assert_eq!(encode("short.png"), "short.png");
        assert_eq!(encode("0123456789abcdef0123456789abcdef0"), "0123456789abcdef0123456789abcdef0");
        assert_eq!(encode("ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ.jpg"), "ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ.jpg");
        assert_eq!(decode("short.png"), "short.png");
    }

    #[test]
    fn suffix_without_extension() {
        assert_eq!(add_suffix("image", "0005"), "image0005");
        assert_eq!(add_suffix("a.b.jpg", "0005"), "a.b0005.jpg");
    }
}
