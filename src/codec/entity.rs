// RFC 1866 character entity table.
//
// Names are kept in byte-wise sorted order, so every prefix selects a
// contiguous run of entries. The decoder narrows that run one character at
// a time instead of scanning the table.

use std::ops::Range;

/// `(name, code point)` pairs, sorted by name.
pub const ENTITIES: &[(&str, u8)] = &[
    ("AElig", 198),
    ("Aacute", 193),
    ("Acirc", 194),
    ("Agrave", 192),
    ("Aring", 197),
    ("Atilde", 195),
    ("Auml", 196),
    ("Ccedil", 199),
    ("ETH", 208),
    ("Eacute", 201),
    ("Ecirc", 202),
    ("Egrave", 200),
    ("Euml", 203),
    ("Iacute", 205),
    ("Icirc", 206),
    ("Igrave", 204),
    ("Iuml", 207),
    ("Ntilde", 209),
    ("Oacute", 211),
    ("Ocirc", 212),
    ("Ograve", 210),
    ("Oslash", 216),
    ("Otilde", 213),
    ("Ouml", 214),
    ("THORN", 222),
    ("Uacute", 218),
    ("Ucirc", 219),
    ("Ugrave", 217),
    ("Uuml", 220),
    ("Yacute", 221),
    ("aacute", 225),
    ("acirc", 226),
    ("acute", 180),
    ("aelig", 230),
    ("agrave", 224),
    ("amp", 38),
    ("aring", 229),
    ("atilde", 227),
    ("auml", 228),
    ("brvbar", 166),
    ("ccedil", 231),
    ("cedil", 184),
    ("cent", 162),
    ("copy", 169),
    ("curren", 164),
    ("deg", 176),
    ("divide", 247),
    ("eacute", 233),
    ("ecirc", 234),
    ("egrave", 232),
    ("eth", 240),
    ("euml", 235),
    ("frac12", 189),
    ("frac14", 188),
    ("frac34", 190),
    ("gt", 62),
    ("iacute", 237),
    ("icirc", 238),
    ("iexcl", 161),
    ("igrave", 236),
    ("iquest", 191),
    ("iuml", 239),
    ("laquo", 171),
    ("lt", 60),
    ("macr", 175),
    ("micro", 181),
    ("middot", 183),
    ("nbsp", 160),
    ("not", 172),
    ("ntilde", 241),
    ("oacute", 243),
    ("ocirc", 244),
    ("ograve", 242),
    ("ordf", 170),
    ("ordm", 186),
    ("oslash", 248),
    ("otilde", 245),
    ("ouml", 246),
    ("para", 182),
    ("plusmn", 177),
    ("pound", 163),
    ("quot", 34),
    ("raquo", 187),
    ("reg", 174),
    ("sect", 167),
    ("shy", 173),
    ("sup1", 185),
    ("sup2", 178),
    ("sup3", 179),
    ("szlig", 223),
    ("thorn", 254),
    ("times", 215),
    ("uacute", 250),
    ("ucirc", 251),
    ("ugrave", 249),
    ("uml", 168),
    ("uuml", 252),
    ("yacute", 253),
    ("yen", 165),
    ("yuml", 255),
];

/// All entries.
#[inline]
pub fn all() -> Range<usize> {
    0..ENTITIES.len()
}

/// Narrow `range`, whose names share a prefix of `depth` bytes, to the
/// names whose next byte is `b`.
pub fn narrow(range: Range<usize>, depth: usize, b: u8) -> Range<usize> {
    let run = &ENTITIES[range.clone()];
    let key = |name: &str| name.as_bytes().get(depth).copied();
    // Names ending at `depth` sort first (`None < Some(_)`).
    let lo = run.partition_point(|&(name, _)| key(name) < Some(b));
    let hi = run.partition_point(|&(name, _)| key(name) <= Some(b));
    range.start + lo..range.start + hi
}

/// The entry of `range` whose name is exactly `depth` bytes long.
pub fn exact(range: Range<usize>, depth: usize) -> Option<u8> {
    ENTITIES
        .get(range)?
        .first()
        .filter(|(name, _)| name.len() == depth)
        .map(|&(_, value)| value)
}

/// Look an entity up by name.
pub fn lookup(name: &str) -> Option<u8> {
    ENTITIES
        .binary_search_by(|&(n, _)| n.cmp(name))
        .ok()
        .map(|i| ENTITIES[i].1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
