//! Share codes for run seeds.
//! Code format: MM-<WORD><NN>, e.g. MM-LANTERN42, MM-MINOTAUR07

const PREFIX: &str = "MM";

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub const WORD_LIST: [&str; 64] = [
    "LANTERN", "MINOTAUR", "THESEUS", "ARIADNE", "THREAD", "CORRIDOR", "PASSAGE", "GATE", "KEY",
    "LOCK", "RIDDLE", "ORACLE", "SPHINX", "TORCH", "SHADOW", "ECHO", "COMPASS", "MAP", "HEDGE",
    "GARDEN", "TOWER", "CRYPT", "VAULT", "CAVERN", "TUNNEL", "BRIDGE", "STAIRS", "DOOR", "WALL",
    "FLOOR", "CORNER", "TURN", "FORK", "DEADEND", "EXIT", "ENTRY", "QUEST", "CLUE", "LOGIC",
    "REASON", "FACT", "SOURCE", "PROOF", "DOUBT", "INSIGHT", "LOGOS", "SOCRATES", "PLATO", "EUCLID",
    "CIPHER", "CODEX", "SCROLL", "RUNE", "GLYPH", "PUZZLE", "PRISM", "MIRROR", "BEACON", "SIGNAL",
    "CIRCUIT", "NEURON", "PIXEL", "SEED", "SPARK",
];

const WORD_BITS: u32 = 6;
const WORD_MASK: u64 = (1 << WORD_BITS) - 1;
const NN_MASK: u64 = 0x7F;

fn compose_seed(word_index: u8, nn: u8) -> u64 {
    let packed = (u64::from(word_index) & WORD_MASK) | ((u64::from(nn) & NN_MASK) << WORD_BITS);
    let mut buf = [0u8; 6];
    buf[..3].copy_from_slice(b"MM-");
    buf[3] = word_index;
    buf[4] = nn;
    buf[5] = 0x5A;
    let low_mask = (1u64 << (WORD_BITS + 7)) - 1;
    (fnv1a64(&buf) & !low_mask) | packed
}

/// Friendly code for `seed`. Only the low bits select the word and number, so distinct seeds
/// may share a code; decoding yields a canonical seed with the same code.
#[must_use]
pub fn encode_share_code(seed: u64) -> String {
    let word_index = usize::try_from(seed & WORD_MASK).unwrap_or(0);
    let nn = ((seed >> WORD_BITS) & NN_MASK) % 100;
    let word = WORD_LIST.get(word_index).copied().unwrap_or(WORD_LIST[0]);
    format!("{PREFIX}-{word}{nn:02}")
}

/// Canonical seed for a share code, case-insensitive.
#[must_use]
pub fn decode_share_code(code: &str) -> Option<u64> {
    let (prefix, rest) = code.trim().split_once('-')?;
    if !prefix.eq_ignore_ascii_case(PREFIX) || rest.len() < 3 || !rest.is_ascii() {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    if !nn_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nn: u8 = nn_part.parse().ok()?;
    let word = normalize_word(word_part);
    let index = WORD_LIST.iter().position(|w| *w == word)?;
    Some(compose_seed(u8::try_from(index).ok()?, nn))
}

/// Fresh code from arbitrary entropy (clock, OS randomness).
#[must_use]
pub fn code_from_entropy(entropy: u64) -> String {
    let index = u8::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_share_code(compose_seed(index, nn))
}

/// Accept either a plain decimal seed or a share code.
#[must_use]
pub fn parse_seed(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| decode_share_code(trimmed))
}
