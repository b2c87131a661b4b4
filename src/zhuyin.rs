//! Pinyin to zhuyin (bopomofo) transliteration.
//!
//! Readings in the source are tone-marked pinyin, sometimes written
//! contiguously (`yīdiǎnr`) and sometimes space-separated. Letter runs are
//! segmented into syllables, each syllable is split into initial and final,
//! and the pieces are mapped through fixed tables. Anything that does not
//! segment cleanly passes through unchanged.

/// Converts a primary reading into the secondary notation.
pub trait Transliterator: Send + Sync {
    /// Transliterate a reading, keeping syllables space-separated.
    fn transliterate(&self, reading: &str) -> String;
}

/// Tone-marked pinyin to zhuyin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zhuyin;

impl Transliterator for Zhuyin {
    fn transliterate(&self, reading: &str) -> String {
        pinyin_to_zhuyin(reading)
    }
}

/// Transliterate pinyin to zhuyin.
///
/// # Examples
///
/// ```
/// use cidian::zhuyin::pinyin_to_zhuyin;
///
/// assert_eq!(pinyin_to_zhuyin("zhōngguó"), "ㄓㄨㄥ ㄍㄨㄛˊ");
/// assert_eq!(pinyin_to_zhuyin("yīdiǎnr"), "ㄧ ㄉㄧㄢˇㄦ");
/// assert_eq!(pinyin_to_zhuyin("le"), "˙ㄌㄜ");
/// ```
pub fn pinyin_to_zhuyin(reading: &str) -> String {
    let mut out = String::new();
    let mut chars = reading.chars().peekable();
    // A separator is owed before the next token.
    let mut pending_space = false;
    let mut after_syllable = false;

    while let Some(&c) = chars.peek() {
        if decompose(c).is_none() {
            chars.next();
            if c.is_whitespace() || matches!(c, '\'' | '’' | '·') {
                pending_space = !out.is_empty();
            } else {
                if pending_space {
                    out.push(' ');
                }
                out.push(c);
                pending_space = false;
            }
            after_syllable = false;
            continue;
        }

        let mut raw = String::new();
        let mut letters = Vec::new();
        while let Some(letter) = chars.peek().and_then(|&c| decompose(c)) {
            raw.extend(chars.next());
            letters.push(letter);
        }
        let digit_tone = chars
            .next_if(|&c| matches!(c, '1'..='5'))
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8);

        if pending_space || after_syllable {
            out.push(' ');
        }
        pending_space = false;

        match segment(&letters) {
            Some(mut syllables) => {
                if let (Some(tone), Some(last)) = (digit_tone, syllables.last_mut()) {
                    last.tone = tone;
                }
                for (i, syllable) in syllables.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    syllable.render(&mut out);
                }
                after_syllable = true;
            }
            None => {
                out.push_str(&raw);
                if let Some(tone) = digit_tone {
                    out.push(char::from(b'0' + tone));
                }
                after_syllable = false;
            }
        }
    }

    out
}

/// A pinyin letter with its tone mark removed. `ü` is folded to `v`.
#[derive(Debug, Clone, Copy)]
struct Letter {
    base: char,
    tone: u8,
}

fn decompose(c: char) -> Option<Letter> {
    let c = c.to_lowercase().next()?;
    let (base, tone) = match c {
        'a'..='z' => (c, 0),
        'ü' => ('v', 0),
        'ê' => ('e', 0),
        'ā' => ('a', 1),
        'á' => ('a', 2),
        'ǎ' => ('a', 3),
        'à' => ('a', 4),
        'ē' => ('e', 1),
        'é' | 'ế' => ('e', 2),
        'ě' => ('e', 3),
        'è' | 'ề' => ('e', 4),
        'ī' => ('i', 1),
        'í' => ('i', 2),
        'ǐ' => ('i', 3),
        'ì' => ('i', 4),
        'ō' => ('o', 1),
        'ó' => ('o', 2),
        'ǒ' => ('o', 3),
        'ò' => ('o', 4),
        'ū' => ('u', 1),
        'ú' => ('u', 2),
        'ǔ' => ('u', 3),
        'ù' => ('u', 4),
        'ǖ' => ('v', 1),
        'ǘ' => ('v', 2),
        'ǚ' => ('v', 3),
        'ǜ' => ('v', 4),
        'ń' => ('n', 2),
        'ň' => ('n', 3),
        'ǹ' => ('n', 4),
        _ => return None,
    };
    Some(Letter { base, tone })
}

#[derive(Debug, Clone, PartialEq)]
struct Syllable {
    body: String,
    /// 1-4, or 5 for the light tone.
    tone: u8,
    erhua: bool,
}

impl Syllable {
    fn render(&self, out: &mut String) {
        if self.tone == 5 {
            out.push('˙');
        }
        out.push_str(&self.body);
        match self.tone {
            2 => out.push('ˊ'),
            3 => out.push('ˇ'),
            4 => out.push('ˋ'),
            _ => {}
        }
        if self.erhua {
            out.push('ㄦ');
        }
    }
}

/// Longest syllable in letters (`zhuang`, `shuang`).
const MAX_SYLLABLE_LEN: usize = 6;

/// Split a letter run into syllables. A trailing `r` that does not belong
/// to any syllable is read as an erhua suffix on the last one.
fn segment(letters: &[Letter]) -> Option<Vec<Syllable>> {
    let mut out = Vec::new();
    if segment_plain(letters, &mut out) {
        return Some(out);
    }

    let (last, head) = letters.split_last()?;
    if last.base != 'r' || head.is_empty() {
        return None;
    }
    out.clear();
    if segment_plain(head, &mut out) {
        if let Some(syllable) = out.last_mut() {
            syllable.erhua = true;
        }
        return Some(out);
    }
    None
}

fn segment_plain(letters: &[Letter], out: &mut Vec<Syllable>) -> bool {
    let mut dead_ends = vec![false; letters.len()];
    segment_from(letters, 0, &mut dead_ends, out)
}

/// Longest-first segmentation of `letters[start..]`. Offsets from which no
/// segmentation exists are remembered, so each is explored once.
fn segment_from(
    letters: &[Letter],
    start: usize,
    dead_ends: &mut [bool],
    out: &mut Vec<Syllable>,
) -> bool {
    if start == letters.len() {
        return true;
    }
    if dead_ends[start] {
        return false;
    }

    let longest = (letters.len() - start).min(MAX_SYLLABLE_LEN);
    for len in (1..=longest).rev() {
        let span = &letters[start..start + len];
        let base: String = span.iter().map(|l| l.base).collect();
        let Some(body) = syllable_body(&base) else {
            continue;
        };
        let tone = span.iter().map(|l| l.tone).find(|&t| t != 0).unwrap_or(5);
        out.push(Syllable {
            body,
            tone,
            erhua: false,
        });
        if segment_from(letters, start + len, dead_ends, out) {
            return true;
        }
        out.pop();
    }
    dead_ends[start] = true;
    false
}

/// Zhuyin for one toneless syllable, or `None` if it is not pinyin.
fn syllable_body(base: &str) -> Option<String> {
    let whole = match base {
        "zhi" => Some("ㄓ"),
        "chi" => Some("ㄔ"),
        "shi" => Some("ㄕ"),
        "ri" => Some("ㄖ"),
        "zi" => Some("ㄗ"),
        "ci" => Some("ㄘ"),
        "si" => Some("ㄙ"),
        "er" => Some("ㄦ"),
        _ => None,
    };
    if let Some(whole) = whole {
        return Some(whole.to_string());
    }

    let (initial, rest) = split_initial(base);
    let rime = match initial {
        "y" => fold_y(rest)?,
        "w" => fold_w(rest)?,
        "j" | "q" | "x" => match rest.strip_prefix('u') {
            Some(tail) => format!("v{tail}"),
            None => rest.to_string(),
        },
        "" if !rest.starts_with(['a', 'o', 'e']) => return None,
        _ => rest.to_string(),
    };

    let mut body = String::from(initial_zhuyin(initial));
    body.push_str(final_zhuyin(&rime)?);
    Some(body)
}

fn split_initial(base: &str) -> (&str, &str) {
    for two in ["zh", "ch", "sh"] {
        if let Some(rest) = base.strip_prefix(two) {
            return (two, rest);
        }
    }
    match base.chars().next() {
        Some(
            'b' | 'p' | 'm' | 'f' | 'd' | 't' | 'n' | 'l' | 'g' | 'k' | 'h' | 'j' | 'q' | 'x'
            | 'r' | 'z' | 'c' | 's' | 'y' | 'w',
        ) => base.split_at(1),
        _ => ("", base),
    }
}

/// `y` onsets are written medials: `ya` is `ia`, `yu` is `ü`.
fn fold_y(rest: &str) -> Option<String> {
    match rest {
        "" => None,
        "i" | "in" | "ing" => Some(rest.to_string()),
        "ou" => Some("iou".to_string()),
        _ if rest.starts_with('u') => Some(format!("v{}", &rest[1..])),
        _ if rest.starts_with('v') => Some(rest.to_string()),
        _ => Some(format!("i{rest}")),
    }
}

/// `w` onsets are written medials: `wa` is `ua`, `wei` is `uei`.
fn fold_w(rest: &str) -> Option<String> {
    match rest {
        "" => None,
        "u" => Some("u".to_string()),
        _ => Some(format!("u{rest}")),
    }
}

fn initial_zhuyin(initial: &str) -> &'static str {
    match initial {
        "b" => "ㄅ",
        "p" => "ㄆ",
        "m" => "ㄇ",
        "f" => "ㄈ",
        "d" => "ㄉ",
        "t" => "ㄊ",
        "n" => "ㄋ",
        "l" => "ㄌ",
        "g" => "ㄍ",
        "k" => "ㄎ",
        "h" => "ㄏ",
        "j" => "ㄐ",
        "q" => "ㄑ",
        "x" => "ㄒ",
        "zh" => "ㄓ",
        "ch" => "ㄔ",
        "sh" => "ㄕ",
        "r" => "ㄖ",
        "z" => "ㄗ",
        "c" => "ㄘ",
        "s" => "ㄙ",
        _ => "",
    }
}

fn final_zhuyin(rime: &str) -> Option<&'static str> {
    let z = match rime {
        "a" => "ㄚ",
        "o" => "ㄛ",
        "e" => "ㄜ",
        "ai" => "ㄞ",
        "ei" => "ㄟ",
        "ao" => "ㄠ",
        "ou" => "ㄡ",
        "an" => "ㄢ",
        "en" => "ㄣ",
        "ang" => "ㄤ",
        "eng" => "ㄥ",
        "ong" => "ㄨㄥ",
        "i" => "ㄧ",
        "ia" => "ㄧㄚ",
        "io" => "ㄧㄛ",
        "ie" => "ㄧㄝ",
        "iao" => "ㄧㄠ",
        "iu" | "iou" => "ㄧㄡ",
        "ian" => "ㄧㄢ",
        "in" => "ㄧㄣ",
        "iang" => "ㄧㄤ",
        "ing" => "ㄧㄥ",
        "iong" => "ㄩㄥ",
        "u" => "ㄨ",
        "ua" => "ㄨㄚ",
        "uo" => "ㄨㄛ",
        "uai" => "ㄨㄞ",
        "ui" | "uei" => "ㄨㄟ",
        "uan" => "ㄨㄢ",
        "un" | "uen" => "ㄨㄣ",
        "uang" => "ㄨㄤ",
        "ueng" => "ㄨㄥ",
        "v" => "ㄩ",
        "ve" | "ue" => "ㄩㄝ",
        "van" => "ㄩㄢ",
        "vn" => "ㄩㄣ",
        _ => return None,
    };
    Some(z)
}
