//! Ordinales en palabras ("first", "twenty-first", ...) usados en el campo
//! `occurrence` de las referencias al ledger.
//!
//! La tabla cubre 1..=499 y se mantiene así por compatibilidad con las
//! definiciones de cadena existentes. Una palabra desconocida equivale a -1,
//! es decir, la última ocurrencia.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Último ordinal representable en la tabla.
pub const MAX_ORDINAL: usize = 499;

const UNITS: [&str; 20] = ["", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
                           "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
                           "eighteen", "nineteen"];

const TENS: [&str; 10] = ["", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety"];

// sufijos irregulares, se aplican sobre la última palabra
const IRREGULAR: [(&str, &str); 8] = [("ty", "tieth"),
                                      ("one", "first"),
                                      ("two", "second"),
                                      ("three", "third"),
                                      ("five", "fifth"),
                                      ("eight", "eighth"),
                                      ("nine", "ninth"),
                                      ("twelve", "twelfth")];

static ORDINALS: Lazy<HashMap<String, i64>> = Lazy::new(|| {
    (1..=MAX_ORDINAL).map(|n| (ordinal_word(n), n as i64 - 1)).collect()
});

fn cardinal_word(n: usize) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let below = if rest < 20 {
        UNITS[rest].to_string()
    } else if rest % 10 == 0 {
        TENS[rest / 10].to_string()
    } else {
        format!("{}-{}", TENS[rest / 10], UNITS[rest % 10])
    };
    match (hundreds, rest) {
        (0, _) => below,
        (h, 0) => format!("{} hundred", UNITS[h]),
        (h, _) => format!("{} hundred and {}", UNITS[h], below),
    }
}

/// Forma ordinal en palabras de `n` (`21` -> `"twenty-first"`).
pub fn ordinal_word(n: usize) -> String {
    let cardinal = cardinal_word(n);
    for (suffix, replacement) in IRREGULAR {
        if let Some(stem) = cardinal.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }
    format!("{cardinal}th")
}

/// Índice 0-based de un ordinal en palabras; -1 si no está en la tabla.
pub fn ordinal_index(word: &str) -> i64 {
    ORDINALS.get(word).copied().unwrap_or(-1)
}

/// Acceso estilo lista con índices negativos contados desde el final.
pub fn select<T>(items: &[T], index: i64) -> Option<&T> {
    let len = items.len() as i64;
    let pos = if index < 0 { len + index } else { index };
    if pos < 0 || pos >= len {
        return None;
    }
    items.get(pos as usize)
}
