//! Element dataset: the first twenty entries of the periodic table, which is
//! exactly the set a round quizzes. Display names are the Japanese ones shown
//! in prompts.

/// One element record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element {
    /// Atomic number, also the answer value every input surface submits.
    pub number: u32,
    /// Chemical symbol, one or two ASCII letters in canonical casing.
    pub symbol: &'static str,
    /// Display name used by name prompts and result listings.
    pub name: &'static str,
}

/// Hydrogen through calcium, ordered by atomic number.
#[rustfmt::skip]
pub const ELEMENTS: [Element; 20] = [
    Element { number: 1,  symbol: "H",  name: "水素" },
    Element { number: 2,  symbol: "He", name: "ヘリウム" },
    Element { number: 3,  symbol: "Li", name: "リチウム" },
    Element { number: 4,  symbol: "Be", name: "ベリリウム" },
    Element { number: 5,  symbol: "B",  name: "ホウ素" },
    Element { number: 6,  symbol: "C",  name: "炭素" },
    Element { number: 7,  symbol: "N",  name: "窒素" },
    Element { number: 8,  symbol: "O",  name: "酸素" },
    Element { number: 9,  symbol: "F",  name: "フッ素" },
    Element { number: 10, symbol: "Ne", name: "ネオン" },
    Element { number: 11, symbol: "Na", name: "ナトリウム" },
    Element { number: 12, symbol: "Mg", name: "マグネシウム" },
    Element { number: 13, symbol: "Al", name: "アルミニウム" },
    Element { number: 14, symbol: "Si", name: "ケイ素" },
    Element { number: 15, symbol: "P",  name: "リン" },
    Element { number: 16, symbol: "S",  name: "硫黄" },
    Element { number: 17, symbol: "Cl", name: "塩素" },
    Element { number: 18, symbol: "Ar", name: "アルゴン" },
    Element { number: 19, symbol: "K",  name: "カリウム" },
    Element { number: 20, symbol: "Ca", name: "カルシウム" },
];

/// Looks an element up by atomic number.
pub fn by_number(number: u32) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.number == number)
}

/// Looks an element up by symbol. Exact match; callers normalize casing first.
pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Character whitelist for the recognition engine: every letter that can occur
/// in a quizzed symbol, nothing else.
pub fn symbol_whitelist() -> String {
    ELEMENTS.iter().map(|e| e.symbol).collect()
}
