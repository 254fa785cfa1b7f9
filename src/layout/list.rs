//! List item numbering and marker text.

use crate::style::ListStyleType;

use super::view::{BlockKind, Marker, ViewId, ViewTree};

/// Assign 1-based indices and markers to the list items of a list box.
pub(crate) fn number_items(vt: &mut ViewTree, list: ViewId) {
    let children = vt.child_ids(list);
    let mut index = 0u32;
    for child in children {
        if !vt.is_block(child) || vt.block(child).kind != BlockKind::ListItem {
            continue;
        }
        index += 1;
        let style = vt.block(child).blockp.list_style_type;
        let b = vt.block_mut(child);
        b.list_index = index;
        b.marker = marker_for(style, index);
    }
}

/// The marker drawn in the item's left margin area.
pub(crate) fn marker_for(style: ListStyleType, index: u32) -> Option<Marker> {
    Some(match style {
        ListStyleType::None => return None,
        ListStyleType::Disc => Marker::Disc,
        ListStyleType::Circle => Marker::Circle,
        ListStyleType::Square => Marker::Square,
        ListStyleType::Decimal => Marker::Text(format!("{}.", index)),
        ListStyleType::LowerRoman => Marker::Text(roman_numeral(index).to_lowercase()),
        ListStyleType::UpperRoman => Marker::Text(roman_numeral(index)),
        ListStyleType::LowerAlpha => Marker::Text(alpha_marker(index).to_lowercase()),
        ListStyleType::UpperAlpha => Marker::Text(alpha_marker(index)),
    })
}

/// Roman numerals via the standard subtractive pairs; inputs outside
/// 1..=3999 yield the literal "invalid".
pub fn roman_numeral(n: u32) -> String {
    if n == 0 || n > 3999 {
        return "invalid".to_string();
    }
    static PAIRS: &[(u32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut n = n;
    let mut out = String::new();
    for &(value, digits) in PAIRS {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Letters for 1..=26; anything larger is "invalid".
pub fn alpha_marker(n: u32) -> String {
    if (1..=26).contains(&n) {
        char::from(b'A' + (n as u8) - 1).to_string()
    } else {
        "invalid".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::{alpha_marker, roman_numeral};

    #[test]
    fn roman_subtractive_pairs() {
        assert_eq!(roman_numeral(1), "I");
        assert_eq!(roman_numeral(4), "IV");
        assert_eq!(roman_numeral(9), "IX");
        assert_eq!(roman_numeral(14), "XIV");
        assert_eq!(roman_numeral(40), "XL");
        assert_eq!(roman_numeral(90), "XC");
        assert_eq!(roman_numeral(444), "CDXLIV");
        assert_eq!(roman_numeral(1994), "MCMXCIV");
        assert_eq!(roman_numeral(3999), "MMMCMXCIX");
    }

    #[test]
    fn roman_out_of_range() {
        assert_eq!(roman_numeral(0), "invalid");
        assert_eq!(roman_numeral(4000), "invalid");
    }

    #[test]
    fn alpha_markers() {
        assert_eq!(alpha_marker(1), "A");
        assert_eq!(alpha_marker(26), "Z");
        assert_eq!(alpha_marker(27), "invalid");
    }
}
