//! CJK transliteration table.
//!
//! Maps characters in the CJK Unified Ideographs range (and its common
//! extensions) to lowercase pinyin syllables. The table covers the
//! vocabulary that shows up in banking message workbooks; characters
//! without a mapping pass through the normalizer untouched and are
//! stripped by the identifier character filter.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// True when `c` falls in a CJK ideograph block.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'   // Extension A
        | '\u{F900}'..='\u{FAFF}'   // Compatibility Ideographs
        | '\u{20000}'..='\u{2A6DF}' // Extension B
        | '\u{2A700}'..='\u{2EBEF}' // Extensions C-F
    )
}

/// Pinyin syllable for `c`, when the table knows it.
pub fn lookup(c: char) -> Option<&'static str> {
    TABLE.get(&c).copied()
}

static TABLE: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    PAIRS.iter().copied().collect()
});

const PAIRS: &[(char, &str)] = &[
    ('客', "ke"),
    ('户', "hu"),
    ('姓', "xing"),
    ('名', "ming"),
    ('账', "zhang"),
    ('号', "hao"),
    ('金', "jin"),
    ('额', "e"),
    ('日', "ri"),
    ('期', "qi"),
    ('类', "lei"),
    ('型', "xing"),
    ('状', "zhuang"),
    ('态', "tai"),
    ('交', "jiao"),
    ('易', "yi"),
    ('银', "yin"),
    ('行', "hang"),
    ('卡', "ka"),
    ('手', "shou"),
    ('机', "ji"),
    ('电', "dian"),
    ('话', "hua"),
    ('地', "di"),
    ('址', "zhi"),
    ('市', "shi"),
    ('省', "sheng"),
    ('国', "guo"),
    ('家', "jia"),
    ('币', "bi"),
    ('种', "zhong"),
    ('余', "yu"),
    ('单', "dan"),
    ('证', "zheng"),
    ('件', "jian"),
    ('码', "ma"),
    ('密', "mi"),
    ('申', "shen"),
    ('请', "qing"),
    ('人', "ren"),
    ('时', "shi"),
    ('间', "jian"),
    ('开', "kai"),
    ('立', "li"),
    ('销', "xiao"),
    ('转', "zhuan"),
    ('入', "ru"),
    ('出', "chu"),
    ('存', "cun"),
    ('款', "kuan"),
    ('贷', "dai"),
    ('利', "li"),
    ('率', "lv"),
    ('流', "liu"),
    ('水', "shui"),
    ('序', "xu"),
    ('备', "bei"),
    ('注', "zhu"),
    ('性', "xing"),
    ('别', "bie"),
    ('年', "nian"),
    ('月', "yue"),
    ('生', "sheng"),
    ('效', "xiao"),
    ('止', "zhi"),
    ('起', "qi"),
    ('始', "shi"),
    ('结', "jie"),
    ('束', "shu"),
    ('总', "zong"),
    ('数', "shu"),
    ('量', "liang"),
    ('标', "biao"),
    ('识', "shi"),
    ('信', "xin"),
    ('息', "xi"),
    ('内', "nei"),
    ('容', "rong"),
    ('描', "miao"),
    ('述', "shu"),
    ('值', "zhi"),
    ('字', "zi"),
    ('段', "duan"),
    ('长', "chang"),
    ('度', "du"),
    ('格', "ge"),
    ('式', "shi"),
    ('版', "ban"),
    ('本', "ben"),
    ('操', "cao"),
    ('作', "zuo"),
    ('查', "cha"),
    ('询', "xun"),
    ('创', "chuang"),
    ('建', "jian"),
    ('修', "xiu"),
    ('改', "gai"),
    ('删', "shan"),
    ('除', "chu"),
    ('新', "xin"),
    ('增', "zeng"),
    ('返', "fan"),
    ('回', "hui"),
    ('报', "bao"),
    ('文', "wen"),
    ('头', "tou"),
    ('体', "ti"),
    ('商', "shang"),
    ('品', "pin"),
    ('订', "ding"),
    ('购', "gou"),
    ('支', "zhi"),
    ('付', "fu"),
    ('收', "shou"),
    ('费', "fei"),
    ('税', "shui"),
    ('价', "jia"),
    ('联', "lian"),
    ('系', "xi"),
    ('邮', "you"),
    ('箱', "xiang"),
    ('编', "bian"),
    ('公', "gong"),
    ('司', "si"),
    ('部', "bu"),
    ('门', "men"),
    ('职', "zhi"),
    ('务', "wu"),
    ('有', "you"),
    ('无', "wu"),
    ('是', "shi"),
    ('否', "fou"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cjk() {
        assert!(is_cjk('客'));
        assert!(is_cjk('名'));
        assert!(!is_cjk('a'));
        assert!(!is_cjk('1'));
        assert!(!is_cjk('_'));
    }

    #[test]
    fn test_lookup_known() {
        assert_eq!(lookup('客'), Some("ke"));
        assert_eq!(lookup('户'), Some("hu"));
        assert_eq!(lookup('姓'), Some("xing"));
        assert_eq!(lookup('名'), Some("ming"));
    }

    #[test]
    fn test_lookup_unknown_passes_through() {
        // An ideograph deliberately not in the table
        assert!(is_cjk('龘'));
        assert_eq!(lookup('龘'), None);
    }
}
