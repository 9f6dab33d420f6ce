use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Which name a label shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// The name a place uses for itself.
    Endonym,
    /// The canonical (English) name from the dataset.
    #[default]
    Exonym,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Endonym => Self::Exonym,
            Self::Exonym => Self::Endonym,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Endonym => "Endonyms",
            Self::Exonym => "Exonyms",
        }
    }
}

/// Canonical dataset name → endonym.
///
/// Keys follow the abbreviated Natural Earth forms used by the 110m world
/// atlas, plus the long `ADMIN` spellings where they differ.
const ENDONYMS: &[(&str, &str)] = &[
    ("Afghanistan", "افغانستان"),
    ("Albania", "Shqipëria"),
    ("Algeria", "الجزائر"),
    ("Angola", "Angola"),
    ("Argentina", "Argentina"),
    ("Armenia", "Հայաստան"),
    ("Australia", "Australia"),
    ("Austria", "Österreich"),
    ("Azerbaijan", "Azərbaycan"),
    ("Bahamas", "Bahamas"),
    ("Bangladesh", "বাংলাদেশ"),
    ("Belarus", "Беларусь"),
    ("Belgium", "België"),
    ("Belize", "Belize"),
    ("Benin", "Bénin"),
    ("Bhutan", "འབྲུག་ཡུལ"),
    ("Bolivia", "Bolivia"),
    ("Bosnia and Herz.", "Bosna i Hercegovina"),
    ("Bosnia and Herzegovina", "Bosna i Hercegovina"),
    ("Botswana", "Botswana"),
    ("Brazil", "Brasil"),
    ("Brunei", "Brunei"),
    ("Bulgaria", "България"),
    ("Burkina Faso", "Burkina Faso"),
    ("Burundi", "Uburundi"),
    ("Cambodia", "កម្ពុជា"),
    ("Cameroon", "Cameroun"),
    ("Canada", "Canada"),
    ("Central African Rep.", "Ködörösêse tî Bêafrîka"),
    ("Central African Republic", "Ködörösêse tî Bêafrîka"),
    ("Chad", "Tchad"),
    ("Chile", "Chile"),
    ("China", "中国"),
    ("Colombia", "Colombia"),
    ("Congo", "Congo"),
    ("Republic of the Congo", "Congo"),
    ("Costa Rica", "Costa Rica"),
    ("Côte d'Ivoire", "Côte d'Ivoire"),
    ("Ivory Coast", "Côte d'Ivoire"),
    ("Croatia", "Hrvatska"),
    ("Cuba", "Cuba"),
    ("Cyprus", "Κύπρος"),
    ("N. Cyprus", "Kuzey Kıbrıs"),
    ("Northern Cyprus", "Kuzey Kıbrıs"),
    ("Czechia", "Česko"),
    ("Czech Republic", "Česko"),
    ("Dem. Rep. Congo", "RD Congo"),
    ("Democratic Republic of the Congo", "RD Congo"),
    ("Denmark", "Danmark"),
    ("Djibouti", "Djibouti"),
    ("Dominican Rep.", "República Dominicana"),
    ("Dominican Republic", "República Dominicana"),
    ("Ecuador", "Ecuador"),
    ("Egypt", "مصر"),
    ("El Salvador", "El Salvador"),
    ("Eq. Guinea", "Guinea Ecuatorial"),
    ("Equatorial Guinea", "Guinea Ecuatorial"),
    ("Eritrea", "ኤርትራ"),
    ("Estonia", "Eesti"),
    ("eSwatini", "eSwatini"),
    ("Ethiopia", "ኢትዮጵያ"),
    ("Falkland Is.", "Falkland Islands"),
    ("Fiji", "Viti"),
    ("Finland", "Suomi"),
    ("France", "France"),
    ("Fr. S. Antarctic Lands", "Terres australes françaises"),
    ("French Southern and Antarctic Lands", "Terres australes françaises"),
    ("Gabon", "Gabon"),
    ("Gambia", "Gambia"),
    ("Georgia", "საქართველო"),
    ("Germany", "Deutschland"),
    ("Ghana", "Ghana"),
    ("Greece", "Ελλάδα"),
    ("Greenland", "Kalaallit Nunaat"),
    ("Guatemala", "Guatemala"),
    ("Guinea", "Guinée"),
    ("Guinea-Bissau", "Guiné-Bissau"),
    ("Guyana", "Guyana"),
    ("Haiti", "Ayiti"),
    ("Honduras", "Honduras"),
    ("Hungary", "Magyarország"),
    ("Iceland", "Ísland"),
    ("India", "भारत"),
    ("Indonesia", "Indonesia"),
    ("Iran", "ایران"),
    ("Iraq", "العراق"),
    ("Ireland", "Éire"),
    ("Israel", "ישראל"),
    ("Italy", "Italia"),
    ("Jamaica", "Jamaica"),
    ("Japan", "日本"),
    ("Jordan", "الأردن"),
    ("Kazakhstan", "Қазақстан"),
    ("Kenya", "Kenya"),
    ("Kosovo", "Kosova"),
    ("Kuwait", "الكويت"),
    ("Kyrgyzstan", "Кыргызстан"),
    ("Laos", "ລາວ"),
    ("Latvia", "Latvija"),
    ("Lebanon", "لبنان"),
    ("Lesotho", "Lesotho"),
    ("Liberia", "Liberia"),
    ("Libya", "ليبيا"),
    ("Lithuania", "Lietuva"),
    ("Luxembourg", "Lëtzebuerg"),
    ("Macedonia", "Северна Македонија"),
    ("North Macedonia", "Северна Македонија"),
    ("Madagascar", "Madagasikara"),
    ("Malawi", "Malaŵi"),
    ("Malaysia", "Malaysia"),
    ("Mali", "Mali"),
    ("Mauritania", "موريتانيا"),
    ("Mexico", "México"),
    ("Moldova", "Moldova"),
    ("Mongolia", "Монгол Улс"),
    ("Montenegro", "Crna Gora"),
    ("Morocco", "المغرب"),
    ("Mozambique", "Moçambique"),
    ("Myanmar", "မြန်မာ"),
    ("Namibia", "Namibia"),
    ("Nepal", "नेपाल"),
    ("Netherlands", "Nederland"),
    ("New Caledonia", "Nouvelle-Calédonie"),
    ("New Zealand", "Aotearoa"),
    ("Nicaragua", "Nicaragua"),
    ("Niger", "Niger"),
    ("Nigeria", "Nigeria"),
    ("North Korea", "조선"),
    ("Norway", "Norge"),
    ("Oman", "عُمان"),
    ("Pakistan", "پاکستان"),
    ("Palestine", "فلسطين"),
    ("Panama", "Panamá"),
    ("Papua New Guinea", "Papua Niugini"),
    ("Paraguay", "Paraguái"),
    ("Peru", "Perú"),
    ("Philippines", "Pilipinas"),
    ("Poland", "Polska"),
    ("Portugal", "Portugal"),
    ("Puerto Rico", "Puerto Rico"),
    ("Qatar", "قطر"),
    ("Romania", "România"),
    ("Russia", "Россия"),
    ("Rwanda", "Rwanda"),
    ("S. Sudan", "South Sudan"),
    ("Saudi Arabia", "السعودية"),
    ("Senegal", "Sénégal"),
    ("Serbia", "Србија"),
    ("Sierra Leone", "Sierra Leone"),
    ("Slovakia", "Slovensko"),
    ("Slovenia", "Slovenija"),
    ("Solomon Is.", "Solomon Aelan"),
    ("Solomon Islands", "Solomon Aelan"),
    ("Somalia", "Soomaaliya"),
    ("Somaliland", "Somaliland"),
    ("South Africa", "Suid-Afrika"),
    ("South Korea", "대한민국"),
    ("Spain", "España"),
    ("Sri Lanka", "ශ්‍රී ලංකාව"),
    ("Sudan", "السودان"),
    ("Suriname", "Suriname"),
    ("Sweden", "Sverige"),
    ("Switzerland", "Schweiz"),
    ("Syria", "سوريا"),
    ("Taiwan", "臺灣"),
    ("Tajikistan", "Тоҷикистон"),
    ("Tanzania", "Tanzania"),
    ("Thailand", "ประเทศไทย"),
    ("Timor-Leste", "Timór Lorosa'e"),
    ("Togo", "Togo"),
    ("Trinidad and Tobago", "Trinidad and Tobago"),
    ("Tunisia", "تونس"),
    ("Turkey", "Türkiye"),
    ("Turkmenistan", "Türkmenistan"),
    ("Uganda", "Uganda"),
    ("Ukraine", "Україна"),
    ("United Arab Emirates", "الإمارات"),
    ("United Kingdom", "United Kingdom"),
    ("United States of America", "United States"),
    ("Uruguay", "Uruguay"),
    ("Uzbekistan", "Oʻzbekiston"),
    ("Vanuatu", "Vanuatu"),
    ("Venezuela", "Venezuela"),
    ("Vietnam", "Việt Nam"),
    ("W. Sahara", "الصحراء الغربية"),
    ("Western Sahara", "الصحراء الغربية"),
    ("Yemen", "اليمن"),
    ("Zambia", "Zambia"),
    ("Zimbabwe", "Zimbabwe"),
];

static NAME_MAPPING: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| ENDONYMS.iter().copied().collect());

/// The full canonical → endonym table.
pub fn name_mapping() -> &'static HashMap<&'static str, &'static str> {
    &NAME_MAPPING
}

pub fn endonym(canonical: &str) -> Option<&'static str> {
    NAME_MAPPING.get(canonical).copied()
}

/// Display string for a region. Unmapped names fall back to the canonical name.
pub fn resolve(canonical: &str, mode: DisplayMode) -> &str {
    match mode {
        DisplayMode::Endonym => endonym(canonical).unwrap_or(canonical),
        DisplayMode::Exonym => canonical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_endonym() {
        assert_eq!(resolve("Finland", DisplayMode::Endonym), "Suomi");
        assert_eq!(resolve("Finland", DisplayMode::Exonym), "Finland");
    }

    #[test]
    fn unmapped_name_falls_back_to_canonical() {
        assert_eq!(resolve("Atlantis", DisplayMode::Endonym), "Atlantis");
        assert_eq!(resolve("", DisplayMode::Endonym), "");
    }

    #[test]
    fn exonym_mode_is_identity() {
        for (canonical, _) in ENDONYMS {
            assert_eq!(resolve(canonical, DisplayMode::Exonym), *canonical);
        }
        assert_eq!(resolve("Atlantis", DisplayMode::Exonym), "Atlantis");
    }

    #[test]
    fn endonym_mode_matches_table() {
        for (canonical, native) in ENDONYMS {
            assert_eq!(resolve(canonical, DisplayMode::Endonym), *native);
        }
    }

    #[test]
    fn table_keys_are_unique_and_values_non_empty() {
        assert_eq!(name_mapping().len(), ENDONYMS.len());
        assert!(ENDONYMS.iter().all(|(_, native)| !native.trim().is_empty()));
    }

    #[test]
    fn toggling_flips_between_modes() {
        assert_eq!(DisplayMode::Exonym.toggled(), DisplayMode::Endonym);
        assert_eq!(DisplayMode::Endonym.toggled().toggled(), DisplayMode::Endonym);
        assert_eq!(DisplayMode::default(), DisplayMode::Exonym);
    }

    #[test]
    fn display_mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DisplayMode::Endonym).unwrap(),
            "\"endonym\""
        );
    }
}
