//! Country and language code lookup
//!
//! Embedded ISO 3166-1 and ISO 639-3 tables. Lookups are case-insensitive
//! and return None on a miss; the report leaves unresolvable values alone
//! rather than failing.

/// One ISO 3166-1 country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub alpha2: &'static str,
    pub alpha3: &'static str,
    pub name: &'static str,
}

pub fn country_by_alpha2(code: &str) -> Option<&'static Country> {
    let code = code.trim();
    COUNTRIES.iter().find(|c| c.alpha2.eq_ignore_ascii_case(code))
}

pub fn country_by_alpha3(code: &str) -> Option<&'static Country> {
    let code = code.trim();
    COUNTRIES.iter().find(|c| c.alpha3.eq_ignore_ascii_case(code))
}

pub fn country_by_name(name: &str) -> Option<&'static Country> {
    let name = name.trim();
    COUNTRIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// English display name for an ISO 639-3 language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

macro_rules! country {
    ($a2:literal, $a3:literal, $name:literal) => {
        Country {
            alpha2: $a2,
            alpha3: $a3,
            name: $name,
        }
    };
}

static COUNTRIES: &[Country] = &[
    country!("AD", "AND", "Andorra"),
    country!("AE", "ARE", "United Arab Emirates"),
    country!("AF", "AFG", "Afghanistan"),
    country!("AG", "ATG", "Antigua and Barbuda"),
    country!("AI", "AIA", "Anguilla"),
    country!("AL", "ALB", "Albania"),
    country!("AM", "ARM", "Armenia"),
    country!("AO", "AGO", "Angola"),
    country!("AQ", "ATA", "Antarctica"),
    country!("AR", "ARG", "Argentina"),
    country!("AS", "ASM", "American Samoa"),
    country!("AT", "AUT", "Austria"),
    country!("AU", "AUS", "Australia"),
    country!("AW", "ABW", "Aruba"),
    country!("AX", "ALA", "Aland Islands"),
    country!("AZ", "AZE", "Azerbaijan"),
    country!("BA", "BIH", "Bosnia and Herzegovina"),
    country!("BB", "BRB", "Barbados"),
    country!("BD", "BGD", "Bangladesh"),
    country!("BE", "BEL", "Belgium"),
    country!("BF", "BFA", "Burkina Faso"),
    country!("BG", "BGR", "Bulgaria"),
    country!("BH", "BHR", "Bahrain"),
    country!("BI", "BDI", "Burundi"),
    country!("BJ", "BEN", "Benin"),
    country!("BL", "BLM", "Saint Barthelemy"),
    country!("BM", "BMU", "Bermuda"),
    country!("BN", "BRN", "Brunei"),
    country!("BO", "BOL", "Bolivia"),
    country!("BQ", "BES", "Bonaire, Sint Eustatius and Saba"),
    country!("BR", "BRA", "Brazil"),
    country!("BS", "BHS", "Bahamas"),
    country!("BT", "BTN", "Bhutan"),
    country!("BV", "BVT", "Bouvet Island"),
    country!("BW", "BWA", "Botswana"),
    country!("BY", "BLR", "Belarus"),
    country!("BZ", "BLZ", "Belize"),
    country!("CA", "CAN", "Canada"),
    country!("CC", "CCK", "Cocos Islands"),
    country!("CD", "COD", "Democratic Republic of the Congo"),
    country!("CF", "CAF", "Central African Republic"),
    country!("CG", "COG", "Republic of the Congo"),
    country!("CH", "CHE", "Switzerland"),
    country!("CI", "CIV", "Ivory Coast"),
    country!("CK", "COK", "Cook Islands"),
    country!("CL", "CHL", "Chile"),
    country!("CM", "CMR", "Cameroon"),
    country!("CN", "CHN", "China"),
    country!("CO", "COL", "Colombia"),
    country!("CR", "CRI", "Costa Rica"),
    country!("CU", "CUB", "Cuba"),
    country!("CV", "CPV", "Cabo Verde"),
    country!("CW", "CUW", "Curacao"),
    country!("CX", "CXR", "Christmas Island"),
    country!("CY", "CYP", "Cyprus"),
    country!("CZ", "CZE", "Czechia"),
    country!("DE", "DEU", "Germany"),
    country!("DJ", "DJI", "Djibouti"),
    country!("DK", "DNK", "Denmark"),
    country!("DM", "DMA", "Dominica"),
    country!("DO", "DOM", "Dominican Republic"),
    country!("DZ", "DZA", "Algeria"),
    country!("EC", "ECU", "Ecuador"),
    country!("EE", "EST", "Estonia"),
    country!("EG", "EGY", "Egypt"),
    country!("EH", "ESH", "Western Sahara"),
    country!("ER", "ERI", "Eritrea"),
    country!("ES", "ESP", "Spain"),
    country!("ET", "ETH", "Ethiopia"),
    country!("FI", "FIN", "Finland"),
    country!("FJ", "FJI", "Fiji"),
    country!("FK", "FLK", "Falkland Islands"),
    country!("FM", "FSM", "Micronesia"),
    country!("FO", "FRO", "Faroe Islands"),
    country!("FR", "FRA", "France"),
    country!("GA", "GAB", "Gabon"),
    country!("GB", "GBR", "United Kingdom"),
    country!("GD", "GRD", "Grenada"),
    country!("GE", "GEO", "Georgia"),
    country!("GF", "GUF", "French Guiana"),
    country!("GG", "GGY", "Guernsey"),
    country!("GH", "GHA", "Ghana"),
    country!("GI", "GIB", "Gibraltar"),
    country!("GL", "GRL", "Greenland"),
    country!("GM", "GMB", "Gambia"),
    country!("GN", "GIN", "Guinea"),
    country!("GP", "GLP", "Guadeloupe"),
    country!("GQ", "GNQ", "Equatorial Guinea"),
    country!("GR", "GRC", "Greece"),
    country!("GS", "SGS", "South Georgia and the South Sandwich Islands"),
    country!("GT", "GTM", "Guatemala"),
    country!("GU", "GUM", "Guam"),
    country!("GW", "GNB", "Guinea-Bissau"),
    country!("GY", "GUY", "Guyana"),
    country!("HK", "HKG", "Hong Kong"),
    country!("HM", "HMD", "Heard Island and McDonald Islands"),
    country!("HN", "HND", "Honduras"),
    country!("HR", "HRV", "Croatia"),
    country!("HT", "HTI", "Haiti"),
    country!("HU", "HUN", "Hungary"),
    country!("ID", "IDN", "Indonesia"),
    country!("IE", "IRL", "Ireland"),
    country!("IL", "ISR", "Israel"),
    country!("IM", "IMN", "Isle of Man"),
    country!("IN", "IND", "India"),
    country!("IO", "IOT", "British Indian Ocean Territory"),
    country!("IQ", "IRQ", "Iraq"),
    country!("IR", "IRN", "Iran"),
    country!("IS", "ISL", "Iceland"),
    country!("IT", "ITA", "Italy"),
    country!("JE", "JEY", "Jersey"),
    country!("JM", "JAM", "Jamaica"),
    country!("JO", "JOR", "Jordan"),
    country!("JP", "JPN", "Japan"),
    country!("KE", "KEN", "Kenya"),
    country!("KG", "KGZ", "Kyrgyzstan"),
    country!("KH", "KHM", "Cambodia"),
    country!("KI", "KIR", "Kiribati"),
    country!("KM", "COM", "Comoros"),
    country!("KN", "KNA", "Saint Kitts and Nevis"),
    country!("KP", "PRK", "North Korea"),
    country!("KR", "KOR", "South Korea"),
    country!("KW", "KWT", "Kuwait"),
    country!("KY", "CYM", "Cayman Islands"),
    country!("KZ", "KAZ", "Kazakhstan"),
    country!("LA", "LAO", "Laos"),
    country!("LB", "LBN", "Lebanon"),
    country!("LC", "LCA", "Saint Lucia"),
    country!("LI", "LIE", "Liechtenstein"),
    country!("LK", "LKA", "Sri Lanka"),
    country!("LR", "LBR", "Liberia"),
    country!("LS", "LSO", "Lesotho"),
    country!("LT", "LTU", "Lithuania"),
    country!("LU", "LUX", "Luxembourg"),
    country!("LV", "LVA", "Latvia"),
    country!("LY", "LBY", "Libya"),
    country!("MA", "MAR", "Morocco"),
    country!("MC", "MCO", "Monaco"),
    country!("MD", "MDA", "Moldova"),
    country!("ME", "MNE", "Montenegro"),
    country!("MF", "MAF", "Saint Martin"),
    country!("MG", "MDG", "Madagascar"),
    country!("MH", "MHL", "Marshall Islands"),
    country!("MK", "MKD", "North Macedonia"),
    country!("ML", "MLI", "Mali"),
    country!("MM", "MMR", "Myanmar"),
    country!("MN", "MNG", "Mongolia"),
    country!("MO", "MAC", "Macao"),
    country!("MP", "MNP", "Northern Mariana Islands"),
    country!("MQ", "MTQ", "Martinique"),
    country!("MR", "MRT", "Mauritania"),
    country!("MS", "MSR", "Montserrat"),
    country!("MT", "MLT", "Malta"),
    country!("MU", "MUS", "Mauritius"),
    country!("MV", "MDV", "Maldives"),
    country!("MW", "MWI", "Malawi"),
    country!("MX", "MEX", "Mexico"),
    country!("MY", "MYS", "Malaysia"),
    country!("MZ", "MOZ", "Mozambique"),
    country!("NA", "NAM", "Namibia"),
    country!("NC", "NCL", "New Caledonia"),
    country!("NE", "NER", "Niger"),
    country!("NF", "NFK", "Norfolk Island"),
    country!("NG", "NGA", "Nigeria"),
    country!("NI", "NIC", "Nicaragua"),
    country!("NL", "NLD", "Netherlands"),
    country!("NO", "NOR", "Norway"),
    country!("NP", "NPL", "Nepal"),
    country!("NR", "NRU", "Nauru"),
    country!("NU", "NIU", "Niue"),
    country!("NZ", "NZL", "New Zealand"),
    country!("OM", "OMN", "Oman"),
    country!("PA", "PAN", "Panama"),
    country!("PE", "PER", "Peru"),
    country!("PF", "PYF", "French Polynesia"),
    country!("PG", "PNG", "Papua New Guinea"),
    country!("PH", "PHL", "Philippines"),
    country!("PK", "PAK", "Pakistan"),
    country!("PL", "POL", "Poland"),
    country!("PM", "SPM", "Saint Pierre and Miquelon"),
    country!("PN", "PCN", "Pitcairn"),
    country!("PR", "PRI", "Puerto Rico"),
    country!("PS", "PSE", "Palestine"),
    country!("PT", "PRT", "Portugal"),
    country!("PW", "PLW", "Palau"),
    country!("PY", "PRY", "Paraguay"),
    country!("QA", "QAT", "Qatar"),
    country!("RE", "REU", "Reunion"),
    country!("RO", "ROU", "Romania"),
    country!("RS", "SRB", "Serbia"),
    country!("RU", "RUS", "Russia"),
    country!("RW", "RWA", "Rwanda"),
    country!("SA", "SAU", "Saudi Arabia"),
    country!("SB", "SLB", "Solomon Islands"),
    country!("SC", "SYC", "Seychelles"),
    country!("SD", "SDN", "Sudan"),
    country!("SE", "SWE", "Sweden"),
    country!("SG", "SGP", "Singapore"),
    country!("SH", "SHN", "Saint Helena, Ascension and Tristan da Cunha"),
    country!("SI", "SVN", "Slovenia"),
    country!("SJ", "SJM", "Svalbard and Jan Mayen"),
    country!("SK", "SVK", "Slovakia"),
    country!("SL", "SLE", "Sierra Leone"),
    country!("SM", "SMR", "San Marino"),
    country!("SN", "SEN", "Senegal"),
    country!("SO", "SOM", "Somalia"),
    country!("SR", "SUR", "Suriname"),
    country!("SS", "SSD", "South Sudan"),
    country!("ST", "STP", "Sao Tome and Principe"),
    country!("SV", "SLV", "El Salvador"),
    country!("SX", "SXM", "Sint Maarten"),
    country!("SY", "SYR", "Syria"),
    country!("SZ", "SWZ", "Eswatini"),
    country!("TC", "TCA", "Turks and Caicos Islands"),
    country!("TD", "TCD", "Chad"),
    country!("TF", "ATF", "French Southern Territories"),
    country!("TG", "TGO", "Togo"),
    country!("TH", "THA", "Thailand"),
    country!("TJ", "TJK", "Tajikistan"),
    country!("TK", "TKL", "Tokelau"),
    country!("TL", "TLS", "Timor-Leste"),
    country!("TM", "TKM", "Turkmenistan"),
    country!("TN", "TUN", "Tunisia"),
    country!("TO", "TON", "Tonga"),
    country!("TR", "TUR", "Turkey"),
    country!("TT", "TTO", "Trinidad and Tobago"),
    country!("TV", "TUV", "Tuvalu"),
    country!("TW", "TWN", "Taiwan"),
    country!("TZ", "TZA", "Tanzania"),
    country!("UA", "UKR", "Ukraine"),
    country!("UG", "UGA", "Uganda"),
    country!("UM", "UMI", "United States Minor Outlying Islands"),
    country!("US", "USA", "United States"),
    country!("UY", "URY", "Uruguay"),
    country!("UZ", "UZB", "Uzbekistan"),
    country!("VA", "VAT", "Vatican City"),
    country!("VC", "VCT", "Saint Vincent and the Grenadines"),
    country!("VE", "VEN", "Venezuela"),
    country!("VG", "VGB", "British Virgin Islands"),
    country!("VI", "VIR", "U.S. Virgin Islands"),
    country!("VN", "VNM", "Vietnam"),
    country!("VU", "VUT", "Vanuatu"),
    country!("WF", "WLF", "Wallis and Futuna"),
    country!("WS", "WSM", "Samoa"),
    country!("YE", "YEM", "Yemen"),
    country!("YT", "MYT", "Mayotte"),
    country!("ZA", "ZAF", "South Africa"),
    country!("ZM", "ZMB", "Zambia"),
    country!("ZW", "ZWE", "Zimbabwe"),
];

static LANGUAGES: &[(&str, &str)] = &[
    ("aar", "Afar"),
    ("abk", "Abkhazian"),
    ("afr", "Afrikaans"),
    ("aka", "Akan"),
    ("amh", "Amharic"),
    ("ara", "Arabic"),
    ("arg", "Aragonese"),
    ("asm", "Assamese"),
    ("ava", "Avaric"),
    ("aym", "Aymara"),
    ("aze", "Azerbaijani"),
    ("bak", "Bashkir"),
    ("bam", "Bambara"),
    ("bel", "Belarusian"),
    ("ben", "Bengali"),
    ("bis", "Bislama"),
    ("bod", "Tibetan"),
    ("bos", "Bosnian"),
    ("bre", "Breton"),
    ("bul", "Bulgarian"),
    ("cat", "Catalan"),
    ("ces", "Czech"),
    ("cha", "Chamorro"),
    ("che", "Chechen"),
    ("chv", "Chuvash"),
    ("cor", "Cornish"),
    ("cos", "Corsican"),
    ("cre", "Cree"),
    ("cym", "Welsh"),
    ("dan", "Danish"),
    ("deu", "German"),
    ("div", "Dhivehi"),
    ("dzo", "Dzongkha"),
    ("ell", "Greek"),
    ("eng", "English"),
    ("epo", "Esperanto"),
    ("est", "Estonian"),
    ("eus", "Basque"),
    ("ewe", "Ewe"),
    ("fao", "Faroese"),
    ("fas", "Persian"),
    ("fij", "Fijian"),
    ("fin", "Finnish"),
    ("fra", "French"),
    ("fry", "Western Frisian"),
    ("ful", "Fulah"),
    ("gla", "Scottish Gaelic"),
    ("gle", "Irish"),
    ("glg", "Galician"),
    ("glv", "Manx"),
    ("grn", "Guarani"),
    ("guj", "Gujarati"),
    ("hat", "Haitian Creole"),
    ("hau", "Hausa"),
    ("heb", "Hebrew"),
    ("her", "Herero"),
    ("hin", "Hindi"),
    ("hmo", "Hiri Motu"),
    ("hrv", "Croatian"),
    ("hun", "Hungarian"),
    ("hye", "Armenian"),
    ("ibo", "Igbo"),
    ("iii", "Sichuan Yi"),
    ("iku", "Inuktitut"),
    ("ind", "Indonesian"),
    ("ipk", "Inupiaq"),
    ("isl", "Icelandic"),
    ("ita", "Italian"),
    ("jav", "Javanese"),
    ("jpn", "Japanese"),
    ("kal", "Kalaallisut"),
    ("kan", "Kannada"),
    ("kas", "Kashmiri"),
    ("kat", "Georgian"),
    ("kau", "Kanuri"),
    ("kaz", "Kazakh"),
    ("khm", "Khmer"),
    ("kik", "Kikuyu"),
    ("kin", "Kinyarwanda"),
    ("kir", "Kyrgyz"),
    ("kom", "Komi"),
    ("kon", "Kongo"),
    ("kor", "Korean"),
    ("kua", "Kuanyama"),
    ("kur", "Kurdish"),
    ("lao", "Lao"),
    ("lat", "Latin"),
    ("lav", "Latvian"),
    ("lim", "Limburgish"),
    ("lin", "Lingala"),
    ("lit", "Lithuanian"),
    ("ltz", "Luxembourgish"),
    ("lub", "Luba-Katanga"),
    ("lug", "Ganda"),
    ("mah", "Marshallese"),
    ("mal", "Malayalam"),
    ("mar", "Marathi"),
    ("mkd", "Macedonian"),
    ("mlg", "Malagasy"),
    ("mlt", "Maltese"),
    ("mon", "Mongolian"),
    ("mri", "Maori"),
    ("msa", "Malay"),
    ("mya", "Burmese"),
    ("nau", "Nauru"),
    ("nav", "Navajo"),
    ("nbl", "South Ndebele"),
    ("nde", "North Ndebele"),
    ("ndo", "Ndonga"),
    ("nep", "Nepali"),
    ("nld", "Dutch"),
    ("nno", "Norwegian Nynorsk"),
    ("nob", "Norwegian Bokmal"),
    ("nor", "Norwegian"),
    ("nso", "Pedi"),
    ("nya", "Nyanja"),
    ("oci", "Occitan"),
    ("oji", "Ojibwa"),
    ("ori", "Oriya"),
    ("orm", "Oromo"),
    ("oss", "Ossetian"),
    ("pan", "Punjabi"),
    ("pol", "Polish"),
    ("por", "Portuguese"),
    ("pus", "Pashto"),
    ("que", "Quechua"),
    ("roh", "Romansh"),
    ("ron", "Romanian"),
    ("run", "Rundi"),
    ("rus", "Russian"),
    ("sag", "Sango"),
    ("san", "Sanskrit"),
    ("sin", "Sinhala"),
    ("slk", "Slovak"),
    ("slv", "Slovenian"),
    ("sme", "Northern Sami"),
    ("smo", "Samoan"),
    ("sna", "Shona"),
    ("snd", "Sindhi"),
    ("som", "Somali"),
    ("sot", "Southern Sotho"),
    ("spa", "Spanish"),
    ("sqi", "Albanian"),
    ("srd", "Sardinian"),
    ("srp", "Serbian"),
    ("ssw", "Swati"),
    ("sun", "Sundanese"),
    ("swa", "Swahili"),
    ("swe", "Swedish"),
    ("tah", "Tahitian"),
    ("tam", "Tamil"),
    ("tat", "Tatar"),
    ("tel", "Telugu"),
    ("tgk", "Tajik"),
    ("tgl", "Tagalog"),
    ("tha", "Thai"),
    ("tir", "Tigrinya"),
    ("ton", "Tongan"),
    ("tsn", "Tswana"),
    ("tso", "Tsonga"),
    ("tuk", "Turkmen"),
    ("tur", "Turkish"),
    ("twi", "Twi"),
    ("uig", "Uyghur"),
    ("ukr", "Ukrainian"),
    ("urd", "Urdu"),
    ("uzb", "Uzbek"),
    ("ven", "Venda"),
    ("vie", "Vietnamese"),
    ("vol", "Volapuk"),
    ("wln", "Walloon"),
    ("wol", "Wolof"),
    ("xho", "Xhosa"),
    ("yid", "Yiddish"),
    ("yor", "Yoruba"),
    ("zha", "Zhuang"),
    ("zho", "Chinese"),
    ("zul", "Zulu"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_lookups_agree() {
        let za = country_by_alpha2("ZA").unwrap();
        assert_eq!(za.alpha3, "ZAF");
        assert_eq!(za.name, "South Africa");

        assert_eq!(country_by_alpha3("zaf"), Some(za));
        assert_eq!(country_by_name("south africa"), Some(za));
        assert_eq!(country_by_name(" South Africa "), Some(za));
    }

    #[test]
    fn test_country_miss_is_none() {
        assert_eq!(country_by_alpha2("XX"), None);
        assert_eq!(country_by_alpha3("XXX"), None);
        assert_eq!(country_by_name("Atlantis"), None);
    }

    #[test]
    fn test_language_names() {
        assert_eq!(language_name("afr"), Some("Afrikaans"));
        assert_eq!(language_name("ZUL"), Some("Zulu"));
        assert_eq!(language_name("nso"), Some("Pedi"));
        assert_eq!(language_name("qqq"), None);
    }

    #[test]
    fn test_tables_have_no_duplicate_codes() {
        let mut alpha2: Vec<&str> = COUNTRIES.iter().map(|c| c.alpha2).collect();
        alpha2.sort_unstable();
        alpha2.dedup();
        assert_eq!(alpha2.len(), COUNTRIES.len());

        let mut codes: Vec<&str> = LANGUAGES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), LANGUAGES.len());
    }
}
