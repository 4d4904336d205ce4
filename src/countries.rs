//! Country Registry: source-data area names to ISO-3 codes and back.
//!
//! The forward map is many-to-one (UN Tourism renamed "Turkey" to
//! "Türkiye", some exports use short names). The reverse map resolves each
//! ISO-3 code to the entry declared *first* in [`COUNTRY_TABLE`], so
//! canonical names must precede their aliases.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// `(area name as published, ISO-3)`, canonical spelling first.
pub const COUNTRY_TABLE: &[(&str, &str)] = &[
    // A
    ("Afghanistan", "AFG"),
    ("Albania", "ALB"),
    ("Algeria", "DZA"),
    ("American Samoa", "ASM"),
    ("Andorra", "AND"),
    ("Angola", "AGO"),
    ("Anguilla", "AIA"),
    ("Antigua and Barbuda", "ATG"),
    ("Argentina", "ARG"),
    ("Armenia", "ARM"),
    ("Aruba", "ABW"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Azerbaijan", "AZE"),
    // B
    ("Bahamas", "BHS"),
    ("Bahrain", "BHR"),
    ("Bangladesh", "BGD"),
    ("Barbados", "BRB"),
    ("Belarus", "BLR"),
    ("Belgium", "BEL"),
    ("Belize", "BLZ"),
    ("Benin", "BEN"),
    ("Bermuda", "BMU"),
    ("Bhutan", "BTN"),
    ("Bolivia (Plurinational State of)", "BOL"),
    ("Bonaire", "BES"),
    ("Bosnia and Herzegovina", "BIH"),
    ("Botswana", "BWA"),
    ("Brazil", "BRA"),
    ("British Virgin Islands", "VGB"),
    ("Brunei Darussalam", "BRN"),
    ("Bulgaria", "BGR"),
    ("Burkina Faso", "BFA"),
    ("Burundi", "BDI"),
    // C
    ("Cabo Verde", "CPV"),
    ("Cambodia", "KHM"),
    ("Cameroon", "CMR"),
    ("Canada", "CAN"),
    ("Cayman Islands", "CYM"),
    ("Central African Republic", "CAF"),
    ("Chad", "TCD"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Taiwan Province of China", "TWN"),
    ("China, Hong Kong Special Administrative Region", "HKG"),
    ("China, Macao Special Administrative Region", "MAC"),
    ("Colombia", "COL"),
    ("Comoros", "COM"),
    ("Congo", "COG"),
    ("Democratic Republic of the Congo", "COD"),
    ("Cook Islands", "COK"),
    ("Costa Rica", "CRI"),
    ("Croatia", "HRV"),
    ("Cuba", "CUB"),
    ("Curaçao", "CUW"),
    ("Cyprus", "CYP"),
    ("Czech Republic", "CZE"),
    ("Czechia", "CZE"),
    ("Côte d'Ivoire", "CIV"),
    // D
    ("Denmark", "DNK"),
    ("Djibouti", "DJI"),
    ("Dominica", "DMA"),
    ("Dominican Republic", "DOM"),
    // E
    ("Ecuador", "ECU"),
    ("Egypt", "EGY"),
    ("El Salvador", "SLV"),
    ("Equatorial Guinea", "GNQ"),
    ("Eritrea", "ERI"),
    ("Estonia", "EST"),
    ("Eswatini", "SWZ"),
    ("Ethiopia", "ETH"),
    // F
    ("Fiji", "FJI"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("French Guiana", "GUF"),
    ("French Polynesia", "PYF"),
    // G
    ("Gabon", "GAB"),
    ("Gambia", "GMB"),
    ("Georgia", "GEO"),
    ("Germany", "DEU"),
    ("Ghana", "GHA"),
    ("Greece", "GRC"),
    ("Grenada", "GRD"),
    ("Guadeloupe", "GLP"),
    ("Guam", "GUM"),
    ("Guatemala", "GTM"),
    ("Guinea", "GIN"),
    ("Guinea-Bissau", "GNB"),
    ("Guyana", "GUY"),
    // H
    ("Haiti", "HTI"),
    ("Honduras", "HND"),
    ("Hungary", "HUN"),
    // I
    ("Iceland", "ISL"),
    ("India", "IND"),
    ("Indonesia", "IDN"),
    ("Iran (Islamic Republic of)", "IRN"),
    ("Iraq", "IRQ"),
    ("Ireland", "IRL"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    // J
    ("Jamaica", "JAM"),
    ("Japan", "JPN"),
    ("Jordan", "JOR"),
    // K
    ("Kazakhstan", "KAZ"),
    ("Kenya", "KEN"),
    ("Kiribati", "KIR"),
    ("Kuwait", "KWT"),
    ("Kyrgyzstan", "KGZ"),
    ("Republic of Korea", "KOR"),
    // L
    ("Lao People's Democratic Republic", "LAO"),
    ("Latvia", "LVA"),
    ("Lebanon", "LBN"),
    ("Lesotho", "LSO"),
    ("Liberia", "LBR"),
    ("Libya", "LBY"),
    ("Liechtenstein", "LIE"),
    ("Lithuania", "LTU"),
    ("Luxembourg", "LUX"),
    // M
    ("Madagascar", "MDG"),
    ("Malawi", "MWI"),
    ("Malaysia", "MYS"),
    ("Maldives", "MDV"),
    ("Mali", "MLI"),
    ("Malta", "MLT"),
    ("Marshall Islands", "MHL"),
    ("Martinique", "MTQ"),
    ("Mauritania", "MRT"),
    ("Mauritius", "MUS"),
    ("Mexico", "MEX"),
    ("Micronesia (Federated States of)", "FSM"),
    ("Monaco", "MCO"),
    ("Mongolia", "MNG"),
    ("Montenegro", "MNE"),
    ("Montserrat", "MSR"),
    ("Morocco", "MAR"),
    ("Mozambique", "MOZ"),
    ("Myanmar", "MMR"),
    // N
    ("Namibia", "NAM"),
    ("Nauru", "NRU"),
    ("Nepal", "NPL"),
    ("Netherlands (Kingdom of the)", "NLD"),
    ("Netherlands", "NLD"),
    ("New Caledonia", "NCL"),
    ("New Zealand", "NZL"),
    ("Nicaragua", "NIC"),
    ("Niger", "NER"),
    ("Nigeria", "NGA"),
    ("Niue", "NIU"),
    ("North Macedonia", "MKD"),
    ("Northern Mariana Islands", "MNP"),
    ("Norway", "NOR"),
    // O
    ("Oman", "OMN"),
    // P
    ("Pakistan", "PAK"),
    ("Palau", "PLW"),
    ("State of Palestine", "PSE"),
    ("Panama", "PAN"),
    ("Papua New Guinea", "PNG"),
    ("Paraguay", "PRY"),
    ("Peru", "PER"),
    ("Philippines", "PHL"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Puerto Rico", "PRI"),
    // Q
    ("Qatar", "QAT"),
    // R
    ("Republic of Moldova", "MDA"),
    ("Romania", "ROU"),
    ("Russian Federation", "RUS"),
    ("Rwanda", "RWA"),
    ("Réunion", "REU"),
    // S
    ("Saint Kitts and Nevis", "KNA"),
    ("Saint Lucia", "LCA"),
    ("Saint Vincent and the Grenadines", "VCT"),
    ("Samoa", "WSM"),
    ("San Marino", "SMR"),
    ("Sao Tome and Principe", "STP"),
    ("Saudi Arabia", "SAU"),
    ("Senegal", "SEN"),
    ("Serbia", "SRB"),
    ("Seychelles", "SYC"),
    ("Sierra Leone", "SLE"),
    ("Singapore", "SGP"),
    ("Sint Maarten (Dutch part)", "SXM"),
    ("Slovakia", "SVK"),
    ("Slovenia", "SVN"),
    ("Solomon Islands", "SLB"),
    ("South Africa", "ZAF"),
    ("Spain", "ESP"),
    ("Sri Lanka", "LKA"),
    ("Sudan", "SDN"),
    ("Suriname", "SUR"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Syrian Arab Republic", "SYR"),
    // T
    ("Tajikistan", "TJK"),
    ("Thailand", "THA"),
    ("Timor-Leste", "TLS"),
    ("Togo", "TGO"),
    ("Tonga", "TON"),
    ("Trinidad and Tobago", "TTO"),
    ("Tunisia", "TUN"),
    ("Turkey", "TUR"),
    ("Türkiye", "TUR"),
    ("Turkmenistan", "TKM"),
    ("Turks and Caicos Islands", "TCA"),
    ("Tuvalu", "TUV"),
    // U
    ("Uganda", "UGA"),
    ("Ukraine", "UKR"),
    ("United Arab Emirates", "ARE"),
    ("United Kingdom of Great Britain and Northern Ireland", "GBR"),
    ("United Kingdom", "GBR"),
    ("United Republic of Tanzania", "TZA"),
    ("United States of America", "USA"),
    ("United States", "USA"),
    ("United States Virgin Islands", "VIR"),
    ("Uruguay", "URY"),
    ("Uzbekistan", "UZB"),
    // V
    ("Vanuatu", "VUT"),
    ("Venezuela (Bolivarian Republic of)", "VEN"),
    ("Viet Nam", "VNM"),
    // Y
    ("Yemen", "YEM"),
    // Z
    ("Zambia", "ZMB"),
    ("Zimbabwe", "ZWE"),
];

static STANDARD: Lazy<CountryRegistry> = Lazy::new(|| CountryRegistry::from_entries(COUNTRY_TABLE));

#[derive(Debug, Clone)]
pub struct CountryRegistry {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    /// Every name per code, in declaration order.
    aliases: HashMap<String, Vec<String>>,
}

impl CountryRegistry {
    /// Process-wide registry built from [`COUNTRY_TABLE`] on first use.
    pub fn standard() -> &'static CountryRegistry {
        &STANDARD
    }

    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let mut forward = HashMap::with_capacity(entries.len());
        let mut reverse = HashMap::new();
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        for (name, iso3) in entries {
            forward
                .entry(name.to_string())
                .or_insert_with(|| iso3.to_string());
            reverse
                .entry(iso3.to_string())
                .or_insert_with(|| name.to_string());
            aliases
                .entry(iso3.to_string())
                .or_default()
                .push(name.to_string());
        }
        Self {
            forward,
            reverse,
            aliases,
        }
    }

    pub fn to_iso3(&self, name: &str) -> Option<&str> {
        self.forward.get(name.trim()).map(String::as_str)
    }

    /// Canonical name for a code: the first entry declared for it.
    pub fn to_name(&self, iso3: &str) -> Option<&str> {
        self.reverse.get(iso3).map(String::as_str)
    }

    /// All published spellings that map to `iso3`, canonical first.
    pub fn names_for(&self, iso3: &str) -> &[String] {
        self.aliases.get(iso3).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
