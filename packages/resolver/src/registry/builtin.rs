//! Builtin jurisdiction table.

use super::{JurisdictionEntry, SectionStyle};
use crate::types::JurisdictionLevel;

/// Registry code of the United States Code.
pub const FEDERAL: &str = "FEDERAL";

const COLON: &[SectionStyle] = &[SectionStyle::Colon];
const HYPHEN: &[SectionStyle] = &[SectionStyle::Hyphen];
const NONE: &[SectionStyle] = &[];

/// (code, name, law key, aliases, section styles)
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
    &'static [SectionStyle],
);

const STATES: &[Row] = &[
    ("AL", "Alabama", "AL-CODE", &["Ala.", "Ala. Code", "Code of Ala."], HYPHEN),
    ("AK", "Alaska", "AK-STATUTES", &["Alaska Stat.", "AS"], NONE),
    ("AZ", "Arizona", "AZ-REVISED-STATUTES", &["Ariz.", "Ariz. Rev. Stat.", "A.R.S."], HYPHEN),
    ("AR", "Arkansas", "AR-CODE", &["Ark.", "Ark. Code Ann.", "A.C.A."], HYPHEN),
    ("CA", "California", "CA-CODES", &["Cal.", "Calif.", "Cal"], NONE),
    ("CO", "Colorado", "CO-REVISED-STATUTES", &["Colo.", "Colo. Rev. Stat.", "C.R.S."], HYPHEN),
    ("CT", "Connecticut", "CT-GENERAL-STATUTES", &["Conn.", "Conn. Gen. Stat.", "C.G.S."], HYPHEN),
    ("DE", "Delaware", "DE-CODE", &["Del.", "Del. Code Ann."], NONE),
    ("DC", "District of Columbia", "DC-CODE", &["D.C.", "D.C. Code"], HYPHEN),
    ("FL", "Florida", "FL-STATUTES", &["Fla.", "Fla. Stat."], NONE),
    ("GA", "Georgia", "GA-CODE", &["Ga.", "Ga. Code Ann.", "O.C.G.A."], HYPHEN),
    ("HI", "Hawaii", "HI-REVISED-STATUTES", &["Haw.", "Haw. Rev. Stat.", "HRS"], HYPHEN),
    ("ID", "Idaho", "ID-STATUTES", &["Idaho Code"], HYPHEN),
    ("IL", "Illinois", "IL-COMPILED-STATUTES", &["Ill.", "ILCS"], NONE),
    ("IN", "Indiana", "IN-CODE", &["Ind.", "Ind. Code", "IC"], HYPHEN),
    ("IA", "Iowa", "IA-CODE", &["Iowa Code"], NONE),
    ("KS", "Kansas", "KS-STATUTES", &["Kan.", "Kan. Stat. Ann.", "K.S.A."], HYPHEN),
    ("KY", "Kentucky", "KY-REVISED-STATUTES", &["Ky.", "Ky. Rev. Stat.", "KRS"], NONE),
    ("LA", "Louisiana", "LA-REVISED-STATUTES", &["La.", "La. Rev. Stat.", "La. R.S."], NONE),
    ("ME", "Maine", "ME-REVISED-STATUTES", &["Me.", "Me. Rev. Stat.", "M.R.S."], NONE),
    ("MD", "Maryland", "MD-CODE", &["Md.", "Md. Code Ann."], HYPHEN),
    ("MA", "Massachusetts", "MA-GENERAL-LAWS", &["Mass.", "Mass. Gen. Laws", "M.G.L."], NONE),
    ("MI", "Michigan", "MI-COMPILED-LAWS", &["Mich.", "Mich. Comp. Laws", "MCL"], NONE),
    ("MN", "Minnesota", "MN-STATUTES", &["Minn.", "Minn. Stat."], NONE),
    ("MS", "Mississippi", "MS-CODE", &["Miss.", "Miss. Code Ann."], HYPHEN),
    ("MO", "Missouri", "MO-REVISED-STATUTES", &["Mo.", "Mo. Rev. Stat.", "RSMo"], NONE),
    ("MT", "Montana", "MT-CODE", &["Mont.", "Mont. Code Ann.", "MCA"], HYPHEN),
    ("NE", "Nebraska", "NE-REVISED-STATUTES", &["Neb.", "Neb. Rev. Stat."], HYPHEN),
    ("NV", "Nevada", "NV-REVISED-STATUTES", &["Nev.", "Nev. Rev. Stat.", "NRS"], NONE),
    ("NH", "New Hampshire", "NH-REVISED-STATUTES", &["N.H.", "N.H. Rev. Stat. Ann.", "RSA"], COLON),
    ("NJ", "New Jersey", "NJ-STATUTES", &["N.J.", "N.J.S.A.", "N.J.S.", "N.J. Stat. Ann.", "N.J. Rev. Stat."], COLON),
    ("NM", "New Mexico", "NM-STATUTES", &["N.M.", "N.M. Stat. Ann.", "NMSA"], HYPHEN),
    ("NY", "New York", "NY-CONSOLIDATED-LAWS", &["N.Y.", "N.Y.S."], NONE),
    ("NC", "North Carolina", "NC-GENERAL-STATUTES", &["N.C.", "N.C. Gen. Stat.", "N.C.G.S.", "G.S."], HYPHEN),
    ("ND", "North Dakota", "ND-CENTURY-CODE", &["N.D.", "N.D. Cent. Code", "NDCC"], HYPHEN),
    ("OH", "Ohio", "OH-REVISED-CODE", &["Ohio Rev. Code", "O.R.C."], NONE),
    ("OK", "Oklahoma", "OK-STATUTES", &["Okla.", "Okla. Stat."], NONE),
    ("OR", "Oregon", "OR-REVISED-STATUTES", &["Or.", "Or. Rev. Stat.", "ORS"], NONE),
    ("PA", "Pennsylvania", "PA-CONSOLIDATED-STATUTES", &["Pa.", "Penn.", "Pa. C.S.", "Pa. Cons. Stat."], NONE),
    ("RI", "Rhode Island", "RI-GENERAL-LAWS", &["R.I.", "R.I. Gen. Laws"], HYPHEN),
    ("SC", "South Carolina", "SC-CODE", &["S.C.", "S.C. Code Ann."], HYPHEN),
    ("SD", "South Dakota", "SD-CODIFIED-LAWS", &["S.D.", "S.D. Codified Laws", "SDCL"], HYPHEN),
    ("TN", "Tennessee", "TN-CODE", &["Tenn.", "Tenn. Code Ann.", "T.C.A."], HYPHEN),
    ("TX", "Texas", "TX-CODES", &["Tex.", "Tex. Code Ann."], NONE),
    ("UT", "Utah", "UT-CODE", &["Utah Code", "Utah Code Ann.", "U.C.A."], HYPHEN),
    ("VT", "Vermont", "VT-STATUTES", &["Vt.", "Vt. Stat. Ann.", "V.S.A."], NONE),
    ("VA", "Virginia", "VA-CODE", &["Va.", "Va. Code Ann.", "Code of Virginia"], HYPHEN),
    ("WA", "Washington", "WA-REVISED-CODE", &["Wash.", "Wash. Rev. Code", "RCW"], NONE),
    ("WV", "West Virginia", "WV-CODE", &["W. Va.", "W.Va.", "W. Va. Code"], HYPHEN),
    ("WI", "Wisconsin", "WI-STATUTES", &["Wis.", "Wis. Stat.", "Wisc."], NONE),
    ("WY", "Wyoming", "WY-STATUTES", &["Wyo.", "Wyo. Stat. Ann.", "W.S."], HYPHEN),
];

const FEDERAL_ALIASES: &[&str] = &[
    "U.S.C.",
    "USC",
    "U.S.C.A.",
    "U.S. Code",
    "United States Code",
    "Federal",
];

pub(super) fn entries() -> Vec<JurisdictionEntry> {
    let states = STATES
        .iter()
        .map(|&(code, name, law_key, aliases, styles)| JurisdictionEntry {
            code: code.to_string(),
            name: name.to_string(),
            key: code.to_lowercase(),
            law_key: law_key.to_string(),
            level: JurisdictionLevel::State,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            section_styles: styles.to_vec(),
        });

    let federal = JurisdictionEntry {
        code: FEDERAL.to_string(),
        name: "United States".to_string(),
        key: "us".to_string(),
        law_key: "USC".to_string(),
        level: JurisdictionLevel::Federal,
        aliases: FEDERAL_ALIASES.iter().map(|a| a.to_string()).collect(),
        section_styles: Vec::new(),
    };

    states.chain(std::iter::once(federal)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::JurisdictionRegistry;

    #[test]
    fn test_builtin_table_has_no_alias_conflicts() {
        assert!(JurisdictionRegistry::new(entries()).is_ok());
    }

    #[test]
    fn test_colon_states() {
        let colon: Vec<_> = entries()
            .into_iter()
            .filter(|e| e.uses_style(SectionStyle::Colon))
            .map(|e| e.code)
            .collect();
        assert_eq!(colon, vec!["NH".to_string(), "NJ".to_string()]);
    }
}
