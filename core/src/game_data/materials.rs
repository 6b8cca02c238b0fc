//! Engineering material reference data: grade, category and storage cap.
//!
//! Keys are normalized names (lowercase ASCII alphanumerics) so both the
//! localised display name and the journal's internal name resolve.

use edlt_types::MaterialCategory;
use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialInfo {
    pub name: &'static str,
    pub grade: u8,
    pub category: MaterialCategory,
}

impl MaterialInfo {
    pub fn capacity(&self) -> i64 {
        grade_capacity(self.grade).unwrap_or(0)
    }
}

/// Storage cap for a material grade (1 = very common .. 5 = very rare).
pub fn grade_capacity(grade: u8) -> Option<i64> {
    match grade {
        1 => Some(300),
        2 => Some(250),
        3 => Some(200),
        4 => Some(150),
        5 => Some(100),
        _ => None,
    }
}

pub fn normalize_material_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn lookup_material(name: &str) -> Option<&'static MaterialInfo> {
    MATERIALS.get(normalize_material_name(name).as_str())
}

pub fn material_capacity(name: &str) -> Option<i64> {
    lookup_material(name).map(MaterialInfo::capacity)
}

static MATERIALS: phf::Map<&'static str, MaterialInfo> = phf_map! {
    "carbon" => MaterialInfo { name: "Carbon", grade: 1, category: MaterialCategory::Raw },
    "vanadium" => MaterialInfo { name: "Vanadium", grade: 2, category: MaterialCategory::Raw },
    "niobium" => MaterialInfo { name: "Niobium", grade: 3, category: MaterialCategory::Raw },
    "yttrium" => MaterialInfo { name: "Yttrium", grade: 4, category: MaterialCategory::Raw },
    "phosphorus" => MaterialInfo { name: "Phosphorus", grade: 1, category: MaterialCategory::Raw },
    "chromium" => MaterialInfo { name: "Chromium", grade: 2, category: MaterialCategory::Raw },
    "molybdenum" => MaterialInfo { name: "Molybdenum", grade: 3, category: MaterialCategory::Raw },
    "technetium" => MaterialInfo { name: "Technetium", grade: 4, category: MaterialCategory::Raw },
    "sulphur" => MaterialInfo { name: "Sulphur", grade: 1, category: MaterialCategory::Raw },
    "manganese" => MaterialInfo { name: "Manganese", grade: 2, category: MaterialCategory::Raw },
    "cadmium" => MaterialInfo { name: "Cadmium", grade: 3, category: MaterialCategory::Raw },
    "ruthenium" => MaterialInfo { name: "Ruthenium", grade: 4, category: MaterialCategory::Raw },
    "iron" => MaterialInfo { name: "Iron", grade: 1, category: MaterialCategory::Raw },
    "zinc" => MaterialInfo { name: "Zinc", grade: 2, category: MaterialCategory::Raw },
    "tin" => MaterialInfo { name: "Tin", grade: 3, category: MaterialCategory::Raw },
    "selenium" => MaterialInfo { name: "Selenium", grade: 4, category: MaterialCategory::Raw },
    "nickel" => MaterialInfo { name: "Nickel", grade: 1, category: MaterialCategory::Raw },
    "germanium" => MaterialInfo { name: "Germanium", grade: 2, category: MaterialCategory::Raw },
    "tungsten" => MaterialInfo { name: "Tungsten", grade: 3, category: MaterialCategory::Raw },
    "tellurium" => MaterialInfo { name: "Tellurium", grade: 4, category: MaterialCategory::Raw },
    "rhenium" => MaterialInfo { name: "Rhenium", grade: 1, category: MaterialCategory::Raw },
    "arsenic" => MaterialInfo { name: "Arsenic", grade: 2, category: MaterialCategory::Raw },
    "mercury" => MaterialInfo { name: "Mercury", grade: 3, category: MaterialCategory::Raw },
    "polonium" => MaterialInfo { name: "Polonium", grade: 4, category: MaterialCategory::Raw },
    "lead" => MaterialInfo { name: "Lead", grade: 1, category: MaterialCategory::Raw },
    "zirconium" => MaterialInfo { name: "Zirconium", grade: 2, category: MaterialCategory::Raw },
    "boron" => MaterialInfo { name: "Boron", grade: 3, category: MaterialCategory::Raw },
    "antimony" => MaterialInfo { name: "Antimony", grade: 4, category: MaterialCategory::Raw },
    "chemicalstorageunits" => MaterialInfo { name: "Chemical Storage Units", grade: 1, category: MaterialCategory::Manufactured },
    "chemicalprocessors" => MaterialInfo { name: "Chemical Processors", grade: 2, category: MaterialCategory::Manufactured },
    "chemicaldistillery" => MaterialInfo { name: "Chemical Distillery", grade: 3, category: MaterialCategory::Manufactured },
    "chemicalmanipulators" => MaterialInfo { name: "Chemical Manipulators", grade: 4, category: MaterialCategory::Manufactured },
    "pharmaceuticalisolators" => MaterialInfo { name: "Pharmaceutical Isolators", grade: 5, category: MaterialCategory::Manufactured },
    "temperedalloys" => MaterialInfo { name: "Tempered Alloys", grade: 1, category: MaterialCategory::Manufactured },
    "heatresistantceramics" => MaterialInfo { name: "Heat Resistant Ceramics", grade: 2, category: MaterialCategory::Manufactured },
    "precipitatedalloys" => MaterialInfo { name: "Precipitated Alloys", grade: 3, category: MaterialCategory::Manufactured },
    "thermicalloys" => MaterialInfo { name: "Thermic Alloys", grade: 4, category: MaterialCategory::Manufactured },
    "militarygradealloys" => MaterialInfo { name: "Military Grade Alloys", grade: 5, category: MaterialCategory::Manufactured },
    "heatconductionwiring" => MaterialInfo { name: "Heat Conduction Wiring", grade: 1, category: MaterialCategory::Manufactured },
    "heatdispersionplate" => MaterialInfo { name: "Heat Dispersion Plate", grade: 2, category: MaterialCategory::Manufactured },
    "heatexchangers" => MaterialInfo { name: "Heat Exchangers", grade: 3, category: MaterialCategory::Manufactured },
    "heatvanes" => MaterialInfo { name: "Heat Vanes", grade: 4, category: MaterialCategory::Manufactured },
    "protoheatradiators" => MaterialInfo { name: "Proto Heat Radiators", grade: 5, category: MaterialCategory::Manufactured },
    "basicconductors" => MaterialInfo { name: "Basic Conductors", grade: 1, category: MaterialCategory::Manufactured },
    "conductivecomponents" => MaterialInfo { name: "Conductive Components", grade: 2, category: MaterialCategory::Manufactured },
    "conductiveceramics" => MaterialInfo { name: "Conductive Ceramics", grade: 3, category: MaterialCategory::Manufactured },
    "conductivepolymers" => MaterialInfo { name: "Conductive Polymers", grade: 4, category: MaterialCategory::Manufactured },
    "biotechconductors" => MaterialInfo { name: "Biotech Conductors", grade: 5, category: MaterialCategory::Manufactured },
    "mechanicalscrap" => MaterialInfo { name: "Mechanical Scrap", grade: 1, category: MaterialCategory::Manufactured },
    "mechanicalequipment" => MaterialInfo { name: "Mechanical Equipment", grade: 2, category: MaterialCategory::Manufactured },
    "mechanicalcomponents" => MaterialInfo { name: "Mechanical Components", grade: 3, category: MaterialCategory::Manufactured },
    "configurablecomponents" => MaterialInfo { name: "Configurable Components", grade: 4, category: MaterialCategory::Manufactured },
    "improvisedcomponents" => MaterialInfo { name: "Improvised Components", grade: 5, category: MaterialCategory::Manufactured },
    "gridresistors" => MaterialInfo { name: "Grid Resistors", grade: 1, category: MaterialCategory::Manufactured },
    "hybridcapacitors" => MaterialInfo { name: "Hybrid Capacitors", grade: 2, category: MaterialCategory::Manufactured },
    "electrochemicalarrays" => MaterialInfo { name: "Electrochemical Arrays", grade: 3, category: MaterialCategory::Manufactured },
    "polymercapacitors" => MaterialInfo { name: "Polymer Capacitors", grade: 4, category: MaterialCategory::Manufactured },
    "militarysupercapacitors" => MaterialInfo { name: "Military Supercapacitors", grade: 5, category: MaterialCategory::Manufactured },
    "wornshieldemitters" => MaterialInfo { name: "Worn Shield Emitters", grade: 1, category: MaterialCategory::Manufactured },
    "shieldemitters" => MaterialInfo { name: "Shield Emitters", grade: 2, category: MaterialCategory::Manufactured },
    "shieldingsensors" => MaterialInfo { name: "Shielding Sensors", grade: 3, category: MaterialCategory::Manufactured },
    "compoundshielding" => MaterialInfo { name: "Compound Shielding", grade: 4, category: MaterialCategory::Manufactured },
    "imperialshielding" => MaterialInfo { name: "Imperial Shielding", grade: 5, category: MaterialCategory::Manufactured },
    "compactcomposites" => MaterialInfo { name: "Compact Composites", grade: 1, category: MaterialCategory::Manufactured },
    "filamentcomposites" => MaterialInfo { name: "Filament Composites", grade: 2, category: MaterialCategory::Manufactured },
    "highdensitycomposites" => MaterialInfo { name: "High Density Composites", grade: 3, category: MaterialCategory::Manufactured },
    "proprietarycomposites" => MaterialInfo { name: "Proprietary Composites", grade: 4, category: MaterialCategory::Manufactured },
    "coredynamicscomposites" => MaterialInfo { name: "Core Dynamics Composites", grade: 5, category: MaterialCategory::Manufactured },
    "crystalshards" => MaterialInfo { name: "Crystal Shards", grade: 1, category: MaterialCategory::Manufactured },
    "flawedfocuscrystals" => MaterialInfo { name: "Flawed Focus Crystals", grade: 2, category: MaterialCategory::Manufactured },
    "focuscrystals" => MaterialInfo { name: "Focus Crystals", grade: 3, category: MaterialCategory::Manufactured },
    "refinedfocuscrystals" => MaterialInfo { name: "Refined Focus Crystals", grade: 4, category: MaterialCategory::Manufactured },
    "exquisitefocuscrystals" => MaterialInfo { name: "Exquisite Focus Crystals", grade: 5, category: MaterialCategory::Manufactured },
    "salvagedalloys" => MaterialInfo { name: "Salvaged Alloys", grade: 1, category: MaterialCategory::Manufactured },
    "galvanisingalloys" => MaterialInfo { name: "Galvanising Alloys", grade: 2, category: MaterialCategory::Manufactured },
    "phasealloys" => MaterialInfo { name: "Phase Alloys", grade: 3, category: MaterialCategory::Manufactured },
    "protolightalloys" => MaterialInfo { name: "Proto Light Alloys", grade: 4, category: MaterialCategory::Manufactured },
    "protoradiolicalloys" => MaterialInfo { name: "Proto Radiolic Alloys", grade: 5, category: MaterialCategory::Manufactured },
    "metaalloys" => MaterialInfo { name: "Meta-Alloys", grade: 5, category: MaterialCategory::Manufactured },
    "exceptionalscrambledemissiondata" => MaterialInfo { name: "Exceptional Scrambled Emission Data", grade: 1, category: MaterialCategory::Encoded },
    "irregularemissiondata" => MaterialInfo { name: "Irregular Emission Data", grade: 2, category: MaterialCategory::Encoded },
    "unexpectedemissiondata" => MaterialInfo { name: "Unexpected Emission Data", grade: 3, category: MaterialCategory::Encoded },
    "decodedemissiondata" => MaterialInfo { name: "Decoded Emission Data", grade: 4, category: MaterialCategory::Encoded },
    "abnormalcompactemissionsdata" => MaterialInfo { name: "Abnormal Compact Emissions Data", grade: 5, category: MaterialCategory::Encoded },
    "atypicaldisruptedwakeechoes" => MaterialInfo { name: "Atypical Disrupted Wake Echoes", grade: 1, category: MaterialCategory::Encoded },
    "anomalousfsdtelemetry" => MaterialInfo { name: "Anomalous FSD Telemetry", grade: 2, category: MaterialCategory::Encoded },
    "strangewakesolutions" => MaterialInfo { name: "Strange Wake Solutions", grade: 3, category: MaterialCategory::Encoded },
    "eccentrichyperspacetrajectories" => MaterialInfo { name: "Eccentric Hyperspace Trajectories", grade: 4, category: MaterialCategory::Encoded },
    "dataminedwakeexceptions" => MaterialInfo { name: "Datamined Wake Exceptions", grade: 5, category: MaterialCategory::Encoded },
    "distortedshieldcyclerecordings" => MaterialInfo { name: "Distorted Shield Cycle Recordings", grade: 1, category: MaterialCategory::Encoded },
    "inconsistentshieldsoakanalysis" => MaterialInfo { name: "Inconsistent Shield Soak Analysis", grade: 2, category: MaterialCategory::Encoded },
    "untypicalshieldscans" => MaterialInfo { name: "Untypical Shield Scans", grade: 3, category: MaterialCategory::Encoded },
    "aberrantshieldpatternanalysis" => MaterialInfo { name: "Aberrant Shield Pattern Analysis", grade: 4, category: MaterialCategory::Encoded },
    "peculiarshieldfrequencydata" => MaterialInfo { name: "Peculiar Shield Frequency Data", grade: 5, category: MaterialCategory::Encoded },
    "unusualencryptedfiles" => MaterialInfo { name: "Unusual Encrypted Files", grade: 1, category: MaterialCategory::Encoded },
    "taggedencryptioncodes" => MaterialInfo { name: "Tagged Encryption Codes", grade: 2, category: MaterialCategory::Encoded },
    "opensymmetrickeys" => MaterialInfo { name: "Open Symmetric Keys", grade: 3, category: MaterialCategory::Encoded },
    "atypicalencryptionarchives" => MaterialInfo { name: "Atypical Encryption Archives", grade: 4, category: MaterialCategory::Encoded },
    "adaptiveencryptorscapture" => MaterialInfo { name: "Adaptive Encryptors Capture", grade: 5, category: MaterialCategory::Encoded },
    "anomalousbulkscandata" => MaterialInfo { name: "Anomalous Bulk Scan Data", grade: 1, category: MaterialCategory::Encoded },
    "unidentifiedscanarchives" => MaterialInfo { name: "Unidentified Scan Archives", grade: 2, category: MaterialCategory::Encoded },
    "classifiedscandatabanks" => MaterialInfo { name: "Classified Scan Databanks", grade: 3, category: MaterialCategory::Encoded },
    "divergentscandata" => MaterialInfo { name: "Divergent Scan Data", grade: 4, category: MaterialCategory::Encoded },
    "classifiedscanfragment" => MaterialInfo { name: "Classified Scan Fragment", grade: 5, category: MaterialCategory::Encoded },
    "specialisedlegacyfirmware" => MaterialInfo { name: "Specialised Legacy Firmware", grade: 1, category: MaterialCategory::Encoded },
    "modifiedconsumerfirmware" => MaterialInfo { name: "Modified Consumer Firmware", grade: 2, category: MaterialCategory::Encoded },
    "crackedindustrialfirmware" => MaterialInfo { name: "Cracked Industrial Firmware", grade: 3, category: MaterialCategory::Encoded },
    "securityfirmwarepatch" => MaterialInfo { name: "Security Firmware Patch", grade: 4, category: MaterialCategory::Encoded },
    "modifiedembeddedfirmware" => MaterialInfo { name: "Modified Embedded Firmware", grade: 5, category: MaterialCategory::Encoded },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_follows_grade() {
        assert_eq!(material_capacity("Carbon"), Some(300));
        assert_eq!(material_capacity("Pharmaceutical Isolators"), Some(100));
        assert_eq!(material_capacity("Unobtainium"), None);
    }

    #[test]
    fn lookup_ignores_case_and_punctuation() {
        let info = lookup_material("chemicalstorageunits").unwrap();
        assert_eq!(info.name, "Chemical Storage Units");
        assert_eq!(info.category, MaterialCategory::Manufactured);
        assert_eq!(lookup_material("meta alloys").unwrap().grade, 5);
    }

    #[test]
    fn unknown_grade_has_no_capacity() {
        assert_eq!(grade_capacity(0), None);
        assert_eq!(grade_capacity(6), None);
    }
}
