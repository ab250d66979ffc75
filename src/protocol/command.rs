#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogLoad,
    CatalogLoadLocale,
    CatalogSwitch,
    CatalogUnload,
    CatalogEntries,
    CatalogWrite,
    Translate,
    RunQa,
    Coverage,
    DetectEncoding,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.load" => Command::CatalogLoad,
            "catalog.load_locale" => Command::CatalogLoadLocale,
            "catalog.switch" => Command::CatalogSwitch,
            "catalog.unload" => Command::CatalogUnload,
            "catalog.entries" => Command::CatalogEntries,
            "catalog.write" => Command::CatalogWrite,
            "translate" => Command::Translate,
            "run_qa" => Command::RunQa,
            "coverage" => Command::Coverage,
            "encoding.detect" | "detect_encoding" => Command::DetectEncoding,
            _ => Command::Unknown,
        }
    }
}
