use serde::{Deserialize, Serialize};

/// Partner (mitra kerja) record. Upstream casing preserved for blob
/// compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mitra {
    #[serde(rename = "Login")]
    pub login: String,
    #[serde(rename = "Nama", default)]
    pub nama: String,
    #[serde(rename = "Cabang", default)]
    pub cabang: String,
    #[serde(rename = "Divisi", default)]
    pub divisi: String,
    #[serde(rename = "Departemen", default)]
    pub departemen: String,
    #[serde(rename = "NamaAtasan", default)]
    pub nama_atasan: String,
    #[serde(rename = "Company", default = "mitra_company")]
    pub company: String,
}

pub fn mitra_company() -> String {
    "MITRA".to_string()
}
