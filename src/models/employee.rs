use serde::{Deserialize, Serialize};

/// Employee profile as assembled from the external HR system. Serialized
/// with the upstream field names the client expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(rename = "NIS", default)]
    pub nis: String,
    #[serde(rename = "Nama", default)]
    pub nama: String,
    #[serde(rename = "NamaWilayahStudi", default)]
    pub nama_wilayah_studi: String,
    #[serde(rename = "NamaLokasiStudi", default)]
    pub nama_lokasi_studi: String,
    #[serde(rename = "NamaProgramPelatihan", default)]
    pub nama_program_pelatihan: String,
    #[serde(rename = "NamaPeminatanProgramPelatihan", default)]
    pub nama_peminatan_program_pelatihan: String,
    #[serde(rename = "TanggalMasukSiswa", default)]
    pub tanggal_masuk_siswa: String,
    #[serde(rename = "ProgramSiswa", default)]
    pub program_siswa: String,
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "NamaJabatan", default)]
    pub nama_jabatan: String,
    #[serde(rename = "StatusSiswa", default)]
    pub status_siswa: String,
    #[serde(rename = "Login", default)]
    pub login: String,
    #[serde(rename = "GradeCode", default)]
    pub grade_code: String,
    #[serde(rename = "BranchName", default)]
    pub branch_name: String,
    #[serde(rename = "EffectiveDate", default)]
    pub effective_date: String,
}
