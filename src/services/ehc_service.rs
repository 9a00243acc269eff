use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::employee::EmployeeProfile;

/// Companies probed when resolving an employee login. The HR system has no
/// cross-company lookup, so each is tried in turn.
const COMPANIES: [&str; 4] = ["SISWA", "SRNM", "SASI", "ASM"];

/// Lesson catalog entry from the master API.
#[derive(Debug, Clone, Serialize)]
pub struct LessonSummary {
    pub id: String,
    pub nama: String,
    pub section: String,
    pub program: String,
    pub trainer: String,
    pub kkm: String,
    pub sks: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSearchResult {
    pub login: String,
    pub nama: String,
    pub nis: String,
}

/// Graded record as the master API expects it at submission time.
#[derive(Debug, Clone, Serialize)]
pub struct MasterScoreSubmission {
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "pyCompany")]
    pub py_company: String,
    #[serde(rename = "Login")]
    pub login: String,
    #[serde(rename = "Lesson")]
    pub lesson: String,
    #[serde(rename = "Score")]
    pub score: String,
    #[serde(rename = "Program")]
    pub program: String,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "SKS")]
    pub sks: String,
    #[serde(rename = "RangeScore")]
    pub range_score: String,
    #[serde(rename = "RangeKKM")]
    pub range_kkm: String,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Adapter for the external HR system (identity, lesson catalog, score
/// forwarding). Each endpoint carries its own credential pair.
#[derive(Clone)]
pub struct EhcService {
    client: Client,
    data_url: String,
    data_username: String,
    data_password: String,
    valpass_url: String,
    pass_username: String,
    pass_password: String,
    master_url: String,
    master_username: String,
    master_password: String,
}

impl EhcService {
    pub fn new(client: Client) -> Self {
        let config = get_config();
        Self {
            client,
            data_url: config.ehc_data_url.clone(),
            data_username: config.ehc_data_username.clone(),
            data_password: config.ehc_data_password.clone(),
            valpass_url: config.ehc_valpass_url.clone(),
            pass_username: config.ehc_pass_username.clone(),
            pass_password: config.ehc_pass_password.clone(),
            master_url: config.master_siswa_url.clone(),
            master_username: config.master_siswa_username.clone(),
            master_password: config.master_siswa_password.clone(),
        }
    }

    /// Resolve an employee profile, trying each company until one matches.
    /// Returns `None` when no company knows the login.
    pub async fn get_employee_data(&self, login: &str) -> Result<Option<EmployeeProfile>> {
        let login_upper = login.to_uppercase();

        for company in COMPANIES {
            let payload = json!({
                "pyCompany": company,
                "ServiceCategory": "EMPLOYEE",
                "ServiceMode": "SINGLE",
                "Login": login_upper,
            });

            let response = match self
                .client
                .post(&self.data_url)
                .basic_auth(&self.data_username, Some(&self.data_password))
                .json(&payload)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(company, error = ?e, "GetDataEHC request failed");
                    continue;
                }
            };

            if !response.status().is_success() {
                tracing::warn!(company, status = %response.status(), "GetDataEHC rejected");
                continue;
            }

            let raw = response.text().await?;
            let data: JsonValue = match serde_json::from_str(&sanitize_control_chars(&raw)) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(company, error = %e, "GetDataEHC returned unparseable JSON");
                    continue;
                }
            };

            if data["Status"].as_str() != Some("Success") {
                continue;
            }
            let Some(employee) = data["EmployeeList"].get(0) else {
                continue;
            };

            tracing::info!(company, login = %login_upper, "employee resolved");
            return Ok(Some(map_employee(employee, company)));
        }

        Ok(None)
    }

    pub async fn validate_password(&self, login: &str, password: &str) -> Result<bool> {
        let payload = json!({
            "Login": login.to_uppercase(),
            "String1": password,
        });

        let response = self
            .client
            .post(&self.valpass_url)
            .basic_auth(&self.pass_username, Some(&self.pass_password))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "ValEmpPass returned HTTP {}",
                response.status()
            )));
        }

        let data: JsonValue = response.json().await?;
        Ok(data["Result"].as_str() == Some("VALID"))
    }

    /// Lesson catalog from the master API, deduplicated by name.
    pub async fn get_master_lessons(&self) -> Result<Vec<LessonSummary>> {
        let payload = json!({
            "Type": "Lesson",
            "pyCompany": "SISWA",
        });

        let response = self
            .client
            .post(&self.master_url)
            .basic_auth(&self.master_username, Some(&self.master_password))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "MasterSISWA returned HTTP {}",
                response.status()
            )));
        }

        let data: JsonValue = response.json().await?;
        let rows = data["data"].as_array().cloned().unwrap_or_default();

        let mut lessons: Vec<LessonSummary> = Vec::new();
        for row in rows {
            let Some(nama) = row["Nama"].as_str() else {
                continue;
            };
            let nama = nama.trim().to_string();
            if nama.is_empty() || lessons.iter().any(|l| l.nama == nama) {
                continue;
            }
            lessons.push(LessonSummary {
                id: format!(
                    "{}_{}",
                    row["Integer1"].as_i64().unwrap_or_default(),
                    row["Integer2"].as_i64().unwrap_or_default()
                ),
                nama,
                section: str_field(&row, "Section"),
                program: str_field(&row, "Program"),
                trainer: str_field(&row, "Trainer"),
                kkm: str_field_or(&row, "KKM", "0"),
                sks: str_field_or(&row, "SKS", "0"),
            });
        }

        Ok(lessons)
    }

    /// Forward a graded record to the master API. Returns the upstream
    /// error string on failure; callers persist it as the sync status.
    pub async fn submit_score(
        &self,
        submission: &MasterScoreSubmission,
    ) -> std::result::Result<(), String> {
        let response = self
            .client
            .post(&self.master_url)
            .basic_auth(&self.master_username, Some(&self.master_password))
            .json(submission)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", response.status()))
        }
    }

    /// Login-based lookup powering the admin cohort form. Upstream failures
    /// yield an empty result rather than an error (the form degrades to
    /// manual entry).
    pub async fn search_employees(&self, query: &str) -> Vec<EmployeeSearchResult> {
        let payload = json!({
            "pyCompany": "SISWA",
            "ServiceCategory": "EMPLOYEE",
            "ServiceMode": "SINGLE",
            "Login": query.to_uppercase(),
        });

        let response = match self
            .client
            .post(&self.data_url)
            .basic_auth(&self.data_username, Some(&self.data_password))
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "siswa search rejected");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(error = ?e, "siswa search failed");
                return Vec::new();
            }
        };

        let data: JsonValue = match response.json().await {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        if data["Status"].as_str() != Some("Success") {
            return Vec::new();
        }

        data["EmployeeList"]
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|emp| EmployeeSearchResult {
                        login: str_path(emp, &["Career", "Login"]),
                        nama: str_path(emp, &["Career", "Name"]),
                        nis: str_path(emp, &["Career", "NIK"]),
                    })
                    .filter(|r| !r.login.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The HR API occasionally emits unescaped ASCII control characters inside
/// JSON strings; blank them out before parsing.
fn sanitize_control_chars(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect()
}

fn map_employee(employee: &JsonValue, company: &str) -> EmployeeProfile {
    let career = &employee["Career"];
    let person = &employee["Person"];

    EmployeeProfile {
        nis: str_or_fallback(career, person, "NIK"),
        nama: str_or_fallback(career, person, "Name"),
        nama_wilayah_studi: str_field(career, "RegionName"),
        nama_lokasi_studi: str_field(career, "DetailBranchName"),
        nama_program_pelatihan: str_field(career, "DivisionName"),
        nama_peminatan_program_pelatihan: str_field(career, "DepartmentName"),
        tanggal_masuk_siswa: format_effective_date(&str_field(career, "EffectiveDate")),
        program_siswa: str_field(career, "EmpStatusCode"),
        company: {
            let from_career = str_field(career, "pyCompany");
            if from_career.is_empty() {
                company.to_string()
            } else {
                from_career
            }
        },
        nama_jabatan: str_field(career, "PositionName"),
        status_siswa: str_field(career, "CareerType"),
        login: str_or_fallback(career, person, "Login"),
        grade_code: str_field(career, "GradeCode"),
        branch_name: str_field(career, "BranchName"),
        effective_date: str_field(career, "EffectiveDate"),
    }
}

/// YYYYMMDD -> DD/MM/YYYY; anything else passes through empty.
fn format_effective_date(raw: &str) -> String {
    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}/{}/{}", &raw[6..8], &raw[4..6], &raw[0..4])
    } else {
        String::new()
    }
}

fn str_field(value: &JsonValue, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

fn str_field_or(value: &JsonValue, key: &str, default: &str) -> String {
    match value[key].as_str() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

fn str_or_fallback(primary: &JsonValue, fallback: &JsonValue, key: &str) -> String {
    let first = str_field(primary, key);
    if first.is_empty() {
        str_field(fallback, key)
    } else {
        first
    }
}

fn str_path(value: &JsonValue, path: &[&str]) -> String {
    let mut current = value;
    for key in path {
        current = &current[*key];
    }
    current.as_str().unwrap_or_default().to_string()
}
